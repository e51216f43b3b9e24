use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;
use nsdp_api::{MacAddress, Pvids, TaggedVlans, VlanModeCode};

use super::switch_config::{SwitchConfig, VlanMode};
use crate::ports;

/// Static management address as reported by the switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticNetwork {
    pub cidr: Ipv4Network,
    pub gateway: Ipv4Addr,
}

/// Snapshot of everything a read collected from one switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    pub mac: MacAddress,
    pub model: String,
    pub port_count: u8,
    pub name: String,
    pub dhcp: bool,
    /// Only read when DHCP is off.
    pub network: Option<StaticNetwork>,
    pub vlan_mode: VlanMode,
    pub vlan_mode_code: VlanModeCode,
    pub pvids: Pvids,
    pub vlans: TaggedVlans,
}

impl DeviceState {
    /// Fold the snapshot into `desired`.
    ///
    /// The device wins for everything it reports. `loop_detection` has no
    /// getter and keeps the declared value. Ports are projected for the
    /// declared ids only.
    pub fn fold_into(&self, desired: &SwitchConfig) -> SwitchConfig {
        let (cidr, gateway) = match self.network {
            Some(network) if !self.dhcp => (
                Some(network.cidr.to_string()),
                Some(network.gateway.to_string()),
            ),
            _ => (None, None),
        };

        SwitchConfig {
            id: Some(self.mac.to_string()),
            mac: desired.mac.clone(),
            model: Some(self.model.clone()),
            port_count: Some(self.port_count),
            name: Some(self.name.clone()),
            cidr,
            gateway,
            dhcp: Some(self.dhcp),
            vlan_mode: self.vlan_mode,
            loop_detection: desired.loop_detection,
            ports: ports::project(desired.ports.iter().map(|p| p.id), &self.pvids, &self.vlans),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use nsdp_api::{Pvid, TaggedVlan};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::PortConfig;

    fn state(dhcp: bool) -> DeviceState {
        DeviceState {
            mac: "00:11:22:33:44:55".parse().unwrap(),
            model: "GS308E".into(),
            port_count: 8,
            name: "rack-1".into(),
            dhcp,
            network: (!dhcp).then(|| StaticNetwork {
                cidr: Ipv4Network::new(Ipv4Addr::new(192, 168, 1, 10), 24).unwrap(),
                gateway: Ipv4Addr::new(192, 168, 1, 1),
            }),
            vlan_mode: VlanMode::Tagged,
            vlan_mode_code: VlanModeCode::ADVANCED_TAGGED,
            pvids: Pvids::from([(1, Pvid { port: 1, value: 10 })]),
            vlans: BTreeMap::from([(
                10,
                TaggedVlan {
                    members: BTreeMap::from([(1, false), (2, true)]),
                },
            )]),
        }
    }

    #[test]
    fn static_addressing_renders_cidr() {
        let desired = SwitchConfig::new("00-11-22-33-44-55");
        let folded = state(false).fold_into(&desired);
        assert_eq!(folded.id.as_deref(), Some("00:11:22:33:44:55"));
        assert_eq!(folded.mac, "00-11-22-33-44-55");
        assert_eq!(folded.cidr.as_deref(), Some("192.168.1.10/24"));
        assert_eq!(folded.gateway.as_deref(), Some("192.168.1.1"));
        assert_eq!(folded.dhcp, Some(false));
    }

    #[test]
    fn dhcp_clears_static_fields() {
        let mut desired = SwitchConfig::new("00:11:22:33:44:55");
        desired.cidr = Some("10.0.0.2/24".into());
        let folded = state(true).fold_into(&desired);
        assert_eq!(folded.cidr, None);
        assert_eq!(folded.gateway, None);
        assert_eq!(folded.dhcp, Some(true));
    }

    #[test]
    fn loop_detection_keeps_declared_value() {
        let mut desired = SwitchConfig::new("00:11:22:33:44:55");
        desired.loop_detection = Some(true);
        assert_eq!(state(true).fold_into(&desired).loop_detection, Some(true));
    }

    #[test]
    fn only_declared_ports_are_projected() {
        let mut desired = SwitchConfig::new("00:11:22:33:44:55");
        desired.ports = vec![PortConfig::new(2)];
        let folded = state(true).fold_into(&desired);
        assert_eq!(
            folded.ports,
            vec![PortConfig::new(2).with_tagged([10]).with_untagged([])]
        );
    }
}
