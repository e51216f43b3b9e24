// ── Convergence engine ──
//
// Turns a desired configuration plus a change set into an ordered list of
// device mutations, and executes them. Planning may read the VLAN table
// (membership is diffed against the device); it never writes.

use std::fmt;

use nsdp_api::{DeviceName, DeviceNetwork, Dhcp, Pvids, Switch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{CoreError, FieldCategory};
use crate::model::{ChangeSet, ConfigField, SwitchConfig};
use crate::ports::{self, MembershipChange};
use crate::session::guarded;
use crate::validate::{parse_cidr, parse_gateway};

/// One device write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    SetName(String),
    SetLoopDetection(bool),
    SetPvids(Pvids),
    JoinVlan { tag: u16, port: u8, tagged: bool },
    LeaveVlan { tag: u16, port: u8 },
    SetNetwork(DeviceNetwork),
    SetDhcp(bool),
}

impl Mutation {
    pub fn field(&self) -> FieldCategory {
        match self {
            Self::SetName(_) => FieldCategory::Name,
            Self::SetLoopDetection(_) => FieldCategory::LoopDetection,
            Self::SetPvids(_) => FieldCategory::Pvids,
            Self::JoinVlan { .. } | Self::LeaveVlan { .. } => FieldCategory::VlanMembership,
            Self::SetNetwork(_) => FieldCategory::Network,
            Self::SetDhcp(_) => FieldCategory::Dhcp,
        }
    }
}

impl From<MembershipChange> for Mutation {
    fn from(change: MembershipChange) -> Self {
        match change {
            MembershipChange::Join { tag, port, tagged } => Self::JoinVlan { tag, port, tagged },
            MembershipChange::Leave { tag, port } => Self::LeaveVlan { tag, port },
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetName(name) => write!(f, "set name to \"{name}\""),
            Self::SetLoopDetection(true) => f.write_str("enable loop detection"),
            Self::SetLoopDetection(false) => f.write_str("disable loop detection"),
            Self::SetPvids(pvids) => {
                f.write_str("set PVIDs")?;
                for (i, pvid) in pvids.values().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{sep}port {}={}", pvid.port, pvid.value)?;
                }
                Ok(())
            }
            Self::JoinVlan { tag, port, tagged } => {
                let how = if *tagged { "tagged" } else { "untagged" };
                write!(f, "add port {port} to VLAN {tag} ({how})")
            }
            Self::LeaveVlan { tag, port } => write!(f, "remove port {port} from VLAN {tag}"),
            Self::SetNetwork(net) => write!(
                f,
                "set address {} mask {} gateway {}",
                net.ip, net.mask, net.gateway
            ),
            Self::SetDhcp(true) => f.write_str("enable DHCP"),
            Self::SetDhcp(false) => f.write_str("disable DHCP"),
        }
    }
}

/// Compute the mutations for the fields in `changes`.
///
/// Order is fixed: name, loop detection, PVIDs, VLAN membership, then
/// addressing last. Undeclared values produce nothing. `desired` must
/// already have passed write validation.
pub async fn plan<S: Switch>(
    switch: &S,
    desired: &SwitchConfig,
    changes: &ChangeSet,
    cancel: &CancellationToken,
) -> Result<Vec<Mutation>, CoreError> {
    let mut mutations = Vec::new();

    if changes.contains(ConfigField::Name) {
        if let Some(name) = &desired.name {
            mutations.push(Mutation::SetName(name.clone()));
        }
    }

    if changes.contains(ConfigField::LoopDetection) {
        if let Some(enabled) = desired.loop_detection {
            mutations.push(Mutation::SetLoopDetection(enabled));
        }
    }

    if changes.contains(ConfigField::Ports) && !desired.ports.is_empty() {
        let pvids = ports::pvid_table(&desired.ports);
        if !pvids.is_empty() {
            mutations.push(Mutation::SetPvids(pvids));
        }

        if desired.ports.iter().any(|p| p.manages_membership()) {
            let current = guarded(cancel, switch.get_tagged_vlans(), |source| {
                CoreError::FieldRead {
                    field: FieldCategory::TaggedVlans,
                    source,
                }
            })
            .await?;
            mutations.extend(
                ports::membership_changes(&desired.ports, &current)
                    .into_iter()
                    .map(Mutation::from),
            );
        }
    }

    if changes.contains(ConfigField::Network) {
        if let (Some(cidr), Some(gateway)) = (&desired.cidr, &desired.gateway) {
            let cidr = parse_cidr(cidr)?;
            mutations.push(Mutation::SetNetwork(DeviceNetwork {
                ip: cidr.ip(),
                mask: cidr.mask(),
                gateway: parse_gateway(gateway)?,
            }));
        }
        // Only enabling is ever written; a static address turns DHCP off.
        if desired.dhcp == Some(true) {
            mutations.push(Mutation::SetDhcp(true));
        }
    }

    Ok(mutations)
}

/// Apply `mutations` in order, stopping at the first failure.
pub async fn execute<S: Switch>(
    switch: &S,
    mutations: &[Mutation],
    cancel: &CancellationToken,
) -> Result<(), CoreError> {
    for mutation in mutations {
        debug!(mac = %switch.hardware_addr(), %mutation, "applying");
        let field = mutation.field();
        let on_err = move |source| CoreError::FieldWrite { field, source };

        match mutation {
            Mutation::SetName(name) => {
                let name = DeviceName { name: name.clone() };
                guarded(cancel, switch.set_device_name(&name), on_err).await?;
            }
            Mutation::SetLoopDetection(enabled) => {
                guarded(cancel, switch.set_loop_detection(*enabled), on_err).await?;
            }
            Mutation::SetPvids(pvids) => {
                guarded(cancel, switch.set_pvids(pvids), on_err).await?;
            }
            Mutation::JoinVlan { tag, port, tagged } => {
                guarded(cancel, switch.set_vlan_member(*tag, *port, *tagged), on_err).await?;
            }
            Mutation::LeaveVlan { tag, port } => {
                guarded(cancel, switch.remove_vlan_member(*tag, *port), on_err).await?;
            }
            Mutation::SetNetwork(network) => {
                guarded(cancel, switch.set_device_network(network), on_err).await?;
            }
            Mutation::SetDhcp(enabled) => {
                let dhcp = Dhcp { enabled: *enabled };
                guarded(cancel, switch.set_dhcp(dhcp), on_err).await?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::Ipv4Addr;

    use nsdp_api::{
        Controller, MacAddress, Pvid, RequestKind, SimulatedController, SimulatedDevice,
        SimulatedSwitch,
    };
    use pretty_assertions::assert_eq;
    use secrecy::SecretString;

    use super::*;
    use crate::model::PortConfig;

    const MAC: MacAddress = MacAddress::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);

    async fn bound() -> (SimulatedController, SimulatedSwitch) {
        let ctrl = SimulatedController::new().with_device(SimulatedDevice::new(MAC, "GS308E", 8, "pw"));
        let switch = ctrl.use_switch(MAC, &SecretString::from("pw")).await.unwrap();
        (ctrl, switch)
    }

    #[tokio::test]
    async fn create_order_puts_network_last() {
        let (_ctrl, switch) = bound().await;
        let desired = SwitchConfig {
            name: Some("rack-1".into()),
            cidr: Some("192.168.1.10/24".into()),
            gateway: Some("192.168.1.1".into()),
            loop_detection: Some(true),
            ports: vec![PortConfig::new(1).with_pvid(10).with_untagged([10])],
            ..SwitchConfig::new(MAC.to_string())
        };

        let mutations = plan(&switch, &desired, &ChangeSet::all(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            mutations,
            vec![
                Mutation::SetName("rack-1".into()),
                Mutation::SetLoopDetection(true),
                Mutation::SetPvids(Pvids::from([(1, Pvid { port: 1, value: 10 })])),
                Mutation::JoinVlan {
                    tag: 10,
                    port: 1,
                    tagged: false
                },
                Mutation::LeaveVlan { tag: 1, port: 1 },
                Mutation::SetNetwork(DeviceNetwork {
                    ip: Ipv4Addr::new(192, 168, 1, 10),
                    mask: Ipv4Addr::new(255, 255, 255, 0),
                    gateway: Ipv4Addr::new(192, 168, 1, 1),
                }),
            ]
        );
    }

    #[tokio::test]
    async fn change_set_scopes_the_plan() {
        let (_ctrl, switch) = bound().await;
        let desired = SwitchConfig {
            name: Some("rack-1".into()),
            dhcp: Some(true),
            ..SwitchConfig::new(MAC.to_string())
        };
        let changes = ChangeSet::empty().with(ConfigField::Network);

        let mutations = plan(&switch, &desired, &changes, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(mutations, vec![Mutation::SetDhcp(true)]);
    }

    #[tokio::test]
    async fn ports_without_membership_skip_the_vlan_read() {
        let (ctrl, switch) = bound().await;
        let desired = SwitchConfig {
            ports: vec![PortConfig::new(2).with_pvid(20)],
            ..SwitchConfig::new(MAC.to_string())
        };
        plan(&switch, &desired, &ChangeSet::all(), &CancellationToken::new())
            .await
            .unwrap();

        let device = ctrl.device(MAC).unwrap();
        assert!(device.lock().await.journal().is_empty());
    }

    #[tokio::test]
    async fn execution_stops_at_first_failure() {
        let (ctrl, switch) = bound().await;
        ctrl.device(MAC)
            .unwrap()
            .lock()
            .await
            .fail_on(RequestKind::SetLoopDetection);

        let mutations = vec![
            Mutation::SetName("a".into()),
            Mutation::SetLoopDetection(true),
            Mutation::SetDhcp(false),
        ];
        let err = execute(&switch, &mutations, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::FieldWrite {
                field: FieldCategory::LoopDetection,
                ..
            }
        ));

        let device = ctrl.device(MAC).unwrap();
        let device = device.lock().await;
        assert_eq!(device.name, "a");
        assert!(device.dhcp);
    }

    #[test]
    fn mutations_render_for_humans() {
        let pvids = Pvids::from([
            (1, Pvid { port: 1, value: 10 }),
            (2, Pvid { port: 2, value: 20 }),
        ]);
        assert_eq!(
            Mutation::SetPvids(pvids).to_string(),
            "set PVIDs port 1=10, port 2=20"
        );
        assert_eq!(
            Mutation::JoinVlan {
                tag: 30,
                port: 4,
                tagged: true
            }
            .to_string(),
            "add port 4 to VLAN 30 (tagged)"
        );
    }
}
