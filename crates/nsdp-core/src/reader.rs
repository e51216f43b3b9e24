// ── Device state reader ──
//
// Queries a bound switch in a fixed order and assembles a `DeviceState`.
// The first failing exchange aborts the read. Nothing is cached.

use ipnetwork::{Ipv4Network, ipv4_mask_to_prefix};
use nsdp_api::{Switch, VlanModeCode};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{CoreError, FieldCategory};
use crate::model::{DeviceState, StaticNetwork, VlanMode};
use crate::session::guarded;

/// Map a raw VLAN engine code to the logical mode.
///
/// Basic and advanced variants collapse into one mode each. Disabled (0) and
/// anything unknown is an error.
pub fn map_vlan_mode(code: VlanModeCode) -> Result<VlanMode, CoreError> {
    match code {
        VlanModeCode::BASIC_PORT_BASED | VlanModeCode::ADVANCED_PORT_BASED => {
            Ok(VlanMode::PortBased)
        }
        VlanModeCode::BASIC_TAGGED | VlanModeCode::ADVANCED_TAGGED => Ok(VlanMode::Tagged),
        VlanModeCode(code) => Err(CoreError::UnrecognizedVlanMode { code }),
    }
}

/// Read the VLAN mode code and map it.
pub async fn read_vlan_mode<S: Switch>(
    switch: &S,
    cancel: &CancellationToken,
) -> Result<(VlanMode, VlanModeCode), CoreError> {
    let code = guarded(cancel, switch.get_vlan_mode(), read_err(FieldCategory::VlanMode)).await?;
    Ok((map_vlan_mode(code)?, code))
}

/// Full read of one switch: identity, addressing, VLAN mode, PVIDs and
/// VLAN membership, in that order.
pub async fn refresh<S: Switch>(
    switch: &S,
    cancel: &CancellationToken,
) -> Result<DeviceState, CoreError> {
    let mac = switch.hardware_addr();

    let name = guarded(cancel, switch.get_device_name(), read_err(FieldCategory::Name)).await?;

    let dhcp = guarded(cancel, switch.get_dhcp(), read_err(FieldCategory::Dhcp)).await?;
    let network = if dhcp.enabled {
        None
    } else {
        let network = guarded(
            cancel,
            switch.get_device_network(),
            read_err(FieldCategory::Network),
        )
        .await?;
        let prefix = ipv4_mask_to_prefix(network.mask)
            .map_err(|_| CoreError::InvalidNetmask { mask: network.mask })?;
        let cidr = Ipv4Network::new(network.ip, prefix)
            .map_err(|_| CoreError::InvalidNetmask { mask: network.mask })?;
        Some(StaticNetwork {
            cidr,
            gateway: network.gateway,
        })
    };

    let (vlan_mode, vlan_mode_code) = read_vlan_mode(switch, cancel).await?;

    let pvids = guarded(cancel, switch.get_pvids(), read_err(FieldCategory::Pvids)).await?;
    let vlans = guarded(
        cancel,
        switch.get_tagged_vlans(),
        read_err(FieldCategory::TaggedVlans),
    )
    .await?;

    debug!(%mac, dhcp = dhcp.enabled, %vlan_mode, vlans = vlans.len(), "switch state read");

    Ok(DeviceState {
        mac,
        model: switch.model().to_owned(),
        port_count: switch.port_count(),
        name: name.name,
        dhcp: dhcp.enabled,
        network,
        vlan_mode,
        vlan_mode_code,
        pvids,
        vlans,
    })
}

fn read_err(field: FieldCategory) -> impl FnOnce(nsdp_api::Error) -> CoreError {
    move |source| CoreError::FieldRead { field, source }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::Ipv4Addr;

    use nsdp_api::{
        Controller, DeviceNetwork, MacAddress, RequestKind, SimulatedController, SimulatedDevice,
    };
    use secrecy::SecretString;

    use super::*;

    const MAC: MacAddress = MacAddress::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);

    #[test]
    fn vlan_mode_mapping_covers_known_codes() {
        assert_eq!(map_vlan_mode(VlanModeCode(1)).unwrap(), VlanMode::PortBased);
        assert_eq!(map_vlan_mode(VlanModeCode(2)).unwrap(), VlanMode::PortBased);
        assert_eq!(map_vlan_mode(VlanModeCode(3)).unwrap(), VlanMode::Tagged);
        assert_eq!(map_vlan_mode(VlanModeCode(4)).unwrap(), VlanMode::Tagged);
    }

    #[test]
    fn vlan_mode_mapping_rejects_unknown_codes() {
        for code in [0, 5, 255] {
            assert!(matches!(
                map_vlan_mode(VlanModeCode(code)),
                Err(CoreError::UnrecognizedVlanMode { code: c }) if c == code
            ));
        }
    }

    async fn bound(device: SimulatedDevice) -> nsdp_api::SimulatedSwitch {
        SimulatedController::new()
            .with_device(device)
            .use_switch(MAC, &SecretString::from("pw"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn dhcp_switch_has_no_static_network() {
        let switch = bound(SimulatedDevice::new(MAC, "GS308E", 8, "pw")).await;
        let state = refresh(&switch, &CancellationToken::new()).await.unwrap();
        assert!(state.dhcp);
        assert_eq!(state.network, None);
        assert_eq!(state.port_count, 8);
        assert_eq!(state.vlan_mode, VlanMode::Tagged);
    }

    #[tokio::test]
    async fn static_switch_reports_prefix() {
        let mut device = SimulatedDevice::new(MAC, "GS305E", 5, "pw");
        device.dhcp = false;
        device.network = DeviceNetwork {
            ip: Ipv4Addr::new(10, 1, 0, 5),
            mask: Ipv4Addr::new(255, 255, 0, 0),
            gateway: Ipv4Addr::new(10, 1, 0, 1),
        };
        let switch = bound(device).await;

        let state = refresh(&switch, &CancellationToken::new()).await.unwrap();
        assert_eq!(state.network.unwrap().cidr.to_string(), "10.1.0.5/16");
    }

    #[tokio::test]
    async fn non_contiguous_mask_is_a_read_failure() {
        let mut device = SimulatedDevice::new(MAC, "GS308E", 8, "pw");
        device.dhcp = false;
        device.network.mask = Ipv4Addr::new(255, 0, 255, 0);
        let switch = bound(device).await;

        let err = refresh(&switch, &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidNetmask { .. }));
    }

    #[tokio::test]
    async fn failed_exchange_names_the_field() {
        let mut device = SimulatedDevice::new(MAC, "GS308E", 8, "pw");
        device.fail_on(RequestKind::GetPvids);
        let switch = bound(device).await;

        let err = refresh(&switch, &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::FieldRead {
                field: FieldCategory::Pvids,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn disabled_vlan_engine_is_reported() {
        let mut device = SimulatedDevice::new(MAC, "GS308E", 8, "pw");
        device.vlan_mode = VlanModeCode::DISABLED;
        let switch = bound(device).await;

        let err = refresh(&switch, &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, CoreError::UnrecognizedVlanMode { code: 0 }));
    }

    #[tokio::test]
    async fn cancelled_token_stops_the_read() {
        let switch = bound(SimulatedDevice::new(MAC, "GS308E", 8, "pw")).await;
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = refresh(&switch, &cancel).await.unwrap_err();
        assert!(matches!(err, CoreError::Cancelled));
    }
}
