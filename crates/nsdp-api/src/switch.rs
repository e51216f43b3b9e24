// ── Device-handle contract ──
//
// A `Switch` is an authenticated session with one physical device. The
// provider behind it must serialize concurrent use of the same device;
// distinct devices may be driven in parallel.

use std::future::Future;

use secrecy::SecretString;

use crate::error::Error;
use crate::mac::MacAddress;
use crate::protocol::{DeviceName, DeviceNetwork, Dhcp, Pvids, TaggedVlans, VlanModeCode};

/// Request/response surface of one bound switch.
///
/// `model`, `port_count` and `hardware_addr` come from discovery and are
/// available without a round trip. Everything else is a device exchange.
pub trait Switch: Send + Sync {
    fn model(&self) -> &str;

    fn port_count(&self) -> u8;

    fn hardware_addr(&self) -> MacAddress;

    fn get_device_name(&self) -> impl Future<Output = Result<DeviceName, Error>> + Send;

    fn set_device_name(&self, name: &DeviceName)
    -> impl Future<Output = Result<(), Error>> + Send;

    fn get_dhcp(&self) -> impl Future<Output = Result<Dhcp, Error>> + Send;

    fn set_dhcp(&self, dhcp: Dhcp) -> impl Future<Output = Result<(), Error>> + Send;

    fn get_device_network(&self) -> impl Future<Output = Result<DeviceNetwork, Error>> + Send;

    fn set_device_network(
        &self,
        network: &DeviceNetwork,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    fn get_vlan_mode(&self) -> impl Future<Output = Result<VlanModeCode, Error>> + Send;

    fn get_pvids(&self) -> impl Future<Output = Result<Pvids, Error>> + Send;

    /// Write PVID entries. Ports not present in `pvids` keep their value.
    fn set_pvids(&self, pvids: &Pvids) -> impl Future<Output = Result<(), Error>> + Send;

    fn get_tagged_vlans(&self) -> impl Future<Output = Result<TaggedVlans, Error>> + Send;

    /// Add `port` to VLAN `tag`, or change its tagged flag if already a member.
    /// Creates the VLAN if it does not exist yet.
    fn set_vlan_member(
        &self,
        tag: u16,
        port: u8,
        tagged: bool,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    fn remove_vlan_member(&self, tag: u16, port: u8)
    -> impl Future<Output = Result<(), Error>> + Send;

    fn set_loop_detection(&self, enabled: bool) -> impl Future<Output = Result<(), Error>> + Send;
}

/// Session entry point: binds a `Switch` by hardware address and password.
///
/// An empty password binds a read-only session: gets succeed, sets fail
/// with `Error::Authentication`.
pub trait Controller: Send + Sync {
    type Switch: Switch;

    fn use_switch(
        &self,
        mac: MacAddress,
        password: &SecretString,
    ) -> impl Future<Output = Result<Self::Switch, Error>> + Send;
}
