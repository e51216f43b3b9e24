// nsdp-api: Device-handle contract for NSDP-managed switches.
//
// The wire protocol lives outside this workspace. This crate pins down the
// request/response shapes a transport must provide (`Switch`, `Controller`)
// and ships an in-memory implementation for tests and offline use.

pub mod error;
pub mod mac;
pub mod protocol;
pub mod simulated;
pub mod switch;

pub use error::Error;
pub use mac::{MacAddress, MacParseError};
pub use protocol::{
    DeviceName, DeviceNetwork, Dhcp, Pvid, Pvids, TaggedVlan, TaggedVlans, VlanModeCode,
};
pub use simulated::{Request, RequestKind, SimulatedController, SimulatedDevice, SimulatedSwitch};
pub use switch::{Controller, Switch};
