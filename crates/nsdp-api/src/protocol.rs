// ── Request/response records ──
//
// One struct per configuration record a switch exposes. Field shapes follow
// what the device reports, not what a user declares: masks are dotted
// quads, VLAN modes are raw codes.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceName {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dhcp {
    pub enabled: bool,
}

/// Static management address. Always written as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceNetwork {
    pub ip: Ipv4Addr,
    pub mask: Ipv4Addr,
    pub gateway: Ipv4Addr,
}

/// VLAN engine code as reported by the switch.
///
/// Known codes: 0=disabled, 1=basic port-based, 2=advanced port-based,
/// 3=basic 802.1Q, 4=advanced 802.1Q.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VlanModeCode(pub u8);

impl VlanModeCode {
    pub const DISABLED: Self = Self(0);
    pub const BASIC_PORT_BASED: Self = Self(1);
    pub const ADVANCED_PORT_BASED: Self = Self(2);
    pub const BASIC_TAGGED: Self = Self(3);
    pub const ADVANCED_TAGGED: Self = Self(4);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pvid {
    pub port: u8,
    pub value: u16,
}

/// PVID table: port id -> entry.
pub type Pvids = BTreeMap<u8, Pvid>;

/// One 802.1Q VLAN: member port id -> tagged flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedVlan {
    pub members: BTreeMap<u8, bool>,
}

/// VLAN membership table: VLAN tag -> members.
pub type TaggedVlans = BTreeMap<u16, TaggedVlan>;
