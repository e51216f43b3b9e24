// ── Domain model ──
//
// The declared configuration (`SwitchConfig`), its per-port pieces, the
// snapshot a read produces (`DeviceState`), and the field-level diff used
// to scope updates (`ChangeSet`).

mod change_set;
mod device_state;
mod port;
mod switch_config;

pub use change_set::{ChangeSet, ConfigField};
pub use device_state::{DeviceState, StaticNetwork};
pub use port::PortConfig;
pub use switch_config::{SwitchConfig, VlanMode};
