// nsdp-core: Reconciliation engine between a declared switch configuration
// and the device behind an `nsdp_api::Switch` handle.

pub mod converge;
pub mod credentials;
pub mod diagnostic;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod ports;
pub mod reader;
pub mod validate;

mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use converge::Mutation;
pub use credentials::Credentials;
pub use diagnostic::{Diagnostic, Diagnostics, Severity};
pub use error::{CoreError, FieldCategory};
pub use lifecycle::{Applied, Planned};
pub use model::{ChangeSet, ConfigField, DeviceState, PortConfig, SwitchConfig, VlanMode};
pub use ports::MembershipChange;
pub use session::OperationContext;
