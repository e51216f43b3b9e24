// ── Lifecycle controller ──
//
// Create / Read / Update / Delete (and a dry-run Plan) for one switch.
// Each call validates, binds a session, then converges and/or reads back,
// short-circuiting on the first failure.

use nsdp_api::{Controller, Switch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::converge::{self, Mutation};
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::model::{ChangeSet, SwitchConfig, VlanMode};
use crate::reader;
use crate::session::OperationContext;
use crate::validate::{check_port_range, validate_for_write, validate_identity};

/// Outcome of a successful create, read, update or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub config: SwitchConfig,
    pub warnings: Vec<Diagnostic>,
}

/// Outcome of a dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Planned {
    pub mutations: Vec<Mutation>,
    pub warnings: Vec<Diagnostic>,
}

/// Apply the whole desired configuration, then read the switch back.
#[instrument(skip_all, fields(mac = %desired.mac))]
pub async fn create<C: Controller>(
    ctx: &OperationContext<C>,
    desired: &SwitchConfig,
) -> Result<Applied, Diagnostics> {
    converge_and_read(ctx, desired, &ChangeSet::all()).await
}

/// Read the switch into the shape of `desired`. Only identity and port
/// declarations are required, so a bare `mac` works for imports.
#[instrument(skip_all, fields(mac = %desired.mac))]
pub async fn read<C: Controller>(
    ctx: &OperationContext<C>,
    desired: &SwitchConfig,
) -> Result<Applied, Diagnostics> {
    let mac = validate_identity(desired)?;
    let switch = ctx.bind(mac).await?;
    let state = reader::refresh(&switch, ctx.cancel_token()).await?;
    Ok(Applied {
        config: state.fold_into(desired),
        warnings: Vec::new(),
    })
}

/// Apply only the fields in `changes`, then read the switch back.
#[instrument(skip_all, fields(mac = %desired.mac, changes = changes.iter().count()))]
pub async fn update<C: Controller>(
    ctx: &OperationContext<C>,
    desired: &SwitchConfig,
    changes: &ChangeSet,
) -> Result<Applied, Diagnostics> {
    converge_and_read(ctx, desired, changes).await
}

/// Fields that differ between the switch as it is now and `desired`.
///
/// The switch is re-read in the shape of `prior` (the last applied
/// configuration), so edits made on the device since then show up as
/// changes. Loop detection cannot be read and is compared against `prior`.
#[instrument(skip_all, fields(mac = %desired.mac))]
pub async fn changes_since<C: Controller>(
    ctx: &OperationContext<C>,
    prior: &SwitchConfig,
    desired: &SwitchConfig,
) -> Result<ChangeSet, Diagnostics> {
    let current = read(ctx, prior).await?.config;
    let changes = ChangeSet::between(&current, desired);
    debug!(changes = ?changes, "compared declaration with switch");
    Ok(changes)
}

/// Stop tracking the switch.
///
/// The device has no reset primitive: its configuration is left exactly as
/// it is. The session is still established so a wrong password surfaces
/// here like everywhere else. The returned configuration has `id` cleared.
#[instrument(skip_all, fields(mac = %desired.mac))]
pub async fn delete<C: Controller>(
    ctx: &OperationContext<C>,
    desired: &SwitchConfig,
) -> Result<Applied, Diagnostics> {
    let mac = validate_identity(desired)?;
    ctx.bind(mac).await?;

    info!("switch no longer tracked; device configuration left in place");
    Ok(Applied {
        config: SwitchConfig {
            id: None,
            ..desired.clone()
        },
        warnings: Vec::new(),
    })
}

/// Compute the mutations an update with `changes` would issue, without
/// writing anything.
#[instrument(skip_all, fields(mac = %desired.mac))]
pub async fn plan<C: Controller>(
    ctx: &OperationContext<C>,
    desired: &SwitchConfig,
    changes: &ChangeSet,
) -> Result<Planned, Diagnostics> {
    let mac = validate_for_write(desired)?;
    let switch = ctx.bind(mac).await?;
    check_port_range(&desired.ports, switch.port_count())?;

    let mutations = converge::plan(&switch, desired, changes, ctx.cancel_token()).await?;
    let (actual_mode, _) = reader::read_vlan_mode(&switch, ctx.cancel_token()).await?;

    Ok(Planned {
        mutations,
        warnings: vlan_mode_drift(desired, actual_mode).into_iter().collect(),
    })
}

async fn converge_and_read<C: Controller>(
    ctx: &OperationContext<C>,
    desired: &SwitchConfig,
    changes: &ChangeSet,
) -> Result<Applied, Diagnostics> {
    let mac = validate_for_write(desired)?;
    let switch = ctx.bind(mac).await?;
    check_port_range(&desired.ports, switch.port_count())?;

    let cancel: &CancellationToken = ctx.cancel_token();
    let mutations = converge::plan(&switch, desired, changes, cancel).await?;
    converge::execute(&switch, &mutations, cancel).await?;
    info!(writes = mutations.len(), "switch converged");

    let state = reader::refresh(&switch, cancel).await?;
    Ok(Applied {
        config: state.fold_into(desired),
        warnings: vlan_mode_drift(desired, state.vlan_mode).into_iter().collect(),
    })
}

/// The switch offers no VLAN mode write, so a mismatch can only be reported.
fn vlan_mode_drift(desired: &SwitchConfig, actual: VlanMode) -> Option<Diagnostic> {
    if desired.vlan_mode == actual {
        return None;
    }
    warn!(declared = %desired.vlan_mode, %actual, "vlan mode differs and cannot be changed");
    Some(Diagnostic::warning(
        "VLAN mode cannot be changed",
        format!(
            "Switch {} runs in {actual} mode but {} was declared; change it on the device",
            desired.mac, desired.vlan_mode
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_mode_has_no_drift() {
        let desired = SwitchConfig::new("00:11:22:33:44:55");
        assert!(vlan_mode_drift(&desired, VlanMode::Tagged).is_none());
    }

    #[test]
    fn drift_is_a_warning() {
        let desired = SwitchConfig::new("00:11:22:33:44:55");
        let diag = vlan_mode_drift(&desired, VlanMode::PortBased).map(|d| d.severity);
        assert_eq!(diag, Some(crate::diagnostic::Severity::Warning));
    }
}
