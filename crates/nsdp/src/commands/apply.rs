use nsdp_api::SimulatedController;
use nsdp_core::{Applied, ChangeSet, OperationContext, SwitchConfig, lifecycle};
use tracing::info;

use super::{Session, util};
use crate::cli::DesiredArgs;
use crate::error::CliError;
use crate::output;

/// Create on first apply, update afterwards. The folded read-back is
/// written to the state file.
pub async fn handle(args: DesiredArgs, session: &Session) -> Result<(), CliError> {
    let desired = util::load_desired(&args.file)?;
    let state_path = args
        .state
        .unwrap_or_else(|| util::default_state_path(&args.file));
    let prior = util::load_state(&state_path)?.filter(|s| s.id.is_some());
    let ctx = session.context(&desired.mac);

    let result = converge(session, &ctx, prior.as_ref(), &desired).await;

    // The device may have been partially written even if the call failed
    // or timed out.
    session.persist().await?;
    let applied = result?;

    util::save_state(&state_path, &applied.config)?;
    output::print_warnings(&applied.warnings, session.color);

    let out = output::render_single(
        &session.format,
        &applied.config,
        output::switch_detail,
        output::switch_id,
    )?;
    output::print_output(&out, session.quiet);
    Ok(())
}

async fn converge(
    session: &Session,
    ctx: &OperationContext<SimulatedController>,
    prior: Option<&SwitchConfig>,
    desired: &SwitchConfig,
) -> Result<Applied, CliError> {
    let Some(prior) = prior else {
        return session
            .run(lifecycle::create(ctx, desired))
            .await?
            .map_err(|d| CliError::switch("create", d));
    };

    let changes: ChangeSet = session
        .run(lifecycle::changes_since(ctx, prior, desired))
        .await?
        .map_err(|d| CliError::switch("update", d))?;
    info!(changes = ?changes, "updating tracked switch");

    session
        .run(lifecycle::update(ctx, desired, &changes))
        .await?
        .map_err(|d| CliError::switch("update", d))
}
