use nsdp_core::{ChangeSet, lifecycle};
use serde::Serialize;
use tabled::Tabled;

use super::{Session, util};
use crate::cli::{DesiredArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

#[derive(Clone, Serialize, Tabled)]
struct PlannedStep {
    #[tabled(rename = "#")]
    step: usize,
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Change")]
    change: String,
}

pub async fn handle(args: DesiredArgs, session: &Session) -> Result<(), CliError> {
    let desired = util::load_desired(&args.file)?;
    let state_path = args
        .state
        .unwrap_or_else(|| util::default_state_path(&args.file));
    let ctx = session.context(&desired.mac);
    let changes = match util::load_state(&state_path)?.filter(|s| s.id.is_some()) {
        Some(prior) => session
            .run(lifecycle::changes_since(&ctx, &prior, &desired))
            .await?
            .map_err(|d| CliError::switch("plan", d))?,
        None => ChangeSet::all(),
    };

    let planned = session
        .run(lifecycle::plan(&ctx, &desired, &changes))
        .await?
        .map_err(|d| CliError::switch("plan", d))?;

    output::print_warnings(&planned.warnings, session.color);

    if planned.mutations.is_empty() && matches!(session.format, OutputFormat::Table) {
        output::print_output("No changes. The switch matches the declaration.", session.quiet);
        return Ok(());
    }

    let steps: Vec<PlannedStep> = planned
        .mutations
        .iter()
        .enumerate()
        .map(|(i, m)| PlannedStep {
            step: i + 1,
            field: m.field().to_string(),
            change: m.to_string(),
        })
        .collect();

    let out = output::render_list(&session.format, &steps, PlannedStep::clone, |s| {
        s.change.clone()
    })?;
    output::print_output(&out, session.quiet);
    Ok(())
}
