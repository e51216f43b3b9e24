use nsdp_core::{PortConfig, SwitchConfig, lifecycle};

use super::Session;
use crate::cli::ReadArgs;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: ReadArgs, session: &Session) -> Result<(), CliError> {
    let desired = SwitchConfig {
        ports: args.ports.iter().copied().map(PortConfig::new).collect(),
        ..SwitchConfig::new(args.mac)
    };
    let ctx = session.context(&desired.mac);

    let applied = session
        .run(lifecycle::read(&ctx, &desired))
        .await?
        .map_err(|d| CliError::switch("read", d))?;

    let out = output::render_single(
        &session.format,
        &applied.config,
        output::switch_detail,
        output::switch_id,
    )?;
    output::print_output(&out, session.quiet);
    Ok(())
}
