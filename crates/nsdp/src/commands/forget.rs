use nsdp_core::lifecycle;

use super::{Session, util};
use crate::cli::ForgetArgs;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: ForgetArgs, session: &Session) -> Result<(), CliError> {
    let tracked = util::load_state(&args.state)?
        .filter(|s| s.id.is_some())
        .ok_or_else(|| CliError::NotTracked {
            path: args.state.display().to_string(),
        })?;
    let ctx = session.context(&tracked.mac);

    let applied = session
        .run(lifecycle::delete(&ctx, &tracked))
        .await?
        .map_err(|d| CliError::switch("forget", d))?;

    util::save_state(&args.state, &applied.config)?;
    output::print_output(
        &format!(
            "Switch {} is no longer tracked; its configuration was left on the device.",
            applied.config.mac
        ),
        session.quiet,
    );
    Ok(())
}
