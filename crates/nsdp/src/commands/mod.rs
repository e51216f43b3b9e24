//! Command handlers and the session shared by the switch commands.

pub mod apply;
pub mod config_cmd;
pub mod forget;
pub mod info;
pub mod plan;
pub mod read;
pub mod util;

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use nsdp_api::{MacAddress, SimulatedController};
use nsdp_config::Config;
use nsdp_core::OperationContext;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Everything a switch command needs: resolved config, the device backend,
/// output settings and the cancellation token wired to Ctrl-C.
pub struct Session {
    pub config: Config,
    pub format: OutputFormat,
    pub quiet: bool,
    pub color: bool,
    controller: SimulatedController,
    device_file: PathBuf,
    timeout: Duration,
    cancel: CancellationToken,
}

impl Session {
    pub fn open(global: &GlobalOpts, cancel: CancellationToken) -> Result<Self, CliError> {
        let config = crate::config::load(global)?;

        let device_file = global
            .device_file
            .clone()
            .or_else(|| config.defaults.device_file.clone())
            .ok_or(CliError::NoBackend)?;
        let controller = SimulatedController::load(&device_file)?;

        let format = match &global.output {
            Some(format) => format.clone(),
            None => OutputFormat::from_str(&config.defaults.output, true).map_err(|_| {
                CliError::Validation {
                    field: "defaults.output".into(),
                    reason: format!("unknown output format '{}'", config.defaults.output),
                }
            })?,
        };
        let timeout = Duration::from_secs(global.timeout.unwrap_or(config.defaults.timeout));

        Ok(Self {
            config,
            format,
            quiet: global.quiet,
            color: crate::output::should_color(&global.color),
            controller,
            device_file,
            timeout,
            cancel,
        })
    }

    /// Operation context with credentials for `mac`, if it parses.
    pub fn context(&self, mac: &str) -> OperationContext<SimulatedController> {
        let target = mac.parse::<MacAddress>().ok();
        let credentials = nsdp_config::build_credentials(&self.config, target);
        OperationContext::new(self.controller.clone(), credentials)
            .with_cancellation(self.cancel.clone())
    }

    /// Like [`Session::context`], but falls back to an empty password so a
    /// switch with no configured credentials can still be read.
    pub fn read_only_context(&self, mac: &str) -> OperationContext<SimulatedController> {
        let target = mac.parse::<MacAddress>().ok();
        let mut credentials = nsdp_config::build_credentials(&self.config, target);
        if let Some(target) = target {
            if credentials.password_for(target).is_none() {
                credentials = credentials.with(target, String::new());
            }
        }
        OperationContext::new(self.controller.clone(), credentials)
            .with_cancellation(self.cancel.clone())
    }

    /// Run a lifecycle call under the operation timeout.
    pub async fn run<T>(&self, operation: impl Future<Output = T>) -> Result<T, CliError> {
        tokio::time::timeout(self.timeout, operation)
            .await
            .map_err(|_| {
                self.cancel.cancel();
                CliError::Timeout {
                    seconds: self.timeout.as_secs(),
                }
            })
    }

    /// Write simulated device state back to the device file.
    pub async fn persist(&self) -> Result<(), CliError> {
        self.controller.save(&self.device_file).await?;
        debug!(path = %self.device_file.display(), "device file saved");
        Ok(())
    }
}

/// Route a switch command to its handler.
pub async fn dispatch(cmd: Command, session: &Session) -> Result<(), CliError> {
    match cmd {
        Command::Read(args) => read::handle(args, session).await,
        Command::Plan(args) => plan::handle(args, session).await,
        Command::Apply(args) => apply::handle(args, session).await,
        Command::Forget(args) => forget::handle(args, session).await,
        Command::Info(args) => info::handle(args, session).await,
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
