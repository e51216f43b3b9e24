//! CLI error types with miette diagnostics.
//!
//! Lifecycle failures arrive as `nsdp_core::Diagnostics`; each one becomes
//! a related miette diagnostic so every problem is printed, not just the
//! first.

use miette::Diagnostic;
use thiserror::Error;

use nsdp_core::Diagnostics;

/// Exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const DEVICE: i32 = 4;
    pub const TIMEOUT: i32 = 8;
}

/// One engine diagnostic, rendered by miette.
#[derive(Debug, Error, Diagnostic)]
#[error("{summary}")]
pub struct SwitchDiagnostic {
    pub summary: String,
    #[help]
    pub detail: String,
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Backend ──────────────────────────────────────────────────────

    #[error("No device backend configured")]
    #[diagnostic(
        code(nsdp::no_backend),
        help(
            "Pass --device-file (or set NSDP_DEVICE_FILE) pointing at a simulated \
             device JSON file, or set defaults.device_file in the config."
        )
    )]
    NoBackend,

    #[error("Device file could not be used")]
    #[diagnostic(code(nsdp::device_file))]
    DeviceFile(#[from] nsdp_api::Error),

    // ── Lifecycle ────────────────────────────────────────────────────

    #[error("{operation} failed: {summary}")]
    #[diagnostic(code(nsdp::switch))]
    Switch {
        operation: &'static str,
        summary: String,
        exit_code: i32,
        #[related]
        diagnostics: Vec<SwitchDiagnostic>,
    },

    #[error("No tracked switch in {path}")]
    #[diagnostic(
        code(nsdp::not_tracked),
        help("Run: nsdp apply <file> to start tracking a switch")
    )]
    NotTracked { path: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(nsdp::validation))]
    Validation { field: String, reason: String },

    #[error("Could not parse {path}")]
    #[diagnostic(
        code(nsdp::desired_file),
        help("Check the TOML syntax and field names of the declared configuration.")
    )]
    DesiredFile {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(nsdp::config))]
    Config(#[from] nsdp_config::ConfigError),

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Operation timed out after {seconds}s")]
    #[diagnostic(
        code(nsdp::timeout),
        help("Increase the timeout with --timeout or check that the switch is reachable.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(nsdp::json), help("Check the state file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Could not render YAML: {0}")]
    #[diagnostic(code(nsdp::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Wrap lifecycle diagnostics from `operation`.
    pub fn switch(operation: &'static str, diagnostics: Diagnostics) -> Self {
        let summary = diagnostics
            .first_summary()
            .unwrap_or("unknown error")
            .to_owned();
        let exit_code = exit_code_for(&summary);
        Self::Switch {
            operation,
            summary,
            exit_code,
            diagnostics: diagnostics
                .into_iter()
                .map(|d| SwitchDiagnostic {
                    summary: d.summary,
                    detail: d.detail,
                })
                .collect(),
        }
    }

    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Switch { exit_code, .. } => *exit_code,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::DesiredFile { .. } | Self::NoBackend => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

fn exit_code_for(summary: &str) -> i32 {
    match summary {
        "No password defined for switch" | "Failed initial contact with switch" => exit_code::AUTH,
        "Invalid MAC-Address provided" | "Invalid configuration" => exit_code::USAGE,
        s if s.starts_with("Failed to") => exit_code::DEVICE,
        _ => exit_code::GENERAL,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nsdp_core::{CoreError, Diagnostics};

    use super::*;

    #[test]
    fn session_failures_exit_with_auth_code() {
        let mac = "00:11:22:33:44:55".parse().unwrap();
        let err = CliError::switch("read", Diagnostics::from(CoreError::NoCredentials { mac }));
        assert_eq!(err.exit_code(), exit_code::AUTH);
        assert_eq!(err.to_string(), "read failed: No password defined for switch");
    }

    #[test]
    fn validation_failures_are_usage_errors() {
        let err = CliError::switch(
            "apply",
            Diagnostics::from(vec![
                CoreError::InvalidMac { input: "x".into() },
                CoreError::Cancelled,
            ]),
        );
        assert_eq!(err.exit_code(), exit_code::USAGE);
        let CliError::Switch { diagnostics, .. } = err else {
            unreachable!()
        };
        assert_eq!(diagnostics.len(), 2);
    }
}
