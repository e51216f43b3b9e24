//! Config subcommand handlers.

use std::fmt::Write as _;

use dialoguer::Select;
use nsdp_api::MacAddress;
use nsdp_config::{Config, KEYRING_SERVICE};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Format config for display, masking passwords.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    if let Some(ref file) = cfg.defaults.device_file {
        let _ = writeln!(out, "device_file = \"{}\"", file.display());
    }
    if let Some(ref interface) = cfg.interface {
        let _ = writeln!(out, "\ninterface = \"{interface}\"");
    }

    for (mac, entry) in &cfg.switches {
        let _ = writeln!(out);
        let _ = writeln!(out, "[switches.\"{mac}\"]");
        if entry.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if let Some(ref env) = entry.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
    }

    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn keyring_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "keyring".into(),
        reason: format!("failed to access keyring: {e}"),
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::path(global).display().to_string(), false);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            output::print_output(&format_config_redacted(&cfg), global.quiet);
            Ok(())
        }

        ConfigCommand::SetPassword { mac } => {
            let mac: MacAddress = mac.parse().map_err(|e: nsdp_api::MacParseError| {
                CliError::Validation {
                    field: "mac".into(),
                    reason: e.to_string(),
                }
            })?;

            let password =
                rpassword::prompt_password(format!("Password for {mac}: ")).map_err(prompt_err)?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }

            if store_in_keyring(mac, &password)? {
                return Ok(());
            }

            let path = config::path(global);
            let mut cfg = config::load(global)?;
            set_plaintext_password(&mut cfg, mac, password);
            nsdp_config::save_config_to(&cfg, &path)?;
            eprintln!("   ✓ password for {mac} written to {}", path.display());
            Ok(())
        }
    }
}

/// Offer the system keyring for `password`. Returns `false` if the user
/// chose plaintext config instead.
fn store_in_keyring(mac: MacAddress, password: &str) -> Result<bool, CliError> {
    let choice = Select::new()
        .with_prompt("Where should the password be stored?")
        .items(&[
            "System keyring (recommended)",
            "Config file (plaintext)",
        ])
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    if choice != 0 {
        return Ok(false);
    }

    keyring::Entry::new(KEYRING_SERVICE, &mac.to_string())
        .and_then(|entry| entry.set_password(password))
        .map_err(keyring_err)?;
    eprintln!("   ✓ password for {mac} stored in system keyring");
    Ok(true)
}

/// Store `password` in the config, reusing an entry keyed by any spelling
/// of `mac`.
fn set_plaintext_password(cfg: &mut Config, mac: MacAddress, password: String) {
    let key = cfg
        .switches
        .keys()
        .find(|k| k.parse::<MacAddress>().is_ok_and(|k| k == mac))
        .cloned()
        .unwrap_or_else(|| mac.to_string());
    cfg.switches.entry(key).or_default().password = Some(password);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nsdp_config::SwitchEntry;

    use super::*;

    #[test]
    fn passwords_are_masked() {
        let mut cfg = Config::default();
        cfg.switches.insert(
            "00:11:22:33:44:55".into(),
            SwitchEntry {
                password: Some("hunter2".into()),
                password_env: None,
            },
        );
        let text = format_config_redacted(&cfg);
        assert!(text.contains("password = \"****\""));
        assert!(!text.contains("hunter2"));
    }

    #[test]
    fn plaintext_password_reuses_existing_entry() {
        let mut cfg = Config::default();
        cfg.switches.insert(
            "00-11-22-33-44-55".into(),
            SwitchEntry {
                password: None,
                password_env: Some("CORE_PW".into()),
            },
        );
        let mac: MacAddress = "00:11:22:33:44:55".parse().unwrap();

        set_plaintext_password(&mut cfg, mac, "s3cret".into());

        assert_eq!(cfg.switches.len(), 1);
        let entry = cfg.switch(mac).unwrap();
        assert_eq!(entry.password.as_deref(), Some("s3cret"));
        assert_eq!(entry.password_env.as_deref(), Some("CORE_PW"));
    }

    #[test]
    fn plaintext_password_adds_new_entry() {
        let mut cfg = Config::default();
        let mac: MacAddress = "00:11:22:33:44:55".parse().unwrap();
        set_plaintext_password(&mut cfg, mac, "s3cret".into());
        assert!(cfg.switches.contains_key("00:11:22:33:44:55"));
    }
}
