//! Configuration for the nsdp CLI.
//!
//! TOML file plus `NSDP_` environment overrides, and per-switch password
//! resolution (env var, system keyring, plaintext) feeding
//! `nsdp_core::Credentials`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use nsdp_api::MacAddress;
use nsdp_core::Credentials;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Keyring service name; the entry user is the switch MAC.
pub const KEYRING_SERVICE: &str = "nsdp";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for switch {mac}")]
    NoCredentials { mac: MacAddress },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Network interface the transport should use for discovery.
    pub interface: Option<String>,

    /// Per-switch settings, keyed by MAC address.
    #[serde(default)]
    pub switches: BTreeMap<String, SwitchEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Operation timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Simulated device file used when `--device-file` is not given.
    pub device_file: Option<PathBuf>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            device_file: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// Credentials for one switch.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct SwitchEntry {
    /// Plaintext password (prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,
}

impl Config {
    /// Entry for `mac`, matching keys in any accepted MAC spelling.
    pub fn switch(&self, mac: MacAddress) -> Option<&SwitchEntry> {
        self.switches
            .iter()
            .find(|(key, _)| key.parse::<MacAddress>().is_ok_and(|k| k == mac))
            .map(|(_, entry)| entry)
    }

    /// Reject switch keys that are not MAC addresses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for key in self.switches.keys() {
            key.parse::<MacAddress>()
                .map_err(|err| ConfigError::Validation {
                    field: format!("switches.\"{key}\""),
                    reason: err.to_string(),
                })?;
        }
        Ok(())
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("rs", "nsdp", "nsdp").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("nsdp");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from `path` + environment. A missing file is not an
/// error; defaults apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("NSDP_").split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    debug!(path = %path.display(), switches = config.switches.len(), "config loaded");
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parent dirs.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the password for `mac`: env var named by `password_env`, then
/// the system keyring, then plaintext in the config.
pub fn resolve_password(config: &Config, mac: MacAddress) -> Result<SecretString, ConfigError> {
    let entry = config.switch(mac);

    // 1. Entry's password_env → env var lookup
    if let Some(env_name) = entry.and_then(|e| e.password_env.as_deref()) {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(keyring_entry) = keyring::Entry::new(KEYRING_SERVICE, &mac.to_string()) {
        if let Ok(secret) = keyring_entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(password) = entry.and_then(|e| e.password.clone()) {
        return Ok(SecretString::from(password));
    }

    Err(ConfigError::NoCredentials { mac })
}

/// Credentials for the given switches. Switches without a resolvable
/// password are left out; the engine reports them when they are used.
pub fn build_credentials(
    config: &Config,
    macs: impl IntoIterator<Item = MacAddress>,
) -> Credentials {
    macs.into_iter()
        .filter_map(|mac| match resolve_password(config, mac) {
            Ok(password) => Some((mac, password)),
            Err(err) => {
                debug!(%mac, error = %err, "no credentials");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    const MAC: MacAddress = MacAddress::new([0x02, 0x00, 0x5e, 0x10, 0x20, 0x30]);

    fn write(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.defaults.output, "table");
        assert_eq!(config.defaults.timeout, 30);
        assert!(config.switches.is_empty());
    }

    #[test]
    fn switch_lookup_ignores_mac_spelling() {
        let (_dir, path) = write(
            r#"
            interface = "eth0"

            [switches."02-00-5E-10-20-30"]
            password = "plain"
            "#,
        );
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.interface.as_deref(), Some("eth0"));
        assert!(config.switch(MAC).is_some());

        let password = resolve_password(&config, MAC).unwrap();
        assert_eq!(password.expose_secret(), "plain");
    }

    #[test]
    fn invalid_switch_key_is_rejected() {
        let (_dir, path) = write("[switches.core]\npassword = \"x\"\n");
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn unknown_switch_has_no_credentials() {
        let config = Config::default();
        assert!(matches!(
            resolve_password(&config, MAC),
            Err(ConfigError::NoCredentials { .. })
        ));
        assert!(build_credentials(&config, [MAC]).is_empty());
    }

    #[test]
    fn save_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.switches.insert(
            MAC.to_string(),
            SwitchEntry {
                password_env: Some("SWITCH_PW".into()),
                ..SwitchEntry::default()
            },
        );

        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(
            loaded.switch(MAC).unwrap().password_env.as_deref(),
            Some("SWITCH_PW")
        );
    }
}
