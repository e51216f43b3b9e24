//! State and desired-file helpers shared by the switch commands.

use std::path::{Path, PathBuf};

use nsdp_core::SwitchConfig;

use crate::error::CliError;

/// Parse a declared configuration from TOML.
///
/// `id`, `model` and `port_count` come from the switch and are only valid
/// in state files.
pub fn load_desired(path: &Path) -> Result<SwitchConfig, CliError> {
    let raw = std::fs::read_to_string(path)?;
    let desired: SwitchConfig = toml::from_str(&raw).map_err(|source| CliError::DesiredFile {
        path: path.display().to_string(),
        source,
    })?;

    let computed = [
        ("id", desired.id.is_some()),
        ("model", desired.model.is_some()),
        ("port_count", desired.port_count.is_some()),
    ];
    if let Some((field, _)) = computed.into_iter().find(|(_, declared)| *declared) {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "is read from the switch and cannot be declared".into(),
        });
    }
    Ok(desired)
}

/// `switch.toml` -> `switch.toml.state.json`
pub fn default_state_path(desired: &Path) -> PathBuf {
    let mut name = desired.as_os_str().to_owned();
    name.push(".state.json");
    PathBuf::from(name)
}

/// Last applied configuration, or `None` if the file does not exist.
pub fn load_state(path: &Path) -> Result<Option<SwitchConfig>, CliError> {
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

pub fn save_state(path: &Path, config: &SwitchConfig) -> Result<(), CliError> {
    std::fs::write(path, serde_json::to_string_pretty(config)?)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn state_path_sits_next_to_desired_file() {
        assert_eq!(
            default_state_path(Path::new("site/core.toml")),
            PathBuf::from("site/core.toml.state.json")
        );
    }

    #[test]
    fn missing_state_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_state(&dir.path().join("none.json")).unwrap().is_none());
    }

    #[test]
    fn state_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        let config = SwitchConfig {
            id: Some("00:11:22:33:44:55".into()),
            dhcp: Some(true),
            ..SwitchConfig::new("00:11:22:33:44:55")
        };
        save_state(&path, &config).unwrap();
        assert_eq!(load_state(&path).unwrap(), Some(config));
    }

    #[test]
    fn declarations_cannot_carry_computed_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("switch.toml");

        std::fs::write(&path, "mac = \"00:11:22:33:44:55\"\ndhcp = true\n").unwrap();
        assert!(load_desired(&path).is_ok());

        std::fs::write(&path, "mac = \"00:11:22:33:44:55\"\nport_count = 48\n").unwrap();
        let err = load_desired(&path).unwrap_err();
        assert!(matches!(err, CliError::Validation { field, .. } if field == "port_count"));
    }
}
