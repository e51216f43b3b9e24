use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::port::PortConfig;

/// Logical VLAN engine of the switch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum VlanMode {
    PortBased,
    #[default]
    Tagged,
}

/// Declared configuration of one switch, and the shape read-back is folded
/// into.
///
/// `id`, `model` and `port_count` are filled in by the engine. Addressing is
/// either `cidr` + `gateway` or `dhcp`, never both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwitchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub mac: String,

    // Computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_count: Option<u8>,

    // Identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    // Addressing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dhcp: Option<bool>,

    // Switching
    #[serde(default)]
    pub vlan_mode: VlanMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_detection: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<PortConfig>,
}

impl SwitchConfig {
    pub fn new(mac: impl Into<String>) -> Self {
        Self {
            mac: mac.into(),
            ..Self::default()
        }
    }

    pub fn port(&self, id: u8) -> Option<&PortConfig> {
        self.ports.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn vlan_mode_defaults_to_tagged() {
        let config: SwitchConfig = toml::from_str(r#"mac = "00:11:22:33:44:55""#).unwrap();
        assert_eq!(config.vlan_mode, VlanMode::Tagged);
        assert!(config.ports.is_empty());
    }

    #[test]
    fn vlan_mode_uses_kebab_case() {
        let config: SwitchConfig =
            toml::from_str("mac = \"00:11:22:33:44:55\"\nvlan_mode = \"port-based\"").unwrap();
        assert_eq!(config.vlan_mode, VlanMode::PortBased);
        assert_eq!("port-based".parse::<VlanMode>().unwrap(), VlanMode::PortBased);
        assert_eq!(VlanMode::Tagged.to_string(), "tagged");
    }

    #[test]
    fn unknown_vlan_mode_is_rejected() {
        let result: Result<SwitchConfig, _> =
            toml::from_str("mac = \"00:11:22:33:44:55\"\nvlan_mode = \"trunk\"");
        assert!(result.is_err());
    }

    #[test]
    fn parses_full_declaration() {
        let raw = r#"
            mac = "00:11:22:33:44:55"
            name = "rack-1"
            cidr = "192.168.1.10/24"
            gateway = "192.168.1.1"
            loop_detection = true

            [[ports]]
            id = 1
            pvid = 10
            untagged = [10]

            [[ports]]
            id = 2
            tagged = [20, 10]
        "#;
        let config: SwitchConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.name.as_deref(), Some("rack-1"));
        assert_eq!(config.ports.len(), 2);
        assert_eq!(
            config.port(2).unwrap().tagged.as_ref().unwrap().iter().copied().collect::<Vec<_>>(),
            vec![10, 20]
        );
        assert_eq!(config.port(2).unwrap().untagged, None);
    }

    #[test]
    fn json_omits_undeclared_fields() {
        let json = serde_json::to_value(SwitchConfig::new("00:11:22:33:44:55")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "mac": "00:11:22:33:44:55", "vlan_mode": "tagged" })
        );
    }
}
