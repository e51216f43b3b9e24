use std::collections::BTreeSet;

use strum::{Display, EnumIter, IntoEnumIterator};

use super::port::PortConfig;
use super::switch_config::SwitchConfig;

/// Top-level field group an update can touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ConfigField {
    Name,
    Network,
    LoopDetection,
    Ports,
    VlanMode,
}

/// Set of fields that changed between the last applied configuration and
/// the new desired one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet(BTreeSet<ConfigField>);

impl ChangeSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every field; what a create applies.
    pub fn all() -> Self {
        Self(ConfigField::iter().collect())
    }

    pub fn with(mut self, field: ConfigField) -> Self {
        self.0.insert(field);
        self
    }

    pub fn contains(&self, field: ConfigField) -> bool {
        self.0.contains(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ConfigField> + '_ {
        self.0.iter().copied()
    }

    /// Diff `desired` against `prior`.
    ///
    /// Only declared values count: a field that is absent from `desired` is
    /// not managed and never shows up as changed, even if `prior` (typically
    /// a folded read-back) carries a value for it.
    pub fn between(prior: &SwitchConfig, desired: &SwitchConfig) -> Self {
        let mut changes = Self::empty();

        if declared_differs(desired.name.as_ref(), prior.name.as_ref()) {
            changes.0.insert(ConfigField::Name);
        }
        if declared_differs(desired.cidr.as_ref(), prior.cidr.as_ref())
            || declared_differs(desired.gateway.as_ref(), prior.gateway.as_ref())
            || declared_differs(desired.dhcp.as_ref(), prior.dhcp.as_ref())
        {
            changes.0.insert(ConfigField::Network);
        }
        if declared_differs(desired.loop_detection.as_ref(), prior.loop_detection.as_ref()) {
            changes.0.insert(ConfigField::LoopDetection);
        }
        if desired
            .ports
            .iter()
            .any(|port| port_differs(port, prior.port(port.id)))
        {
            changes.0.insert(ConfigField::Ports);
        }
        if desired.vlan_mode != prior.vlan_mode {
            changes.0.insert(ConfigField::VlanMode);
        }

        changes
    }
}

impl FromIterator<ConfigField> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = ConfigField>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn declared_differs<T: PartialEq>(desired: Option<&T>, prior: Option<&T>) -> bool {
    desired.is_some_and(|value| prior != Some(value))
}

fn port_differs(desired: &PortConfig, prior: Option<&PortConfig>) -> bool {
    let Some(prior) = prior else {
        return true;
    };
    declared_differs(desired.pvid.as_ref(), prior.pvid.as_ref())
        || declared_differs(desired.tagged.as_ref(), prior.tagged.as_ref())
        || declared_differs(desired.untagged.as_ref(), prior.untagged.as_ref())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn applied() -> SwitchConfig {
        SwitchConfig {
            name: Some("rack-1".into()),
            cidr: Some("10.0.0.2/24".into()),
            gateway: Some("10.0.0.1".into()),
            dhcp: Some(false),
            ports: vec![
                PortConfig::new(1)
                    .with_pvid(10)
                    .with_tagged([])
                    .with_untagged([10]),
            ],
            ..SwitchConfig::new("00:11:22:33:44:55")
        }
    }

    #[test]
    fn identical_declaration_has_no_changes() {
        let mut desired = applied();
        desired.dhcp = None;
        desired.ports = vec![PortConfig::new(1).with_pvid(10)];
        assert!(ChangeSet::between(&applied(), &desired).is_empty());
    }

    #[test]
    fn undeclared_fields_never_change() {
        let desired = SwitchConfig::new("00:11:22:33:44:55");
        assert!(ChangeSet::between(&applied(), &desired).is_empty());
    }

    #[test]
    fn detects_each_group() {
        let mut desired = applied();
        desired.name = Some("rack-2".into());
        desired.gateway = Some("10.0.0.254".into());
        desired.loop_detection = Some(true);
        desired.ports.push(PortConfig::new(2).with_pvid(20));
        desired.vlan_mode = crate::model::VlanMode::PortBased;

        assert_eq!(ChangeSet::between(&applied(), &desired), ChangeSet::all());
    }

    #[test]
    fn membership_change_marks_ports() {
        let mut desired = applied();
        desired.ports = vec![PortConfig::new(1).with_tagged([30])];
        let changes = ChangeSet::between(&applied(), &desired);
        assert_eq!(changes.iter().collect::<Vec<_>>(), vec![ConfigField::Ports]);
    }
}
