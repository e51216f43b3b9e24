use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One declared port.
///
/// An absent `tagged`/`untagged` set is left alone on the device; a present
/// set (even an empty one) is enforced exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortConfig {
    pub id: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pvid: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagged: Option<BTreeSet<u16>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub untagged: Option<BTreeSet<u16>>,
}

impl PortConfig {
    pub fn new(id: u8) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn with_pvid(mut self, pvid: u16) -> Self {
        self.pvid = Some(pvid);
        self
    }

    pub fn with_tagged(mut self, tags: impl IntoIterator<Item = u16>) -> Self {
        self.tagged = Some(tags.into_iter().collect());
        self
    }

    pub fn with_untagged(mut self, tags: impl IntoIterator<Item = u16>) -> Self {
        self.untagged = Some(tags.into_iter().collect());
        self
    }

    /// Returns `true` if either membership set is managed.
    pub fn manages_membership(&self) -> bool {
        self.tagged.is_some() || self.untagged.is_some()
    }
}
