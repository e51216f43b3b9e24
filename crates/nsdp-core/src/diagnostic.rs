// ── Diagnostics ──
//
// What a lifecycle call hands back to its host on failure (and, as
// warnings, on success). Summaries are short and stable; details carry the
// switch address and the underlying error.

use std::fmt;

use serde::Serialize;
use strum::Display;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.summary, self.detail)
    }
}

impl From<CoreError> for Diagnostic {
    fn from(err: CoreError) -> Self {
        let summary = match &err {
            CoreError::InvalidMac { .. } => "Invalid MAC-Address provided".to_owned(),
            CoreError::Validation { .. } => "Invalid configuration".to_owned(),
            CoreError::NoCredentials { .. } => "No password defined for switch".to_owned(),
            CoreError::SessionFailed { .. } => "Failed initial contact with switch".to_owned(),
            CoreError::FieldRead { field, .. } => format!("Failed to retrieve {field}"),
            CoreError::FieldWrite { field, .. } => format!("Failed to update {field}"),
            CoreError::UnrecognizedVlanMode { .. } => "Failed to retrieve vlan mode".to_owned(),
            CoreError::InvalidNetmask { .. } => "Failed to retrieve network".to_owned(),
            CoreError::Cancelled => "Operation cancelled".to_owned(),
        };
        let mut detail = err.to_string();
        if let CoreError::SessionFailed { source, .. } | CoreError::FieldWrite { source, .. } = &err {
            if source.is_auth_failure() {
                detail.push_str(". Check the password configured for this switch");
            }
        }
        Self::error(summary, detail)
    }
}

/// Ordered collection of diagnostics. Never empty when returned as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First diagnostic summary, if any.
    pub fn first_summary(&self) -> Option<&str> {
        self.0.first().map(|d| d.summary.as_str())
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}

impl From<CoreError> for Diagnostics {
    fn from(err: CoreError) -> Self {
        Self(vec![err.into()])
    }
}

impl From<Vec<CoreError>> for Diagnostics {
    fn from(errs: Vec<CoreError>) -> Self {
        errs.into_iter().map(Diagnostic::from).collect()
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use nsdp_api::MacAddress;

    use super::*;
    use crate::error::FieldCategory;

    #[test]
    fn missing_password_keeps_familiar_wording() {
        let mac = MacAddress::new([0, 0x11, 0x22, 0x33, 0x44, 0x55]);
        let diag = Diagnostic::from(CoreError::NoCredentials { mac });
        assert_eq!(diag.summary, "No password defined for switch");
        assert_eq!(diag.detail, "There is no password for switch 00:11:22:33:44:55");
        assert_eq!(diag.severity, Severity::Error);
    }

    #[test]
    fn field_read_summary_names_category() {
        let diag = Diagnostic::from(CoreError::FieldRead {
            field: FieldCategory::Dhcp,
            source: nsdp_api::Error::Protocol("short reply".into()),
        });
        assert_eq!(diag.summary, "Failed to retrieve dhcp config");
        assert!(diag.detail.contains("short reply"));
    }

    #[test]
    fn collects_every_error() {
        let diags = Diagnostics::from(vec![
            CoreError::InvalidMac {
                input: "nope".into(),
            },
            CoreError::Cancelled,
        ]);
        assert_eq!(diags.len(), 2);
        assert_eq!(diags.first_summary(), Some("Invalid MAC-Address provided"));
        assert!(diags.into_iter().all(|d| d.severity == Severity::Error));
    }

    #[test]
    fn rejected_password_points_at_config() {
        let mac = MacAddress::new([0, 0x11, 0x22, 0x33, 0x44, 0x55]);
        let diag = Diagnostic::from(CoreError::SessionFailed {
            mac,
            source: nsdp_api::Error::Authentication {
                message: "password rejected".into(),
            },
        });
        assert_eq!(diag.summary, "Failed initial contact with switch");
        assert!(diag.detail.ends_with("Check the password configured for this switch"));

        let diag = Diagnostic::from(CoreError::SessionFailed {
            mac,
            source: nsdp_api::Error::Unreachable { mac },
        });
        assert!(!diag.detail.contains("password"));
    }
}
