// ── Core error types ──
//
// Everything that can go wrong between a declared configuration and the
// device. Transport errors from `nsdp_api` are never surfaced bare: they are
// wrapped with the field category or session step they interrupted.

use std::net::Ipv4Addr;

use nsdp_api::MacAddress;
use strum::Display;
use thiserror::Error;

/// Device configuration area a read or write was touching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum FieldCategory {
    #[strum(to_string = "name")]
    Name,
    #[strum(to_string = "dhcp config")]
    Dhcp,
    #[strum(to_string = "network")]
    Network,
    #[strum(to_string = "vlan mode")]
    VlanMode,
    #[strum(to_string = "pvids")]
    Pvids,
    #[strum(to_string = "tagged vlans")]
    TaggedVlans,
    #[strum(to_string = "vlan membership")]
    VlanMembership,
    #[strum(to_string = "loop detection")]
    LoopDetection,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Validation ───────────────────────────────────────────────────
    #[error("'{input}' is not a valid MAC-address")]
    InvalidMac { input: String },

    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    // ── Session ──────────────────────────────────────────────────────
    #[error("There is no password for switch {mac}")]
    NoCredentials { mac: MacAddress },

    #[error("Initial contact with switch {mac} has failed: {source}")]
    SessionFailed {
        mac: MacAddress,
        source: nsdp_api::Error,
    },

    // ── Device exchanges ─────────────────────────────────────────────
    #[error("Failed to retrieve {field} from switch: {source}")]
    FieldRead {
        field: FieldCategory,
        source: nsdp_api::Error,
    },

    #[error("Failed to update {field} on switch: {source}")]
    FieldWrite {
        field: FieldCategory,
        source: nsdp_api::Error,
    },

    // ── Device reports we cannot interpret ───────────────────────────
    #[error("Switch reported unrecognized VLAN mode code {code}")]
    UnrecognizedVlanMode { code: u8 },

    #[error("Switch reported non-contiguous netmask {mask}")]
    InvalidNetmask { mask: Ipv4Addr },

    // ── Control ──────────────────────────────────────────────────────
    #[error("Operation cancelled")]
    Cancelled,
}

impl CoreError {
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_category_reads_like_prose() {
        assert_eq!(FieldCategory::Dhcp.to_string(), "dhcp config");
        assert_eq!(FieldCategory::TaggedVlans.to_string(), "tagged vlans");
    }

    #[test]
    fn field_read_embeds_transport_error() {
        let err = CoreError::FieldRead {
            field: FieldCategory::Pvids,
            source: nsdp_api::Error::Timeout { timeout_secs: 2 },
        };
        assert_eq!(
            err.to_string(),
            "Failed to retrieve pvids from switch: Request timed out after 2s"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
