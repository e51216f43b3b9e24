use thiserror::Error;

use crate::mac::MacAddress;

/// Top-level error type for the `nsdp-api` crate.
///
/// Covers every failure a device-handle provider can report: session
/// establishment, transport, and per-request rejections.
/// `nsdp-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Session ─────────────────────────────────────────────────────
    /// Login failed (wrong password, account locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// No switch with this hardware address answered discovery.
    #[error("Switch {mac} did not respond")]
    Unreachable { mac: MacAddress },

    // ── Transport ───────────────────────────────────────────────────
    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Reply could not be decoded or did not match the request.
    #[error("Protocol error: {0}")]
    Protocol(String),

    // ── Requests ────────────────────────────────────────────────────
    /// The switch refused a request.
    #[error("Switch rejected {operation}: {message}")]
    Rejected { operation: String, message: String },

    /// The firmware has no primitive for this request.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    // ── Simulated device persistence ────────────────────────────────
    #[error("Device state I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Device state file is malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` if the session could not be authenticated.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}
