// ── Core error types ──
//
// Endpoint selection only fails when there is nothing left to select.
// Failover outcomes are decisions, not errors, and live in `failover`.

use thiserror::Error;

use crate::endpoint::Endpoint;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No endpoint of any kind is configured or reachable.
    ///
    /// Callers should prompt for an address or abort the request; the core
    /// never substitutes a placeholder URL.
    #[error(
        "no usable endpoint: {} is active but no internal, remote, or external URL can be used",
        active.label()
    )]
    NoEndpointAvailable { active: Endpoint },

    /// A target URL could not be built while adapting a request.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl CoreError {
    /// Returns `true` for the configuration-exhausted condition.
    pub fn is_no_endpoint(&self) -> bool {
        matches!(self, Self::NoEndpointAvailable { .. })
    }
}
