//! CLI error types with miette diagnostics.
//!
//! Maps core and config errors into user-facing errors with actionable
//! help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use homelink_config::ConfigError;
use homelink_core::{CoreError, Endpoint};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const NO_ENDPOINT: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Endpoints ────────────────────────────────────────────────────
    #[error("No usable endpoint ({} is active)", active.label())]
    #[diagnostic(
        code(homelink::no_endpoint),
        help(
            "Configure at least one address, for example:\n\
             homelink address set external https://example.duckdns.org"
        )
    )]
    NoEndpoint { active: Endpoint },

    #[error("Could not reach {url}")]
    #[diagnostic(
        code(homelink::connection_failed),
        help(
            "No endpoint answered. Check the addresses with: homelink status\n\
             Run with -vv to see each failover decision."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(homelink::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(homelink::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: homelink config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration error")]
    #[diagnostic(
        code(homelink::config),
        help("Check the file printed by: homelink config path")
    )]
    Config(#[source] ConfigError),

    // ── IO ────────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoEndpoint { .. } => exit_code::NO_ENDPOINT,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Config(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }

    pub fn invalid_url(field: &str, value: &str, err: &url::ParseError) -> Self {
        Self::Validation {
            field: field.into(),
            reason: format!("'{value}' is not an absolute URL ({err})"),
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NoEndpointAvailable { active } => Self::NoEndpoint { active },
            CoreError::InvalidUrl(e) => Self::Validation {
                field: "url".into(),
                reason: e.to_string(),
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name } => Self::ProfileNotFound {
                name,
                available: "(see: homelink config show)".into(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

impl From<reqwest::Error> for CliError {
    fn from(err: reqwest::Error) -> Self {
        Self::ConnectionFailed {
            url: err
                .url()
                .map_or_else(|| "(unknown)".into(), ToString::to_string),
            source: Box::new(err),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(
            CliError::from(CoreError::NoEndpointAvailable {
                active: Endpoint::External
            })
            .exit_code(),
            9
        );
        assert_eq!(
            CliError::from(ConfigError::ProfileNotFound {
                name: "cabin".into()
            })
            .exit_code(),
            4
        );
        let bad = url::Url::parse("not a url").unwrap_err();
        assert_eq!(CliError::invalid_url("url", "not a url", &bad).exit_code(), 2);
    }

    #[test]
    fn no_endpoint_names_the_active_label() {
        let err = CliError::NoEndpoint {
            active: Endpoint::RemoteRelay,
        };
        assert_eq!(err.to_string(), "No usable endpoint (Remote UI is active)");
    }
}
