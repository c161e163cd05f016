//! Shared helpers for command handlers.

use url::Url;

use homelink_core::{Endpoint, SharedConnection};

use crate::cli::EndpointArg;
use crate::error::CliError;

impl From<EndpointArg> for Endpoint {
    fn from(arg: EndpointArg) -> Self {
        match arg {
            EndpointArg::Internal => Self::Internal,
            EndpointArg::RemoteRelay => Self::RemoteRelay,
            EndpointArg::External => Self::External,
        }
    }
}

/// Parse a user-supplied absolute URL.
pub fn parse_url(field: &str, value: &str) -> Result<Url, CliError> {
    let url = Url::parse(value).map_err(|e| CliError::invalid_url(field, value, &e))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(CliError::Validation {
            field: field.into(),
            reason: format!("'{value}' must be an http or https URL"),
        });
    }
    Ok(url)
}

/// "External URL (https://example.duckdns.org)", or why nothing is usable.
pub fn describe_active(conn: &SharedConnection) -> String {
    conn.with(|info| match info.active_url() {
        Ok(url) => format!("{} ({url})", info.active_endpoint().label()),
        Err(e) => e.to_string(),
    })
}
