// ── Persisted connection state ──
//
// `ConnectionRecord` is the flat storage form of a connection: URLs as
// strings, the active endpoint as a tag. It is what the settings store
// receives on every meaningful change and what a session is restored from.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::endpoint::Endpoint;

/// Flat, serializable snapshot of a connection configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_url: Option<Url>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<Url>,

    #[serde(
        default,
        alias = "remote_ui_url",
        skip_serializing_if = "Option::is_none"
    )]
    pub remote_relay_url: Option<Url>,

    /// Alternate delivery path for webhook calls only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudhook_url: Option<Url>,

    pub webhook_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<String>,

    /// Network identifiers (e.g. SSIDs) considered internal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trusted_networks: Option<BTreeSet<String>>,

    #[serde(default)]
    pub use_cloud_relay: bool,

    pub active_endpoint: Endpoint,
}

impl ConnectionRecord {
    /// The stored (unsanitized) address for an endpoint.
    pub fn address(&self, endpoint: Endpoint) -> Option<&Url> {
        match endpoint {
            Endpoint::Internal => self.internal_url.as_ref(),
            Endpoint::RemoteRelay => self.remote_relay_url.as_ref(),
            Endpoint::External => self.external_url.as_ref(),
        }
    }

    pub(crate) fn address_slot(&mut self, endpoint: Endpoint) -> &mut Option<Url> {
        match endpoint {
            Endpoint::Internal => &mut self.internal_url,
            Endpoint::RemoteRelay => &mut self.remote_relay_url,
            Endpoint::External => &mut self.external_url,
        }
    }

    pub fn has_address(&self, endpoint: Endpoint) -> bool {
        self.address(endpoint).is_some()
    }
}

impl fmt::Debug for ConnectionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRecord")
            .field("internal_url", &self.internal_url.as_ref().map(Url::as_str))
            .field("external_url", &self.external_url.as_ref().map(Url::as_str))
            .field(
                "remote_relay_url",
                &self.remote_relay_url.as_ref().map(Url::as_str),
            )
            .field("cloudhook_url", &self.cloudhook_url.as_ref().map(Url::as_str))
            .field("webhook_id", &self.webhook_id)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "****"))
            .field("trusted_networks", &self.trusted_networks)
            .field("use_cloud_relay", &self.use_cloud_relay)
            .field("active_endpoint", &self.active_endpoint)
            .finish()
    }
}

/// Input for building a fresh connection (e.g. from onboarding).
///
/// The active endpoint is not part of the setup; it is computed from the
/// addresses, the trusted networks, and the current network.
#[derive(Debug, Clone, Default)]
pub struct ConnectionSetup {
    pub internal_url: Option<Url>,
    pub external_url: Option<Url>,
    pub remote_relay_url: Option<Url>,
    pub cloudhook_url: Option<Url>,
    pub webhook_id: String,
    pub webhook_secret: Option<String>,
    pub trusted_networks: Option<BTreeSet<String>>,
    pub use_cloud_relay: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn decode_defaults_cloud_flag_to_false() {
        let record: ConnectionRecord = serde_json::from_value(json!({
            "external_url": "https://example.duckdns.org/",
            "webhook_id": "abc123",
            "active_endpoint": "external"
        }))
        .unwrap();

        assert!(!record.use_cloud_relay);
        assert_eq!(record.internal_url, None);
        assert_eq!(
            record.address(Endpoint::External).map(Url::as_str),
            Some("https://example.duckdns.org/")
        );
    }

    #[test]
    fn decode_accepts_remote_ui_aliases() {
        let record: ConnectionRecord = serde_json::from_value(json!({
            "remote_ui_url": "https://rl.example.com/",
            "webhook_id": "abc123",
            "active_endpoint": "remote_ui",
            "use_cloud_relay": true
        }))
        .unwrap();

        assert_eq!(record.active_endpoint, Endpoint::RemoteRelay);
        assert!(record.has_address(Endpoint::RemoteRelay));
    }

    #[test]
    fn decode_requires_active_endpoint() {
        let result: Result<ConnectionRecord, _> = serde_json::from_value(json!({
            "webhook_id": "abc123"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn debug_output_redacts_secret() {
        let record: ConnectionRecord = serde_json::from_value(json!({
            "webhook_id": "abc123",
            "webhook_secret": "hunter2",
            "active_endpoint": "external"
        }))
        .unwrap();

        let rendered = format!("{record:?}");
        assert!(rendered.contains("****"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn encode_omits_absent_fields() {
        let record = ConnectionRecord {
            internal_url: Some("http://10.0.0.5:8123/".parse().unwrap()),
            external_url: None,
            remote_relay_url: None,
            cloudhook_url: None,
            webhook_id: "abc123".into(),
            webhook_secret: None,
            trusted_networks: Some(BTreeSet::from(["HomeWifi".to_owned()])),
            use_cloud_relay: false,
            active_endpoint: Endpoint::Internal,
        };

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "internal_url": "http://10.0.0.5:8123/",
                "webhook_id": "abc123",
                "trusted_networks": ["HomeWifi"],
                "use_cloud_relay": false,
                "active_endpoint": "internal"
            })
        );
    }
}
