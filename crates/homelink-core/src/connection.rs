// ── Endpoint registry ──
//
// `ConnectionInfo` owns the connection record and its collaborators.
// This module holds construction and typed field access. Every setter
// compares old and new values; only a real change reaches the settings
// store. Active-endpoint selection lives in `selector`.

use std::collections::BTreeSet;

use secrecy::SecretString;
use tracing::debug;
use url::Url;

use crate::endpoint::{BaseUrl, Endpoint};
use crate::ports::Ports;
use crate::record::{ConnectionRecord, ConnectionSetup};

/// A connection to the backend over up to three endpoints.
///
/// Not internally synchronized; share it through
/// [`SharedConnection`](crate::SharedConnection).
#[derive(Debug)]
pub struct ConnectionInfo {
    pub(crate) record: ConnectionRecord,
    pub(crate) ports: Ports,
}

impl ConnectionInfo {
    /// Build a fresh connection and pick its initial active endpoint.
    ///
    /// Construction does not persist; the first change does.
    pub fn new(setup: ConnectionSetup, ports: Ports) -> Self {
        let record = ConnectionRecord {
            internal_url: setup.internal_url,
            external_url: setup.external_url,
            remote_relay_url: setup.remote_relay_url,
            cloudhook_url: setup.cloudhook_url,
            webhook_id: setup.webhook_id,
            webhook_secret: setup.webhook_secret,
            trusted_networks: setup.trusted_networks,
            use_cloud_relay: setup.use_cloud_relay,
            active_endpoint: Endpoint::External,
        };
        let mut info = Self { record, ports };
        info.record.active_endpoint = info.initial_endpoint();
        debug!(active = %info.record.active_endpoint, "initial endpoint selected");
        info
    }

    /// Resume from a stored record, keeping its active endpoint as-is.
    ///
    /// The active endpoint is corrected lazily on the next
    /// [`active_url`](Self::active_url) call.
    pub fn restore(record: ConnectionRecord, ports: Ports) -> Self {
        Self { record, ports }
    }

    pub fn record(&self) -> &ConnectionRecord {
        &self.record
    }

    pub fn snapshot(&self) -> ConnectionRecord {
        self.record.clone()
    }

    pub fn into_record(self) -> ConnectionRecord {
        self.record
    }

    pub fn ports(&self) -> &Ports {
        &self.ports
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Sanitized address of `endpoint`, if configured.
    pub fn address(&self, endpoint: Endpoint) -> Option<BaseUrl> {
        self.record.address(endpoint).map(BaseUrl::new)
    }

    pub fn cloudhook_url(&self) -> Option<BaseUrl> {
        self.record.cloudhook_url.as_ref().map(BaseUrl::new)
    }

    pub fn webhook_id(&self) -> &str {
        &self.record.webhook_id
    }

    pub fn webhook_secret(&self) -> Option<SecretString> {
        self.record.webhook_secret.clone().map(SecretString::from)
    }

    pub fn trusted_networks(&self) -> Option<&BTreeSet<String>> {
        self.record.trusted_networks.as_ref()
    }

    pub fn use_cloud_relay(&self) -> bool {
        self.record.use_cloud_relay
    }

    /// The nominally active endpoint, which may not be configured.
    ///
    /// Use [`active_url`](Self::active_url) to get a usable address.
    pub fn active_endpoint(&self) -> Endpoint {
        self.record.active_endpoint
    }

    /// `true` when the probe reports a network listed as trusted.
    ///
    /// Evaluated on every call; the network can change at any time.
    pub fn is_on_trusted_network(&self) -> bool {
        let Some(trusted) = self.record.trusted_networks.as_ref() else {
            return false;
        };
        self.ports
            .probe
            .current_network_identifier()
            .is_some_and(|current| trusted.contains(&current))
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Store an address without touching the active endpoint.
    ///
    /// Returns whether the value changed.
    pub(crate) fn store_address(&mut self, endpoint: Endpoint, address: Option<Url>) -> bool {
        let slot = self.record.address_slot(endpoint);
        let was_absent = slot.is_none();
        if !replace(slot, address) {
            return false;
        }

        let now_present = self.record.has_address(endpoint);
        self.persist();
        if was_absent && now_present && endpoint.is_affected_by_cloud() {
            self.ports
                .telemetry
                .record_connection_method(<&'static str>::from(endpoint));
        }
        true
    }

    pub fn set_cloudhook_url(&mut self, url: Option<Url>) {
        if replace(&mut self.record.cloudhook_url, url) {
            self.persist();
        }
    }

    pub fn set_webhook_id(&mut self, webhook_id: impl Into<String>) {
        if replace(&mut self.record.webhook_id, webhook_id.into()) {
            self.persist();
        }
    }

    pub fn set_webhook_secret(&mut self, secret: Option<String>) {
        if replace(&mut self.record.webhook_secret, secret) {
            self.persist();
        }
    }

    pub fn set_trusted_networks(&mut self, networks: Option<BTreeSet<String>>) {
        if replace(&mut self.record.trusted_networks, networks) {
            self.persist();
        }
    }

    /// Force the active endpoint. No validation: an unconfigured endpoint
    /// is corrected on the next [`active_url`](Self::active_url) call.
    pub fn set_active_endpoint(&mut self, endpoint: Endpoint) {
        let previous = self.record.active_endpoint;
        if !replace(&mut self.record.active_endpoint, endpoint) {
            return;
        }

        debug!(
            from = %previous,
            from_url = self.record.address(previous).map_or("unknown", Url::as_str),
            to = %endpoint,
            to_url = self.record.address(endpoint).map_or("unknown", Url::as_str),
            "switched active endpoint"
        );
        self.persist();
    }

    pub(crate) fn persist(&self) {
        self.ports.store.save(&self.record);
    }
}

/// Write `value` into `slot` if it differs. Returns whether it changed.
fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
