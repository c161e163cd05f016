// ── Active endpoint selection ──
//
// Which endpoint is active depends on three optional addresses, the cloud
// relay preference, and whether the current network is trusted. The
// trusted local network always wins when it is configured and reachable;
// relay and external are interchangeable remote paths gated by the
// preference and by availability.

use tracing::{debug, error};
use url::Url;

use crate::connection::ConnectionInfo;
use crate::endpoint::{BaseUrl, Endpoint};
use crate::error::CoreError;

/// One step of the lazy-correction walk.
enum Step {
    /// Hand this address to the caller.
    Resolve(Url),
    /// Make this endpoint active and look again.
    SwitchTo(Endpoint),
    /// Nothing left to try.
    Exhausted,
}

impl ConnectionInfo {
    /// Endpoint chosen for a freshly built connection.
    pub(crate) fn initial_endpoint(&self) -> Endpoint {
        let r = &self.record;
        if r.internal_url.is_some() && r.trusted_networks.is_some() && self.is_on_trusted_network()
        {
            Endpoint::Internal
        } else if self.relay_preferred() {
            Endpoint::RemoteRelay
        } else {
            Endpoint::External
        }
    }

    /// Cloud relay preferred and a relay address configured.
    fn relay_preferred(&self) -> bool {
        self.record.use_cloud_relay && self.record.remote_relay_url.is_some()
    }

    /// Internal address configured and the current network is trusted.
    fn internal_reachable(&self) -> bool {
        self.record.internal_url.is_some() && self.is_on_trusted_network()
    }

    // ── Mutations with transitions ───────────────────────────────────

    /// Update the address for `endpoint` and re-select the active endpoint.
    pub fn set_address(&mut self, endpoint: Endpoint, address: Option<Url>) {
        if !self.store_address(endpoint, address) {
            return;
        }
        let present = self.record.has_address(endpoint);

        let next = match (endpoint, present) {
            (Endpoint::Internal, false) => Some(if self.relay_preferred() {
                Endpoint::RemoteRelay
            } else {
                Endpoint::External
            }),
            (Endpoint::Internal, true) => self
                .is_on_trusted_network()
                .then_some(Endpoint::Internal),

            (Endpoint::External, false) => {
                if self.internal_reachable() {
                    Some(Endpoint::Internal)
                } else if self.relay_preferred() {
                    Some(Endpoint::RemoteRelay)
                } else {
                    None
                }
            }
            (Endpoint::External, true) => {
                (self.record.active_endpoint != Endpoint::Internal).then_some(Endpoint::External)
            }

            (Endpoint::RemoteRelay, false) => {
                if self.internal_reachable() {
                    Some(Endpoint::Internal)
                } else if self.record.external_url.is_some() {
                    Some(Endpoint::External)
                } else {
                    None
                }
            }
            (Endpoint::RemoteRelay, true) => (self.record.active_endpoint != Endpoint::Internal
                && self.record.use_cloud_relay)
                .then_some(Endpoint::RemoteRelay),
        };

        if let Some(next) = next {
            self.set_active_endpoint(next);
        }
    }

    /// Toggle the cloud relay preference and re-select the active endpoint.
    pub fn set_use_cloud_relay(&mut self, enabled: bool) {
        if self.record.use_cloud_relay == enabled {
            return;
        }
        self.record.use_cloud_relay = enabled;
        self.persist();

        let next = if self.internal_reachable() {
            Endpoint::Internal
        } else if enabled {
            Endpoint::RemoteRelay
        } else {
            Endpoint::External
        };
        self.set_active_endpoint(next);
    }

    // ── Lazy correction ──────────────────────────────────────────────

    /// The address requests should use right now.
    ///
    /// Corrects the active endpoint first if it is unconfigured or if the
    /// network situation changed; every switch is persisted. Fails only
    /// when no endpoint can be used at all.
    pub fn active_url(&mut self) -> Result<BaseUrl, CoreError> {
        let trusted = self.is_on_trusted_network();
        let mut visited: Vec<Endpoint> = Vec::with_capacity(Endpoint::ALL.len());

        loop {
            let active = self.record.active_endpoint;
            if visited.contains(&active) {
                return Err(self.exhausted());
            }
            visited.push(active);

            match self.correction_step(active, trusted) {
                Step::Resolve(url) => return Ok(BaseUrl::new(&url)),
                Step::SwitchTo(next) => {
                    debug!(from = %active, to = %next, trusted, "correcting active endpoint");
                    self.set_active_endpoint(next);
                }
                Step::Exhausted => return Err(self.exhausted()),
            }
        }
    }

    fn correction_step(&self, active: Endpoint, trusted: bool) -> Step {
        let r = &self.record;
        let relay_preferred = self.relay_preferred();
        let internal_reachable = r.internal_url.is_some() && trusted;

        match active {
            Endpoint::Internal => match &r.internal_url {
                Some(url) if trusted => Step::Resolve(url.clone()),
                // Configured but off the trusted network: move to a remote
                // path if there is one, otherwise keep the stale address.
                Some(url) => {
                    if relay_preferred {
                        Step::SwitchTo(Endpoint::RemoteRelay)
                    } else if r.external_url.is_some() {
                        Step::SwitchTo(Endpoint::External)
                    } else {
                        Step::Resolve(url.clone())
                    }
                }
                None => Step::SwitchTo(if relay_preferred {
                    Endpoint::RemoteRelay
                } else {
                    Endpoint::External
                }),
            },

            Endpoint::RemoteRelay => match &r.remote_relay_url {
                Some(_) if internal_reachable => Step::SwitchTo(Endpoint::Internal),
                Some(url) => Step::Resolve(url.clone()),
                None if r.external_url.is_some() => Step::SwitchTo(Endpoint::External),
                None => Step::Exhausted,
            },

            Endpoint::External => match &r.external_url {
                Some(_) if internal_reachable => Step::SwitchTo(Endpoint::Internal),
                Some(url) => Step::Resolve(url.clone()),
                None if relay_preferred => Step::SwitchTo(Endpoint::RemoteRelay),
                None => Step::Exhausted,
            },
        }
    }

    fn exhausted(&self) -> CoreError {
        let r = &self.record;
        error!(
            active = %r.active_endpoint,
            internal = ?r.internal_url.as_ref().map(Url::as_str),
            external = ?r.external_url.as_ref().map(Url::as_str),
            remote = ?r.remote_relay_url.as_ref().map(Url::as_str),
            "active endpoint has no usable address"
        );
        CoreError::NoEndpointAvailable {
            active: r.active_endpoint,
        }
    }
}
