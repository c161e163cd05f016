// ── Failure-driven failover ──
//
// Only two failures are blamed on the endpoint itself:
//
// 1. The relay is active and a request to it failed below HTTP, meaning
//    the tunnel is down.
// 2. The internal endpoint is active and a request to it failed, which is
//    taken to mean we left the trusted network.
//
// Everything else is the request's own problem and is not retried.

use std::fmt;

use tracing::{debug, error, warn};
use url::Url;

use crate::connection::ConnectionInfo;
use crate::endpoint::{Endpoint, same_address};

/// How a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connection, DNS, TLS, timeout, or a broken body: no usable HTTP
    /// response came back.
    Transport,
    /// The server answered with an error status.
    Http { status: u16 },
    /// Anything else (decode failures, redirect loops, builder errors).
    Other,
}

impl FailureKind {
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
            }
        } else if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() {
            Self::Transport
        } else {
            Self::Other
        }
    }

    pub fn is_transport(self) -> bool {
        matches!(self, Self::Transport)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => f.write_str("transport"),
            Self::Http { status } => write!(f, "http {status}"),
            Self::Other => f.write_str("other"),
        }
    }
}

/// Outcome of consulting the failover policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// The active endpoint was switched; send the request again.
    Retry { from: Endpoint, to: Endpoint },
    /// The failure is not about endpoint reachability.
    Declined,
    /// The endpoint is to blame, but there is nowhere else to go.
    Exhausted,
}

impl RetryDecision {
    pub fn should_retry(self) -> bool {
        matches!(self, Self::Retry { .. })
    }
}

impl ConnectionInfo {
    /// Decide whether a failed request should be retried on another endpoint,
    /// switching the active endpoint if so.
    pub fn should_retry(&mut self, failed_url: &Url, failure: FailureKind) -> RetryDecision {
        let active = self.record.active_endpoint;
        let sent_to_active = self
            .record
            .address(active)
            .is_some_and(|address| same_address(address, failed_url));

        let relay_down =
            active == Endpoint::RemoteRelay && sent_to_active && failure.is_transport();
        let left_network = active == Endpoint::Internal && sent_to_active;

        debug!(%failed_url, %failure, %active, relay_down, left_network, "evaluating failover");

        let next = if relay_down {
            if self.record.internal_url.is_some() && self.is_on_trusted_network() {
                Some(Endpoint::Internal)
            } else if self.record.external_url.is_some() {
                Some(Endpoint::External)
            } else {
                None
            }
        } else if left_network {
            if self.record.use_cloud_relay && self.record.remote_relay_url.is_some() {
                Some(Endpoint::RemoteRelay)
            } else if self.record.external_url.is_some() {
                Some(Endpoint::External)
            } else {
                None
            }
        } else {
            debug!(%active, %failure, "failure is not about endpoint reachability; not retrying");
            return RetryDecision::Declined;
        };

        match next {
            Some(to) => {
                self.set_active_endpoint(to);
                RetryDecision::Retry { from: active, to }
            }
            None => {
                warn!(%active, "endpoint failed and no alternative is configured");
                RetryDecision::Exhausted
            }
        }
    }

    /// [`should_retry`](Self::should_retry) for a reqwest failure.
    pub fn should_retry_reqwest(&mut self, err: &reqwest::Error) -> RetryDecision {
        let Some(url) = err.url() else {
            error!(error = %err, "failed request carries no URL");
            return RetryDecision::Declined;
        };
        let url = url.clone();
        self.should_retry(&url, FailureKind::from_reqwest(err))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ports::{FixedNetworkProbe, MemoryStore, Ports};
    use crate::record::ConnectionRecord;

    const INTERNAL: &str = "http://10.0.0.5:8123/";
    const EXTERNAL: &str = "https://example.duckdns.org/";
    const RELAY: &str = "https://rl.example.com/";

    fn url(s: &str) -> Url {
        s.parse().unwrap()
    }

    fn record(active: Endpoint) -> ConnectionRecord {
        ConnectionRecord {
            internal_url: Some(url(INTERNAL)),
            external_url: Some(url(EXTERNAL)),
            remote_relay_url: Some(url(RELAY)),
            cloudhook_url: None,
            webhook_id: "abc".into(),
            webhook_secret: None,
            trusted_networks: Some(BTreeSet::from(["HomeWifi".to_owned()])),
            use_cloud_relay: true,
            active_endpoint: active,
        }
    }

    fn restore(record: ConnectionRecord, network: Option<&str>) -> (Arc<MemoryStore>, ConnectionInfo) {
        let store = Arc::new(MemoryStore::new());
        let ports = Ports::default()
            .with_store(store.clone())
            .with_probe(Arc::new(FixedNetworkProbe::new(network)));
        (store, ConnectionInfo::restore(record, ports))
    }

    #[test]
    fn relay_transport_failure_switches_to_external() {
        let (store, mut info) = restore(
            ConnectionRecord {
                internal_url: None,
                ..record(Endpoint::RemoteRelay)
            },
            None,
        );

        let decision = info.should_retry(&url(RELAY), FailureKind::Transport);
        assert_eq!(
            decision,
            RetryDecision::Retry {
                from: Endpoint::RemoteRelay,
                to: Endpoint::External
            }
        );
        assert_eq!(info.active_url().unwrap().as_str(), "https://example.duckdns.org");
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn relay_transport_failure_prefers_trusted_internal() {
        let (_, mut info) = restore(record(Endpoint::RemoteRelay), Some("HomeWifi"));
        let decision = info.should_retry(&url("https://rl.example.com"), FailureKind::Transport);
        assert_eq!(
            decision,
            RetryDecision::Retry {
                from: Endpoint::RemoteRelay,
                to: Endpoint::Internal
            }
        );
    }

    #[test]
    fn relay_http_error_is_declined() {
        let (store, mut info) = restore(record(Endpoint::RemoteRelay), None);
        let decision = info.should_retry(&url(RELAY), FailureKind::Http { status: 502 });
        assert_eq!(decision, RetryDecision::Declined);
        assert_eq!(info.active_endpoint(), Endpoint::RemoteRelay);
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn relay_failure_without_alternative_is_exhausted() {
        let (_, mut info) = restore(
            ConnectionRecord {
                internal_url: None,
                external_url: None,
                ..record(Endpoint::RemoteRelay)
            },
            None,
        );
        let decision = info.should_retry(&url(RELAY), FailureKind::Transport);
        assert_eq!(decision, RetryDecision::Exhausted);
        assert!(!decision.should_retry());
        assert_eq!(info.active_endpoint(), Endpoint::RemoteRelay);
    }

    #[test]
    fn internal_failure_of_any_kind_switches() {
        for failure in [
            FailureKind::Transport,
            FailureKind::Http { status: 404 },
            FailureKind::Other,
        ] {
            let (_, mut info) = restore(record(Endpoint::Internal), Some("HomeWifi"));
            let decision = info.should_retry(&url(INTERNAL), failure);
            assert_eq!(
                decision,
                RetryDecision::Retry {
                    from: Endpoint::Internal,
                    to: Endpoint::RemoteRelay
                },
                "{failure}"
            );
        }
    }

    #[test]
    fn internal_failure_without_relay_preference_goes_external() {
        let (_, mut info) = restore(
            ConnectionRecord {
                use_cloud_relay: false,
                ..record(Endpoint::Internal)
            },
            Some("HomeWifi"),
        );
        let decision = info.should_retry(&url(INTERNAL), FailureKind::Transport);
        assert_eq!(
            decision,
            RetryDecision::Retry {
                from: Endpoint::Internal,
                to: Endpoint::External
            }
        );
    }

    #[test]
    fn internal_failure_without_alternative_is_exhausted() {
        let (_, mut info) = restore(
            ConnectionRecord {
                external_url: None,
                remote_relay_url: None,
                ..record(Endpoint::Internal)
            },
            Some("HomeWifi"),
        );
        assert_eq!(
            info.should_retry(&url(INTERNAL), FailureKind::Transport),
            RetryDecision::Exhausted
        );
    }

    #[test]
    fn failure_on_other_url_is_declined() {
        let (_, mut info) = restore(record(Endpoint::Internal), Some("HomeWifi"));
        assert_eq!(
            info.should_retry(&url(EXTERNAL), FailureKind::Transport),
            RetryDecision::Declined
        );

        let (_, mut info) = restore(record(Endpoint::External), None);
        assert_eq!(
            info.should_retry(&url(EXTERNAL), FailureKind::Transport),
            RetryDecision::Declined
        );
    }

    #[test]
    fn failure_kind_display() {
        assert_eq!(FailureKind::Transport.to_string(), "transport");
        assert_eq!(FailureKind::Http { status: 503 }.to_string(), "http 503");
    }
}
