// ── Shared connection handle ──
//
// One `ConnectionInfo` per session, shared by the request builder, the
// failure handler, and settings. Every operation holds the lock for its
// whole read-then-write sequence, so concurrent callers always observe a
// consistent active endpoint.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use url::Url;

use crate::adapter::Surface;
use crate::connection::ConnectionInfo;
use crate::endpoint::{BaseUrl, Endpoint};
use crate::error::CoreError;
use crate::failover::{FailureKind, RetryDecision};
use crate::record::ConnectionRecord;

/// Cheaply cloneable, lock-guarded handle to a [`ConnectionInfo`].
#[derive(Debug, Clone)]
pub struct SharedConnection {
    inner: Arc<Mutex<ConnectionInfo>>,
}

impl SharedConnection {
    pub fn new(info: ConnectionInfo) -> Self {
        Self {
            inner: Arc::new(Mutex::new(info)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ConnectionInfo> {
        // Every mutation leaves the record consistent, so a panic elsewhere
        // does not invalidate it.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access.
    pub fn with<R>(&self, f: impl FnOnce(&mut ConnectionInfo) -> R) -> R {
        f(&mut *self.lock())
    }

    pub fn snapshot(&self) -> ConnectionRecord {
        self.lock().snapshot()
    }

    // ── Selection ────────────────────────────────────────────────────

    pub fn active_url(&self) -> Result<BaseUrl, CoreError> {
        self.lock().active_url()
    }

    pub fn active_api_url(&self) -> Result<Url, CoreError> {
        self.lock().active_api_url()
    }

    pub fn webhook_url(&self) -> Result<Url, CoreError> {
        self.lock().webhook_url()
    }

    pub fn active_endpoint(&self) -> Endpoint {
        self.lock().active_endpoint()
    }

    pub fn is_on_trusted_network(&self) -> bool {
        self.lock().is_on_trusted_network()
    }

    // ── Registry ─────────────────────────────────────────────────────

    pub fn address(&self, endpoint: Endpoint) -> Option<BaseUrl> {
        self.lock().address(endpoint)
    }

    pub fn set_address(&self, endpoint: Endpoint, address: Option<Url>) {
        self.lock().set_address(endpoint, address);
    }

    pub fn set_use_cloud_relay(&self, enabled: bool) {
        self.lock().set_use_cloud_relay(enabled);
    }

    pub fn set_active_endpoint(&self, endpoint: Endpoint) {
        self.lock().set_active_endpoint(endpoint);
    }

    pub fn set_trusted_networks(&self, networks: Option<BTreeSet<String>>) {
        self.lock().set_trusted_networks(networks);
    }

    // ── Adaptation & failover ────────────────────────────────────────

    pub fn adapt_url(&self, existing: &Url) -> Result<Url, CoreError> {
        self.lock().adapt_url(existing)
    }

    pub fn adapt_request(
        &self,
        request: &mut reqwest::Request,
        surface: Surface,
    ) -> Result<bool, CoreError> {
        self.lock().adapt_request(request, surface)
    }

    pub fn should_retry(&self, failed_url: &Url, failure: FailureKind) -> RetryDecision {
        self.lock().should_retry(failed_url, failure)
    }

    pub fn should_retry_reqwest(&self, err: &reqwest::Error) -> RetryDecision {
        self.lock().should_retry_reqwest(err)
    }
}

impl From<ConnectionInfo> for SharedConnection {
    fn from(info: ConnectionInfo) -> Self {
        Self::new(info)
    }
}
