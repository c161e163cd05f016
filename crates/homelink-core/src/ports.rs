// ── Collaborator ports ──
//
// The core never touches disk, the OS network stack, or a telemetry
// backend directly. Those capabilities are injected through the traits
// below and bundled in `Ports`.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::record::ConnectionRecord;

// ── Traits ──────────────────────────────────────────────────────────

/// Durable storage for the connection record.
///
/// Called synchronously on every value-changing mutation. Failures are the
/// store's concern; implementations log and move on.
pub trait SettingsStore: Send + Sync {
    fn save(&self, record: &ConnectionRecord);
}

/// Answers "which network are we on right now".
///
/// Must be fast and synchronous. A probe backed by slow or async platform
/// APIs should be wrapped in [`CachedNetworkProbe`].
pub trait NetworkProbe: Send + Sync {
    fn current_network_identifier(&self) -> Option<String>;
}

/// Best-effort reporting of which remote connection method is in use.
pub trait ConnectionTelemetry: Send + Sync {
    fn record_connection_method(&self, method: &str);
}

// ── Ports bundle ────────────────────────────────────────────────────

/// The injected collaborators of a connection.
#[derive(Clone)]
pub struct Ports {
    pub store: Arc<dyn SettingsStore>,
    pub probe: Arc<dyn NetworkProbe>,
    pub telemetry: Arc<dyn ConnectionTelemetry>,
}

impl Ports {
    pub fn new(
        store: Arc<dyn SettingsStore>,
        probe: Arc<dyn NetworkProbe>,
        telemetry: Arc<dyn ConnectionTelemetry>,
    ) -> Self {
        Self {
            store,
            probe,
            telemetry,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn NetworkProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn ConnectionTelemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }
}

impl Default for Ports {
    fn default() -> Self {
        Self {
            store: Arc::new(NullStore),
            probe: Arc::new(NoNetworkProbe),
            telemetry: Arc::new(TracingTelemetry),
        }
    }
}

impl fmt::Debug for Ports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ports").finish_non_exhaustive()
    }
}

// ── Stores ──────────────────────────────────────────────────────────

/// Discards every save.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl SettingsStore for NullStore {
    fn save(&self, _record: &ConnectionRecord) {}
}

/// Keeps the last saved record in memory and counts saves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saves: AtomicUsize,
    last: Mutex<Option<ConnectionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn last_saved(&self) -> Option<ConnectionRecord> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SettingsStore for MemoryStore {
    fn save(&self, record: &ConnectionRecord) {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(record.clone());
    }
}

// ── Network probes ──────────────────────────────────────────────────

/// For platforms without network-identity access: never trusted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNetworkProbe;

impl NetworkProbe for NoNetworkProbe {
    fn current_network_identifier(&self) -> Option<String> {
        None
    }
}

/// Reports a network identifier that can be changed at runtime.
///
/// Used for `--network` overrides and as the deterministic fake in tests.
#[derive(Debug, Default)]
pub struct FixedNetworkProbe {
    current: Mutex<Option<String>>,
}

impl FixedNetworkProbe {
    pub fn new(identifier: Option<&str>) -> Self {
        Self {
            current: Mutex::new(identifier.map(str::to_owned)),
        }
    }

    pub fn set(&self, identifier: Option<&str>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) =
            identifier.map(str::to_owned);
    }
}

impl NetworkProbe for FixedNetworkProbe {
    fn current_network_identifier(&self) -> Option<String> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Last-known network identifier, readable without blocking.
///
/// The value is refreshed from a slower source by [`spawn_refresh`]
/// or pushed directly with [`update`].
///
/// [`spawn_refresh`]: CachedNetworkProbe::spawn_refresh
/// [`update`]: CachedNetworkProbe::update
#[derive(Debug, Default)]
pub struct CachedNetworkProbe {
    last: ArcSwapOption<String>,
}

impl CachedNetworkProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, identifier: Option<String>) {
        let previous = self.last.swap(identifier.map(Arc::new));
        let current = self.last.load();
        if previous.as_deref() != current.as_deref() {
            debug!(
                from = ?previous.as_deref(),
                to = ?current.as_deref(),
                "network identifier changed"
            );
        }
    }

    /// Poll `source` on a blocking thread every `every`, caching the result.
    ///
    /// Must be called from within a tokio runtime. Abort the returned
    /// handle to stop polling.
    pub fn spawn_refresh(
        self: &Arc<Self>,
        source: Arc<dyn NetworkProbe>,
        every: Duration,
    ) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let source = Arc::clone(&source);
                match tokio::task::spawn_blocking(move || source.current_network_identifier())
                    .await
                {
                    Ok(identifier) => cache.update(identifier),
                    Err(e) => warn!(error = %e, "network probe task failed"),
                }
            }
        })
    }
}

impl NetworkProbe for CachedNetworkProbe {
    fn current_network_identifier(&self) -> Option<String> {
        self.last.load_full().map(|id| id.as_ref().clone())
    }
}

// ── Telemetry ───────────────────────────────────────────────────────

/// Emits the connection method as a tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

impl ConnectionTelemetry for TracingTelemetry {
    fn record_connection_method(&self, method: &str) {
        info!(method, "remote connection method configured");
    }
}

/// Remembers every reported method, oldest first.
#[derive(Debug, Default)]
pub struct RecordingTelemetry {
    methods: Mutex<Vec<String>>,
}

impl RecordingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn methods(&self) -> Vec<String> {
        self.methods
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ConnectionTelemetry for RecordingTelemetry {
    fn record_connection_method(&self, method: &str) {
        self.methods
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(method.to_owned());
    }
}
