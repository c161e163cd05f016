//! Endpoint selection for a client that reaches one self-hosted backend over
//! several network paths.
//!
//! The backend may be reachable on the local network (**internal**), over the
//! internet (**external**), or through a cloud tunnel (**remote relay**). This
//! crate decides which of those a request should use right now:
//!
//! - **[`ConnectionInfo`]**: the endpoint registry and active-endpoint state
//!   machine. [`active_url()`](ConnectionInfo::active_url) lazily corrects the
//!   active endpoint whenever it is unconfigured or the network changed.
//!
//! - **URL adaptation**: [`adapt_request()`](ConnectionInfo::adapt_request)
//!   moves a pending `reqwest::Request` onto the active endpoint; webhook
//!   requests may instead go to the cloudhook URL.
//!
//! - **Failover**: [`should_retry()`](ConnectionInfo::should_retry) decides
//!   whether a failed request is the endpoint's fault and, if so, switches to
//!   another one.
//!
//! - **[`SharedConnection`]**: the lock-guarded handle consumers share.
//!
//! Persistence, network identity, and telemetry are injected through
//! [`Ports`]. Nothing here performs I/O or blocks on the network.

pub mod adapter;
pub mod connection;
pub mod endpoint;
pub mod error;
pub mod failover;
pub mod ports;
pub mod record;
pub mod selector;
pub mod shared;

// ── Primary re-exports ──────────────────────────────────────────────
pub use adapter::Surface;
pub use connection::ConnectionInfo;
pub use endpoint::{BaseUrl, Endpoint};
pub use error::CoreError;
pub use failover::{FailureKind, RetryDecision};
pub use ports::{
    CachedNetworkProbe, ConnectionTelemetry, FixedNetworkProbe, MemoryStore, NetworkProbe,
    NoNetworkProbe, NullStore, Ports, RecordingTelemetry, SettingsStore, TracingTelemetry,
};
pub use record::{ConnectionRecord, ConnectionSetup};
pub use shared::SharedConnection;
