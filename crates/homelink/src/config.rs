//! CLI configuration: thin wrapper around `homelink_config`.
//!
//! Adds `GlobalOpts`-aware path and profile resolution, and builds the
//! shared connection a command operates on.

use std::path::PathBuf;
use std::sync::Arc;

use homelink_core::{ConnectionInfo, Ports, SharedConnection, TracingTelemetry};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::probe;

// ── Re-exports from shared crate ────────────────────────────────────

pub use homelink_config::{
    Config, Profile, ProfileStore, config_path, load_config, load_config_file, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// `--config` / `HOMELINK_CONFIG`, else the platform default.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref())
}

pub fn profile_not_found(config: &Config, name: &str) -> CliError {
    let available: Vec<_> = config.profiles.keys().cloned().collect();
    CliError::ProfileNotFound {
        name: name.into(),
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

/// A loaded profile wired to its store, probe, and telemetry.
pub struct Session {
    pub profile: String,
    pub connection: SharedConnection,
}

/// Load the selected profile and restore its connection.
///
/// Every change the command makes is written back to the profile.
pub async fn open_session(global: &GlobalOpts) -> Result<Session, CliError> {
    let path = config_file(global);
    let cfg = load_config(&path)?;
    let name = active_profile_name(global, &cfg);
    let profile = cfg
        .profiles
        .get(&name)
        .ok_or_else(|| profile_not_found(&cfg, &name))?;

    let ports = Ports::new(
        Arc::new(ProfileStore::new(&path, name.as_str())),
        probe::network_probe(global.network.as_deref()).await,
        Arc::new(TracingTelemetry),
    );
    tracing::debug!(profile = %name, path = %path.display(), "profile loaded");

    Ok(Session {
        connection: SharedConnection::new(ConnectionInfo::restore(
            profile.connection.clone(),
            ports,
        )),
        profile: name,
    })
}
