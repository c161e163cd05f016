//! Profile storage for homelink.
//!
//! One TOML file holds any number of named server profiles, each a
//! flattened [`ConnectionRecord`]. [`ProfileStore`] plugs a profile into the
//! core as its [`SettingsStore`], so every endpoint switch is written back
//! to disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use homelink_core::{ConnectionRecord, SettingsStore};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// The profile to use: `explicit`, else `default_profile`, else `"default"`.
    pub fn profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| DEFAULT_PROFILE.into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }

    /// Insert or replace a profile.
    pub fn upsert_profile(&mut self, name: &str, profile: Profile) -> Result<(), ConfigError> {
        validate_profile_name(name)?;
        self.profiles.insert(name.into(), profile);
        Ok(())
    }

    /// Make an existing profile the default.
    pub fn set_default_profile(&mut self, name: &str) -> Result<(), ConfigError> {
        self.profile(name)?;
        self.default_profile = Some(name.into());
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// A named server profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    #[serde(flatten)]
    pub connection: ConnectionRecord,
}

impl From<ConnectionRecord> for Profile {
    fn from(connection: ConnectionRecord) -> Self {
        Self { connection }
    }
}

pub const DEFAULT_PROFILE: &str = "default";

/// Profile names become TOML table keys and CLI arguments.
pub fn validate_profile_name(name: &str) -> Result<(), ConfigError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::Validation {
            field: "profile".into(),
            reason: format!("'{name}' must be non-empty ASCII letters, digits, '-' or '_'"),
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "homelink", "homelink").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("homelink");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from `path`, then apply `HOMELINK_*` overrides.
///
/// Nested keys use `__`, e.g. `HOMELINK_PROFILES__HOME__USE_CLOUD_RELAY=true`.
/// A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = file_figment(path)
        .merge(Env::prefixed("HOMELINK_").split("__"))
        .extract()?;
    Ok(config)
}

/// Load the config from `path` alone, without environment overrides.
///
/// Used before writing so that overrides never leak into the file.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = file_figment(path).extract()?;
    Ok(config)
}

/// Load config, falling back to defaults if it cannot be read.
pub fn load_config_or_default(path: &Path) -> Config {
    load_config(path).unwrap_or_else(|err| {
        warn!(path = %path.display(), error = %err, "ignoring unreadable config");
        Config::default()
    })
}

fn file_figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Settings store ──────────────────────────────────────────────────

/// Persists one profile's connection record into the config file.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
    profile: String,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>, profile: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            profile: profile.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Rewrite the profile in place, leaving the rest of the file intact.
    pub fn write(&self, record: &ConnectionRecord) -> Result<(), ConfigError> {
        let mut cfg = load_config_file(&self.path)?;
        cfg.upsert_profile(&self.profile, Profile::from(record.clone()))?;
        save_config(&self.path, &cfg)?;
        debug!(profile = %self.profile, path = %self.path.display(), "profile saved");
        Ok(())
    }
}

impl SettingsStore for ProfileStore {
    fn save(&self, record: &ConnectionRecord) {
        if let Err(err) = self.write(record) {
            warn!(
                profile = %self.profile,
                path = %self.path.display(),
                error = %err,
                "failed to persist connection settings"
            );
        }
    }
}
