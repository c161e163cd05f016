// ── Endpoint identity types ──
//
// `Endpoint` names the three network paths to the backend. `BaseUrl` is the
// sanitized form of an endpoint address that is handed to callers: trailing
// path slashes are stripped, which `url::Url` alone cannot express for a
// root path.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use url::{Position, Url};

// ── Endpoint ────────────────────────────────────────────────────────

/// One of the three network paths to the backend.
///
/// Serialized as a snake_case tag. `remote_ui` is accepted on decode and
/// on the command line as an alias for [`RemoteRelay`](Self::RemoteRelay).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Endpoint {
    /// Local-network address, only usable on a trusted network.
    Internal,
    /// Cloud relay / tunnel address.
    #[serde(alias = "remote_ui")]
    #[strum(to_string = "remote_relay", serialize = "remote_ui", serialize = "remote")]
    RemoteRelay,
    /// Direct public address.
    External,
}

impl Endpoint {
    /// All variants, in the order they are considered for fallback.
    pub const ALL: [Self; 3] = [Self::Internal, Self::RemoteRelay, Self::External];

    /// Human-readable name for status output and log lines.
    pub fn label(self) -> &'static str {
        match self {
            Self::Internal => "Internal URL",
            Self::RemoteRelay => "Remote UI",
            Self::External => "External URL",
        }
    }

    /// Whether selecting this endpoint depends on the current network.
    pub fn is_affected_by_network(self) -> bool {
        matches!(self, Self::Internal)
    }

    /// Whether selecting this endpoint depends on the cloud relay preference.
    pub fn is_affected_by_cloud(self) -> bool {
        matches!(self, Self::RemoteRelay | Self::External)
    }
}

// ── BaseUrl ─────────────────────────────────────────────────────────

/// An endpoint address with trailing path slashes removed.
///
/// `http://10.0.0.5:8123/` renders as `http://10.0.0.5:8123`. The stored
/// address is never modified; a `BaseUrl` is built fresh on every read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    url: Url,
    rendered: String,
}

impl BaseUrl {
    pub fn new(url: &Url) -> Self {
        let path = url.path();
        let trimmed = path.trim_end_matches('/');

        if trimmed.len() == path.len() {
            return Self {
                url: url.clone(),
                rendered: url.as_str().to_owned(),
            };
        }

        let rendered = format!(
            "{}{}{}",
            &url[..Position::BeforePath],
            trimmed,
            &url[Position::AfterPath..]
        );
        let mut sanitized = url.clone();
        sanitized.set_path(trimmed);

        Self {
            url: sanitized,
            rendered,
        }
    }

    /// The sanitized address as a string, without a trailing slash.
    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    /// The sanitized address as a `Url`.
    ///
    /// For a root path `Url` re-inserts the `/`; use [`as_str`](Self::as_str)
    /// when the exact rendering matters.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn into_url(self) -> Url {
        self.url
    }

    /// `scheme://[userinfo@]host[:port]`, without any path.
    pub fn origin(&self) -> &str {
        &self.url[..Position::BeforePath]
    }

    /// Append a relative path (`api/webhook/abc`) to this base.
    pub fn join(&self, path: &str) -> Result<Url, url::ParseError> {
        let base = &self.url[..Position::AfterPath];
        let base = base.trim_end_matches('/');
        Url::parse(&format!("{base}/{}", path.trim_start_matches('/')))
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

impl From<&Url> for BaseUrl {
    fn from(url: &Url) -> Self {
        Self::new(url)
    }
}

// ── Comparison helpers ──────────────────────────────────────────────

/// Equality that ignores trailing slashes on the path of either side.
pub(crate) fn same_address(a: &Url, b: &Url) -> bool {
    BaseUrl::new(a).as_str() == BaseUrl::new(b).as_str()
}

/// Scheme, host, and effective port match.
pub(crate) fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        s.parse().unwrap()
    }

    #[test]
    fn root_slash_is_stripped() {
        let base = BaseUrl::new(&url("http://10.0.0.5:8123/"));
        assert_eq!(base.as_str(), "http://10.0.0.5:8123");
        assert_eq!(base.to_string(), "http://10.0.0.5:8123");
    }

    #[test]
    fn repeated_slashes_are_stripped() {
        let base = BaseUrl::new(&url("https://example.com/ha///"));
        assert_eq!(base.as_str(), "https://example.com/ha");
        assert_eq!(base.url().path(), "/ha");
    }

    #[test]
    fn query_survives_sanitizing() {
        let base = BaseUrl::new(&url("https://example.com/ha/?x=1"));
        assert_eq!(base.as_str(), "https://example.com/ha?x=1");
    }

    #[test]
    fn clean_url_is_untouched() {
        let base = BaseUrl::new(&url("https://example.com/ha"));
        assert_eq!(base.as_str(), "https://example.com/ha");
    }

    #[test]
    fn join_appends_relative_path() {
        let base = BaseUrl::new(&url("http://10.0.0.5:8123/"));
        assert_eq!(
            base.join("api/webhook/abc").unwrap().as_str(),
            "http://10.0.0.5:8123/api/webhook/abc"
        );

        let prefixed = BaseUrl::new(&url("https://example.com/ha/"));
        assert_eq!(
            prefixed.join("/api").unwrap().as_str(),
            "https://example.com/ha/api"
        );
    }

    #[test]
    fn origin_drops_path() {
        let base = BaseUrl::new(&url("https://user@example.com:8443/ha"));
        assert_eq!(base.origin(), "https://user@example.com:8443");
    }

    #[test]
    fn endpoint_parses_aliases() {
        assert_eq!("internal".parse::<Endpoint>().unwrap(), Endpoint::Internal);
        assert_eq!(
            "remote_ui".parse::<Endpoint>().unwrap(),
            Endpoint::RemoteRelay
        );
        assert_eq!("Remote".parse::<Endpoint>().unwrap(), Endpoint::RemoteRelay);
        assert_eq!(Endpoint::RemoteRelay.to_string(), "remote_relay");
        assert!("relay-ish".parse::<Endpoint>().is_err());
    }

    #[test]
    fn endpoint_flags() {
        assert!(Endpoint::Internal.is_affected_by_network());
        assert!(!Endpoint::Internal.is_affected_by_cloud());
        assert!(Endpoint::External.is_affected_by_cloud());
        assert!(!Endpoint::RemoteRelay.is_affected_by_network());
    }

    #[test]
    fn address_comparison_ignores_trailing_slash() {
        assert!(same_address(
            &url("https://rl.example.com/"),
            &url("https://rl.example.com")
        ));
        assert!(!same_address(
            &url("https://rl.example.com/api"),
            &url("https://rl.example.com")
        ));
    }

    #[test]
    fn origin_comparison_uses_default_ports() {
        assert!(same_origin(
            &url("https://example.com:443/a"),
            &url("https://example.com/b")
        ));
        assert!(!same_origin(
            &url("http://example.com/"),
            &url("https://example.com/")
        ));
    }
}
