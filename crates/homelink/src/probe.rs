//! Platform network probe.
//!
//! Asks the OS for the current Wi-Fi network name. The lookup shells out,
//! so it runs once on a blocking thread and the core reads the cached value.

use std::process::Command;
use std::sync::Arc;

use tracing::{debug, warn};

use homelink_core::{CachedNetworkProbe, FixedNetworkProbe, NetworkProbe};

/// Reads the SSID from `iwgetid` (Linux) or `networksetup` (macOS).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNetworkProbe;

impl NetworkProbe for SystemNetworkProbe {
    fn current_network_identifier(&self) -> Option<String> {
        query()
    }
}

#[cfg(target_os = "linux")]
fn query() -> Option<String> {
    run("iwgetid", &["-r"]).and_then(|out| parse_iwgetid(&out))
}

#[cfg(target_os = "macos")]
fn query() -> Option<String> {
    run("networksetup", &["-getairportnetwork", "en0"]).and_then(|out| parse_networksetup(&out))
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn query() -> Option<String> {
    None
}

#[cfg_attr(not(any(target_os = "linux", target_os = "macos")), allow(dead_code))]
fn run(program: &str, args: &[&str]) -> Option<String> {
    match Command::new(program).args(args).output() {
        Ok(out) if out.status.success() => String::from_utf8(out.stdout).ok(),
        Ok(out) => {
            debug!(program, status = %out.status, "network probe returned no network");
            None
        }
        Err(e) => {
            debug!(program, error = %e, "network probe unavailable");
            None
        }
    }
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_iwgetid(output: &str) -> Option<String> {
    let ssid = output.trim();
    (!ssid.is_empty()).then(|| ssid.to_owned())
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn parse_networksetup(output: &str) -> Option<String> {
    output
        .trim()
        .strip_prefix("Current Wi-Fi Network: ")
        .map(str::trim)
        .filter(|ssid| !ssid.is_empty())
        .map(str::to_owned)
}

/// The probe the core should use.
///
/// `--network` pins the identifier (an empty value means "no network");
/// otherwise the system is asked once and the answer cached.
pub async fn network_probe(pinned: Option<&str>) -> Arc<dyn NetworkProbe> {
    if let Some(pinned) = pinned {
        let identifier = (!pinned.is_empty()).then_some(pinned);
        debug!(network = ?identifier, "using pinned network identifier");
        return Arc::new(FixedNetworkProbe::new(identifier));
    }

    let cache = Arc::new(CachedNetworkProbe::new());
    match tokio::task::spawn_blocking(|| SystemNetworkProbe.current_network_identifier()).await {
        Ok(identifier) => cache.update(identifier),
        Err(e) => warn!(error = %e, "network probe task failed"),
    }
    cache
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn iwgetid_output() {
        assert_eq!(parse_iwgetid("HomeWifi\n").as_deref(), Some("HomeWifi"));
        assert_eq!(parse_iwgetid("\n"), None);
    }

    #[test]
    fn networksetup_output() {
        assert_eq!(
            parse_networksetup("Current Wi-Fi Network: Home Wifi 5G\n").as_deref(),
            Some("Home Wifi 5G")
        );
        assert_eq!(
            parse_networksetup("You are not associated with an AirPort network.\n"),
            None
        );
    }

    #[tokio::test]
    async fn pinned_network_wins() {
        let probe = network_probe(Some("HomeWifi")).await;
        assert_eq!(probe.current_network_identifier().as_deref(), Some("HomeWifi"));

        let none = network_probe(Some("")).await;
        assert_eq!(none.current_network_identifier(), None);
    }
}
