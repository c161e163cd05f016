//! Status: every endpoint, the active one, and the network we are on.

use std::fmt::Write;

use serde::Serialize;
use tabled::Tabled;

use homelink_core::{ConnectionInfo, CoreError, Endpoint};

use crate::cli::GlobalOpts;
use crate::config::Session;
use crate::error::CliError;
use crate::output;

// ── View model ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct StatusView {
    profile: String,
    active_endpoint: Endpoint,
    active_url: Option<String>,
    use_cloud_relay: bool,
    current_network: Option<String>,
    on_trusted_network: bool,
    webhook_url: Option<String>,
    endpoints: Vec<EndpointView>,
}

#[derive(Debug, Serialize)]
struct EndpointView {
    endpoint: Endpoint,
    label: &'static str,
    url: Option<String>,
    active: bool,
}

impl StatusView {
    /// Resolve the active endpoint first so the view reflects any correction.
    fn collect(profile: &str, info: &mut ConnectionInfo) -> Result<Self, CoreError> {
        let active_url = match info.active_url() {
            Ok(url) => Some(url.to_string()),
            Err(e) if e.is_no_endpoint() => None,
            Err(e) => return Err(e),
        };
        let active = info.active_endpoint();
        let resolved = active_url.is_some();

        let endpoints = Endpoint::ALL
            .into_iter()
            .map(|endpoint| EndpointView {
                endpoint,
                label: endpoint.label(),
                url: info.address(endpoint).map(|a| a.to_string()),
                active: resolved && endpoint == active,
            })
            .collect();

        Ok(Self {
            profile: profile.into(),
            active_endpoint: active,
            webhook_url: info.webhook_url().ok().map(String::from),
            active_url,
            use_cloud_relay: info.use_cloud_relay(),
            current_network: info.ports().probe.current_network_identifier(),
            on_trusted_network: info.is_on_trusted_network(),
            endpoints,
        })
    }
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EndpointRow {
    #[tabled(rename = "")]
    marker: String,
    #[tabled(rename = "Endpoint")]
    label: &'static str,
    #[tabled(rename = "URL")]
    url: String,
}

fn detail(view: &StatusView, color: bool) -> String {
    let rows: Vec<EndpointRow> = view
        .endpoints
        .iter()
        .map(|e| EndpointRow {
            marker: output::active_marker(e.active, color),
            label: e.label,
            url: e.url.clone().unwrap_or_else(|| output::unset(color)),
        })
        .collect();

    let mut out = String::new();
    let _ = writeln!(out, "Profile:      {}", view.profile);
    let network = match (&view.current_network, view.on_trusted_network) {
        (Some(name), true) => format!("{name} (trusted)"),
        (Some(name), false) => name.clone(),
        (None, _) => output::unset(color),
    };
    let _ = writeln!(out, "Network:      {network}");
    let _ = writeln!(
        out,
        "Cloud relay:  {}",
        if view.use_cloud_relay { "preferred" } else { "off" }
    );
    if let Some(ref webhook) = view.webhook_url {
        let _ = writeln!(out, "Webhook:      {webhook}");
    }
    if view.active_url.is_none() {
        let _ = writeln!(out, "Active:       no usable endpoint");
    }
    out.push_str(&output::render_table(&rows));
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let view = session
        .connection
        .with(|info| StatusView::collect(&session.profile, info))?;

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &view,
        |v| detail(v, color),
        |v| v.active_url.clone().unwrap_or_default(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
