//! Config subcommand handlers.

use std::collections::BTreeSet;

use dialoguer::{Confirm, Input};
use url::Url;

use homelink_core::{ConnectionInfo, ConnectionSetup, Ports};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;
use crate::probe;

use super::util;

// ── Helpers ─────────────────────────────────────────────────────────

const MASK: &str = "****";

/// Copy of the config with webhook secrets masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.connection.webhook_secret.is_some() {
            profile.connection.webhook_secret = Some(MASK.into());
        }
    }
    cfg
}

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);

    for (name, p) in &cfg.profiles {
        let c = &p.connection;
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let urls = [
            ("internal_url", &c.internal_url),
            ("external_url", &c.external_url),
            ("remote_relay_url", &c.remote_relay_url),
            ("cloudhook_url", &c.cloudhook_url),
        ];
        for (key, url) in urls {
            if let Some(url) = url {
                let _ = writeln!(out, "{key} = \"{url}\"");
            }
        }
        let _ = writeln!(out, "webhook_id = \"{}\"", c.webhook_id);
        if c.webhook_secret.is_some() {
            let _ = writeln!(out, "webhook_secret = \"{MASK}\"");
        }
        if let Some(ref networks) = c.trusted_networks {
            let quoted: Vec<_> = networks.iter().map(|n| format!("\"{n}\"")).collect();
            let _ = writeln!(out, "trusted_networks = [{}]", quoted.join(", "));
        }
        let _ = writeln!(out, "use_cloud_relay = {}", c.use_cloud_relay);
        let _ = writeln!(out, "active_endpoint = \"{}\"", c.active_endpoint);
    }

    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Prompt for an optional URL; empty input means "not configured".
fn prompt_url(prompt: &str, field: &str) -> Result<Option<Url>, CliError> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    util::parse_url(field, value).map(Some)
}

/// Split a comma-separated list of network names.
fn parse_networks(input: &str) -> Option<BTreeSet<String>> {
    let networks: BTreeSet<String> = input
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_owned)
        .collect();
    (!networks.is_empty()).then_some(networks)
}

/// Webhook registration to keep when re-running the wizard over a profile.
///
/// A new profile gets a fresh webhook id and nothing else.
fn carried_registration(existing: Option<&Profile>) -> ConnectionSetup {
    match existing {
        Some(profile) => {
            let c = &profile.connection;
            ConnectionSetup {
                webhook_id: c.webhook_id.clone(),
                webhook_secret: c.webhook_secret.clone(),
                cloudhook_url: c.cloudhook_url.clone(),
                ..ConnectionSetup::default()
            }
        }
        None => ConnectionSetup {
            webhook_id: uuid::Uuid::new_v4().simple().to_string(),
            ..ConnectionSetup::default()
        },
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_file(global);

    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            eprintln!("homelink configuration wizard");
            eprintln!("   Config path: {}\n", path.display());

            let mut cfg = config::load_config_file(&path)?;

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default(config::active_profile_name(global, &cfg))
                .interact_text()
                .map_err(prompt_err)?;
            homelink_config::validate_profile_name(&profile_name)?;

            let internal_url = prompt_url("Internal URL (blank to skip)", "internal_url")?;
            let external_url = prompt_url("External URL (blank to skip)", "external_url")?;
            let remote_relay_url =
                prompt_url("Remote relay URL (blank to skip)", "remote_relay_url")?;

            let network_probe = probe::network_probe(global.network.as_deref()).await;
            let trusted_networks = if internal_url.is_some() {
                let current = network_probe
                    .current_network_identifier()
                    .unwrap_or_default();
                let input: String = Input::new()
                    .with_prompt("Trusted networks (comma-separated)")
                    .default(current)
                    .allow_empty(true)
                    .interact_text()
                    .map_err(prompt_err)?;
                parse_networks(&input)
            } else {
                None
            };

            let use_cloud_relay = remote_relay_url.is_some()
                && Confirm::new()
                    .with_prompt("Prefer the cloud relay when away from home?")
                    .default(true)
                    .interact()
                    .map_err(prompt_err)?;

            let registration = carried_registration(cfg.profiles.get(&profile_name));

            // Construction picks the initial active endpoint for the current network.
            let info = ConnectionInfo::new(
                ConnectionSetup {
                    internal_url,
                    external_url,
                    remote_relay_url,
                    trusted_networks,
                    use_cloud_relay,
                    ..registration
                },
                Ports::default().with_probe(network_probe),
            );
            let record = info.into_record();
            let active = record.active_endpoint;

            cfg.upsert_profile(&profile_name, Profile::from(record))?;
            cfg.set_default_profile(&profile_name)?;
            config::save_config(&path, &cfg)?;

            eprintln!("\n✓ Configuration written to {}", path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("  Active endpoint: {}", active.label());
            eprintln!("\n  Test it: homelink ping");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config(&path)?);
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                path.display().to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_file(&path)?;
            if !cfg.profiles.contains_key(&name) {
                return Err(config::profile_not_found(&cfg, &name));
            }
            cfg.set_default_profile(&name)?;
            config::save_config(&path, &cfg)?;
            output::print_notice(&format!("✓ Default profile set to '{name}'"), global.quiet);
            Ok(())
        }
    }
}
