//! Trusted network management.

use serde::Serialize;
use tabled::Tabled;

use homelink_core::SharedConnection;

use crate::cli::{GlobalOpts, NetworksArgs, NetworksCommand};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct NetworkView {
    name: String,
    current: bool,
}

#[derive(Tabled)]
struct NetworkRow {
    #[tabled(rename = "")]
    marker: String,
    #[tabled(rename = "Network")]
    name: String,
}

pub fn handle(conn: &SharedConnection, args: NetworksArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        NetworksCommand::List => {
            let networks: Vec<NetworkView> = conn.with(|info| {
                let current = info.ports().probe.current_network_identifier();
                info.trusted_networks()
                    .into_iter()
                    .flatten()
                    .map(|name| NetworkView {
                        current: current.as_deref() == Some(name.as_str()),
                        name: name.clone(),
                    })
                    .collect()
            });

            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &networks,
                |n| NetworkRow {
                    marker: output::active_marker(n.current, color),
                    name: n.name.clone(),
                },
                |n| n.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NetworksCommand::Add { name } => {
            if name.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "network".into(),
                    reason: "network name cannot be empty".into(),
                });
            }
            let added = conn.with(|info| {
                let mut networks = info.trusted_networks().cloned().unwrap_or_default();
                let added = networks.insert(name.clone());
                info.set_trusted_networks(Some(networks));
                added
            });
            let message = if added {
                format!("✓ Trusting '{name}'")
            } else {
                format!("'{name}' is already trusted")
            };
            output::print_notice(&message, global.quiet);
            Ok(())
        }

        NetworksCommand::Remove { name } => {
            let removed = conn.with(|info| {
                let mut networks = info.trusted_networks().cloned().unwrap_or_default();
                if !networks.remove(&name) {
                    return false;
                }
                // No trusted networks at all is stored as unset.
                info.set_trusted_networks((!networks.is_empty()).then_some(networks));
                true
            });
            if !removed {
                return Err(CliError::Validation {
                    field: "network".into(),
                    reason: format!("'{name}' is not a trusted network"),
                });
            }
            output::print_notice(&format!("✓ No longer trusting '{name}'"), global.quiet);
            Ok(())
        }
    }
}
