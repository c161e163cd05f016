//! Webhook target and registration details.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use homelink_core::SharedConnection;

use crate::cli::{GlobalOpts, WebhookArgs, WebhookCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct WebhookView {
    webhook_id: String,
    url: String,
    via_cloudhook: bool,
    secret_configured: bool,
}

pub fn handle(conn: &SharedConnection, args: WebhookArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        WebhookCommand::Url => {
            let view = conn.with(|info| -> Result<WebhookView, CliError> {
                let url = info.webhook_url()?;
                let via_cloudhook = info.use_cloud_relay() && info.cloudhook_url().is_some();
                Ok(WebhookView {
                    webhook_id: info.webhook_id().to_owned(),
                    url: url.into(),
                    via_cloudhook,
                    secret_configured: info.webhook_secret().is_some(),
                })
            })?;
            let out =
                output::render_single(&global.output, &view, |v| v.url.clone(), |v| v.url.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        WebhookCommand::Set {
            id,
            secret,
            cloudhook,
            clear_cloudhook,
        } => {
            if id.as_deref().is_some_and(str::is_empty) {
                return Err(CliError::Validation {
                    field: "id".into(),
                    reason: "webhook id cannot be empty".into(),
                });
            }
            let cloudhook = cloudhook
                .as_deref()
                .map(|value| util::parse_url("cloudhook", value))
                .transpose()?;
            // An empty secret clears the stored one.
            let secret = secret.map(SecretString::from);

            conn.with(|info| {
                if let Some(id) = id {
                    info.set_webhook_id(id);
                }
                if let Some(secret) = secret {
                    let secret = secret.expose_secret();
                    info.set_webhook_secret((!secret.is_empty()).then(|| secret.to_owned()));
                }
                if clear_cloudhook {
                    info.set_cloudhook_url(None);
                } else if cloudhook.is_some() {
                    info.set_cloudhook_url(cloudhook);
                }
            });
            output::print_notice("✓ Webhook settings updated", global.quiet);
            Ok(())
        }
    }
}
