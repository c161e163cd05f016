//! Show how a request URL is rewritten onto the active endpoint.

use serde::Serialize;

use homelink_core::{Endpoint, SharedConnection, Surface};

use crate::cli::{AdaptArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct AdaptView {
    from: String,
    from_endpoint: Option<Endpoint>,
    to: String,
    to_endpoint: Endpoint,
    changed: bool,
}

pub fn handle(conn: &SharedConnection, args: &AdaptArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let original = util::parse_url("url", &args.url)?;
    let (surface, method) = if args.webhook {
        (Surface::Webhook, reqwest::Method::POST)
    } else {
        (Surface::Api, reqwest::Method::GET)
    };

    let view = conn.with(|info| -> Result<AdaptView, CliError> {
        let from_endpoint = info.endpoint_for(&original);
        if !info.matches_known_endpoint(&original) {
            tracing::info!(url = %original, "URL does not belong to a configured endpoint");
        }

        let mut request = reqwest::Request::new(method, original.clone());
        let changed = info.adapt_request(&mut request, surface)?;
        Ok(AdaptView {
            from: original.to_string(),
            from_endpoint,
            to: request.url().to_string(),
            to_endpoint: info.active_endpoint(),
            changed,
        })
    })?;

    let out = output::render_single(&global.output, &view, |v| v.to.clone(), |v| v.to.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
