//! Print the active base URL.

use serde::Serialize;

use homelink_core::{Endpoint, SharedConnection};

use crate::cli::{GlobalOpts, UrlArgs};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct UrlView {
    endpoint: Endpoint,
    url: String,
}

pub fn handle(conn: &SharedConnection, args: &UrlArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let view = conn.with(|info| -> Result<UrlView, CliError> {
        let url = if args.api {
            info.active_api_url()?.to_string()
        } else {
            info.active_url()?.to_string()
        };
        Ok(UrlView {
            endpoint: info.active_endpoint(),
            url,
        })
    })?;

    let out = output::render_single(&global.output, &view, |v| v.url.clone(), |v| v.url.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
