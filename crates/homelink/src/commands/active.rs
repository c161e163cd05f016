//! Force the active endpoint.

use homelink_core::{Endpoint, SharedConnection};

use crate::cli::{ActiveArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

pub fn handle(conn: &SharedConnection, args: &ActiveArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let requested = Endpoint::from(args.endpoint);
    conn.set_active_endpoint(requested);

    // Resolving may move off an endpoint that cannot be used right now.
    let description = util::describe_active(conn);
    let resolved = conn.active_endpoint();
    if resolved != requested {
        tracing::warn!(%requested, %resolved, "requested endpoint is not usable");
        output::print_notice(
            &format!("! {} is not usable right now", requested.label()),
            global.quiet,
        );
    }
    output::print_notice(&format!("✓ Active: {description}"), global.quiet);
    Ok(())
}
