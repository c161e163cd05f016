//! Cloud relay preference.

use homelink_core::SharedConnection;

use crate::cli::{CloudArgs, GlobalOpts, Toggle};
use crate::error::CliError;
use crate::output;

use super::util;

pub fn handle(conn: &SharedConnection, args: &CloudArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let enabled = matches!(args.state, Toggle::On);
    conn.set_use_cloud_relay(enabled);

    output::print_notice(
        &format!(
            "✓ Cloud relay {}. Active: {}",
            if enabled { "preferred" } else { "off" },
            util::describe_active(conn)
        ),
        global.quiet,
    );
    Ok(())
}
