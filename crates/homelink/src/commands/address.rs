//! Set or clear endpoint addresses.

use homelink_core::{Endpoint, SharedConnection};

use crate::cli::{AddressArgs, AddressCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

pub fn handle(conn: &SharedConnection, args: AddressArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (endpoint, address) = match args.command {
        AddressCommand::Set { endpoint, url } => {
            (Endpoint::from(endpoint), Some(util::parse_url("url", &url)?))
        }
        AddressCommand::Clear { endpoint } => (Endpoint::from(endpoint), None),
    };

    let verb = if address.is_some() { "set" } else { "cleared" };
    conn.set_address(endpoint, address);

    output::print_notice(
        &format!(
            "✓ {} {verb}. Active: {}",
            endpoint.label(),
            util::describe_active(conn)
        ),
        global.quiet,
    );
    Ok(())
}
