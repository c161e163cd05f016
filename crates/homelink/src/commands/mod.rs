//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod active;
pub mod adapt;
pub mod address;
pub mod cloud;
pub mod config_cmd;
pub mod networks;
pub mod ping;
pub mod status;
pub mod url;
pub mod util;
pub mod webhook;

use crate::cli::{Command, GlobalOpts};
use crate::config::Session;
use crate::error::CliError;

/// Dispatch a profile-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let conn = &session.connection;
    match cmd {
        Command::Status => status::handle(session, global),
        Command::Url(args) => url::handle(conn, &args, global),
        Command::Webhook(args) => webhook::handle(conn, args, global),
        Command::Address(args) => address::handle(conn, args, global),
        Command::Cloud(args) => cloud::handle(conn, &args, global),
        Command::Networks(args) => networks::handle(conn, args, global),
        Command::Active(args) => active::handle(conn, &args, global),
        Command::Adapt(args) => adapt::handle(conn, &args, global),
        Command::Ping(args) => ping::handle(conn, &args, global).await,
        // Config and Completions are handled before a session is opened
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
