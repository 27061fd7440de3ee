//! Command dispatch: bridges CLI args -> core dashboard -> output formatting.

pub mod config_cmd;
pub mod scan;
pub mod status;
pub mod util;
pub mod watch;

use emsbus_core::DashboardConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a gateway-bound command to its handler.
pub async fn dispatch(
    cmd: Command,
    config: &DashboardConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(config, global).await,
        Command::Watch => watch::handle(config, global).await,
        Command::Scan => scan::handle(config, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal {
            message: "command does not talk to a gateway".into(),
        }),
    }
}
