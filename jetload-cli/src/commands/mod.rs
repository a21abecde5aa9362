//! Subcommand implementations.

pub mod config;
pub mod coords;
pub mod enter;
pub mod listen;

use tokio::runtime::Runtime;

use crate::error::CliError;

/// Multi-threaded runtime for commands that talk to the simulation.
///
/// Created after logging so the local time offset is read while the process
/// is still single-threaded.
pub fn runtime() -> Result<Runtime, CliError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("jetload-worker")
        .build()
        .map_err(CliError::Runtime)
}
