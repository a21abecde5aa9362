//! jetload CLI - Command-line interface
//!
//! Loads profiles into DCS cockpits over DCS-BIOS, optionally triggered by a
//! cockpit button seen on the export stream.

mod commands;
mod error;
mod logging;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use jetload::config::{config_file_path, ConfigFile};

use commands::config::ConfigCommands;
use commands::coords::CoordsArgs;
use commands::enter::EnterArgs;
use commands::listen::ListenArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "jetload", version = jetload::VERSION, about, long_about = None)]
struct Cli {
    /// Log at debug level (overrides RUST_LOG and logging.level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file to use instead of ~/.jetload/config.ini
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Enter a profile into the cockpit now
    Enter(EnterArgs),

    /// Watch the export stream and enter a profile when the cockpit asks
    Listen(ListenArgs),

    /// Show how a position is keyed in for a vehicle
    Coords(CoordsArgs),

    /// View or change configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.unwrap_or_else(config_file_path);

    match cli.command {
        Commands::Config(command) => commands::config::run(command, &config_path),
        Commands::Coords(args) => commands::coords::run(args),
        Commands::Enter(args) => {
            let config = ConfigFile::load_from(&config_path)?;
            let _logging = start_logging(&config, cli.verbose)?;
            commands::enter::run(args, &config)
        }
        Commands::Listen(args) => {
            let config = ConfigFile::load_from(&config_path)?;
            let _logging = start_logging(&config, cli.verbose)?;
            commands::listen::run(args, &config)
        }
    }
}

fn start_logging(config: &ConfigFile, verbose: bool) -> Result<logging::LoggingGuard, CliError> {
    let guard = logging::init_logging(&config.logging.directory, &config.logging.level, verbose)?;
    tracing::debug!(log_dir = %guard.log_dir().display(), "Logging initialized");
    Ok(guard)
}
