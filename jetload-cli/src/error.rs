//! CLI error type.

use std::fmt;
use std::io;

use jetload::config::ConfigError;
use jetload::coord::CoordError;
use jetload::export::ExportError;
use jetload::profile::ProfileError;
use jetload::sequencer::SequencerError;

/// Errors that end a CLI command with a non-zero exit code.
#[derive(Debug)]
pub enum CliError {
    /// Invalid configuration or command line combination.
    Config(String),

    /// Configuration file could not be read, validated or written.
    ConfigFile(ConfigError),

    /// Profile document could not be loaded.
    Profile(ProfileError),

    /// Coordinates given on the command line are out of range.
    Coordinates(CoordError),

    /// Actuation socket could not be opened.
    Transport(io::Error),

    /// Export listener failed.
    Export(ExportError),

    /// A sequence could not be started.
    Sequencer(SequencerError),

    /// A sequence ended without completing.
    Run(String),

    /// Logging could not be initialized.
    Logging(String),

    /// Failed to create the Tokio runtime.
    Runtime(io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "Configuration error: {}", e),
            CliError::Profile(e) => write!(f, "Failed to load profile: {}", e),
            CliError::Coordinates(e) => write!(f, "Invalid coordinates: {}", e),
            CliError::Transport(e) => write!(f, "Failed to open actuation socket: {}", e),
            CliError::Export(e) => write!(f, "Export listener failed: {}", e),
            CliError::Sequencer(e) => write!(f, "Failed to start sequence: {}", e),
            CliError::Run(msg) => write!(f, "Sequence did not complete: {}", msg),
            CliError::Logging(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Runtime(e) => write!(f, "Failed to create Tokio runtime: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Profile(e) => Some(e),
            CliError::Coordinates(e) => Some(e),
            CliError::Transport(e) => Some(e),
            CliError::Export(e) => Some(e),
            CliError::Sequencer(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Config(_) | CliError::Run(_) | CliError::Logging(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<ProfileError> for CliError {
    fn from(e: ProfileError) -> Self {
        CliError::Profile(e)
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::Coordinates(e)
    }
}

impl From<ExportError> for CliError {
    fn from(e: ExportError) -> Self {
        CliError::Export(e)
    }
}

impl From<SequencerError> for CliError {
    fn from(e: SequencerError) -> Self {
        CliError::Sequencer(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_cli_error_display() {
        let err = CliError::Config("export listener disabled".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("export listener disabled"));
    }

    #[test]
    fn test_cli_error_from_sequencer_error() {
        let err: CliError = SequencerError::AlreadyRunning.into();
        assert!(matches!(err, CliError::Sequencer(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_cli_error_from_coord_error() {
        let err: CliError = CoordError::InvalidLatitude(91.0).into();
        assert!(err.to_string().contains("91"));
    }
}
