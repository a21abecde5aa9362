//! User configuration.
//!
//! Settings live in an INI file, by default `~/.jetload/config.ini`:
//!
//! ```ini
//! [transport]
//! host = 127.0.0.1
//! port = 7778
//! short_delay = 0.15
//! medium_delay = 0.4
//!
//! [export]
//! host = 127.0.0.1
//! port = 7777
//! recv_timeout = 2
//! idle_interval = 5
//! enabled = true
//!
//! [viper]
//! dgft_cycle_control = DGFT_CYCLE
//!
//! [general]
//! vehicle = viper
//!
//! [logging]
//! directory = ~/.jetload/logs
//! level = info
//! ```
//!
//! A missing file means all defaults. Missing keys keep their defaults;
//! present keys are validated the same way `config set` validates them.

mod file;
mod keys;

pub use file::{
    ConfigError, ConfigFile, ExportSettings, GeneralSettings, LoggingSettings,
    TransportSettings, ViperSettings,
};
pub use keys::ConfigKey;

use std::path::PathBuf;

/// Directory name under the home directory.
const CONFIG_DIR_NAME: &str = ".jetload";

/// Directory holding the configuration file and default log directory.
///
/// Falls back to the working directory when no home directory is known.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Default location of the configuration file.
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

/// Default log directory.
pub fn default_log_directory() -> PathBuf {
    config_directory().join("logs")
}
