//! Configuration file model, load and save.

use std::fs;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;
use tracing::{debug, info};

use super::keys::ConfigKey;
use super::{config_file_path, default_log_directory};
use crate::export::{ExportListenerConfig, DEFAULT_EXPORT_PORT};
use crate::sequencer::{DriverOptions, DEFAULT_DGFT_CYCLE_CONTROL};
use crate::transport::{
    ActuationTiming, DEFAULT_ACTUATION_PORT, DEFAULT_MEDIUM_DELAY, DEFAULT_SHORT_DELAY,
};
use crate::vehicle::VehicleKind;

/// Errors reading, validating or writing the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// `[transport]`: where actuations go and how long they settle.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportSettings {
    pub host: String,
    pub port: u16,
    pub short_delay: Duration,
    pub medium_delay: Duration,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_ACTUATION_PORT,
            short_delay: DEFAULT_SHORT_DELAY,
            medium_delay: DEFAULT_MEDIUM_DELAY,
        }
    }
}

/// `[export]`: the export stream listener.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    pub host: IpAddr,
    pub port: u16,
    pub recv_timeout: Duration,
    pub idle_interval: Duration,
    pub enabled: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        let listener = ExportListenerConfig::default();
        Self {
            host: listener.bind.ip(),
            port: DEFAULT_EXPORT_PORT,
            recv_timeout: listener.recv_timeout,
            idle_interval: listener.idle_interval,
            enabled: true,
        }
    }
}

/// `[viper]`: vehicle specific controls.
#[derive(Debug, Clone, PartialEq)]
pub struct ViperSettings {
    pub dgft_cycle_control: String,
}

impl Default for ViperSettings {
    fn default() -> Self {
        Self {
            dgft_cycle_control: DEFAULT_DGFT_CYCLE_CONTROL.to_string(),
        }
    }
}

/// `[general]`
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralSettings {
    /// Vehicle assumed for profiles that do not name one.
    pub vehicle: VehicleKind,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            vehicle: VehicleKind::Viper,
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            level: "info".to_string(),
        }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub transport: TransportSettings,
    pub export: ExportSettings,
    pub viper: ViperSettings,
    pub general: GeneralSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load from the default location; a missing file gives the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`; a missing file gives the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(source) => ConfigError::Read {
                path: path.to_path_buf(),
                source,
            },
            ini::Error::Parse(e) => ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        })?;

        let mut config = Self::default();
        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, value)?;
            }
        }
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Write every key to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini.write_to_file(path).map_err(write_error)?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Actuation delays.
    pub fn timing(&self) -> ActuationTiming {
        ActuationTiming::new(self.transport.short_delay, self.transport.medium_delay)
    }

    /// Export listener settings.
    pub fn export_listener(&self) -> ExportListenerConfig {
        ExportListenerConfig::default()
            .with_bind(SocketAddr::new(self.export.host, self.export.port))
            .with_recv_timeout(self.export.recv_timeout)
            .with_idle_interval(self.export.idle_interval)
    }

    /// Options handed to the sequencing driver.
    pub fn driver_options(&self) -> DriverOptions {
        DriverOptions {
            dgft_cycle_control: self.viper.dgft_cycle_control.clone(),
        }
    }
}
