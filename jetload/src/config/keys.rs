//! Addressable configuration keys for `config get/set/list`.

use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::file::{ConfigError, ConfigFile};
use crate::vehicle::VehicleKind;

/// Every `section.key` the configuration file understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    TransportHost,
    TransportPort,
    TransportShortDelay,
    TransportMediumDelay,
    ExportHost,
    ExportPort,
    ExportRecvTimeout,
    ExportIdleInterval,
    ExportEnabled,
    ViperDgftCycleControl,
    GeneralVehicle,
    LoggingDirectory,
    LoggingLevel,
}

const ALL_KEYS: [ConfigKey; 13] = [
    ConfigKey::TransportHost,
    ConfigKey::TransportPort,
    ConfigKey::TransportShortDelay,
    ConfigKey::TransportMediumDelay,
    ConfigKey::ExportHost,
    ConfigKey::ExportPort,
    ConfigKey::ExportRecvTimeout,
    ConfigKey::ExportIdleInterval,
    ConfigKey::ExportEnabled,
    ConfigKey::ViperDgftCycleControl,
    ConfigKey::GeneralVehicle,
    ConfigKey::LoggingDirectory,
    ConfigKey::LoggingLevel,
];

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

impl ConfigKey {
    /// All keys, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::TransportHost
            | ConfigKey::TransportPort
            | ConfigKey::TransportShortDelay
            | ConfigKey::TransportMediumDelay => "transport",
            ConfigKey::ExportHost
            | ConfigKey::ExportPort
            | ConfigKey::ExportRecvTimeout
            | ConfigKey::ExportIdleInterval
            | ConfigKey::ExportEnabled => "export",
            ConfigKey::ViperDgftCycleControl => "viper",
            ConfigKey::GeneralVehicle => "general",
            ConfigKey::LoggingDirectory | ConfigKey::LoggingLevel => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::TransportHost | ConfigKey::ExportHost => "host",
            ConfigKey::TransportPort | ConfigKey::ExportPort => "port",
            ConfigKey::TransportShortDelay => "short_delay",
            ConfigKey::TransportMediumDelay => "medium_delay",
            ConfigKey::ExportRecvTimeout => "recv_timeout",
            ConfigKey::ExportIdleInterval => "idle_interval",
            ConfigKey::ExportEnabled => "enabled",
            ConfigKey::ViperDgftCycleControl => "dgft_cycle_control",
            ConfigKey::GeneralVehicle => "vehicle",
            ConfigKey::LoggingDirectory => "directory",
            ConfigKey::LoggingLevel => "level",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as written to the file.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::TransportHost => config.transport.host.clone(),
            ConfigKey::TransportPort => config.transport.port.to_string(),
            ConfigKey::TransportShortDelay => seconds(config.transport.short_delay),
            ConfigKey::TransportMediumDelay => seconds(config.transport.medium_delay),
            ConfigKey::ExportHost => config.export.host.to_string(),
            ConfigKey::ExportPort => config.export.port.to_string(),
            ConfigKey::ExportRecvTimeout => seconds(config.export.recv_timeout),
            ConfigKey::ExportIdleInterval => seconds(config.export.idle_interval),
            ConfigKey::ExportEnabled => config.export.enabled.to_string(),
            ConfigKey::ViperDgftCycleControl => config.viper.dgft_cycle_control.clone(),
            ConfigKey::GeneralVehicle => config.general.vehicle.to_string(),
            ConfigKey::LoggingDirectory => config.logging.directory.display().to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
        }
    }

    /// Validate `value` and store it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] if the value does not parse or is out of
    /// range; `config` is unchanged in that case.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::TransportHost => {
                config.transport.host = self.non_empty(value)?.to_string();
            }
            ConfigKey::TransportPort => config.transport.port = self.port(value)?,
            ConfigKey::TransportShortDelay => config.transport.short_delay = self.delay(value)?,
            ConfigKey::TransportMediumDelay => {
                config.transport.medium_delay = self.delay(value)?;
            }
            ConfigKey::ExportHost => {
                config.export.host = value
                    .parse::<IpAddr>()
                    .map_err(|_| self.invalid(value, "expected an IP address"))?;
            }
            ConfigKey::ExportPort => config.export.port = self.port(value)?,
            ConfigKey::ExportRecvTimeout => config.export.recv_timeout = self.delay(value)?,
            ConfigKey::ExportIdleInterval => config.export.idle_interval = self.delay(value)?,
            ConfigKey::ExportEnabled => config.export.enabled = self.flag(value)?,
            ConfigKey::ViperDgftCycleControl => {
                config.viper.dgft_cycle_control = self.non_empty(value)?.to_string();
            }
            ConfigKey::GeneralVehicle => {
                config.general.vehicle = VehicleKind::from_str(value)
                    .map_err(|e| self.invalid(value, &e.to_string()))?;
            }
            ConfigKey::LoggingDirectory => {
                config.logging.directory = expand_home(self.non_empty(value)?);
            }
            ConfigKey::LoggingLevel => {
                let level = value.to_ascii_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(self.invalid(value, "expected error, warn, info, debug or trace"));
                }
                config.logging.level = level;
            }
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn non_empty<'v>(&self, value: &'v str) -> Result<&'v str, ConfigError> {
        if value.is_empty() {
            Err(self.invalid(value, "must not be empty"))
        } else {
            Ok(value)
        }
    }

    fn port(&self, value: &str) -> Result<u16, ConfigError> {
        match value.parse::<u16>() {
            Ok(port) if port > 0 => Ok(port),
            _ => Err(self.invalid(value, "expected a port number 1..=65535")),
        }
    }

    /// Seconds, possibly fractional, strictly positive.
    fn delay(&self, value: &str) -> Result<Duration, ConfigError> {
        match value.parse::<f64>() {
            Ok(secs) if secs.is_finite() && secs > 0.0 => Ok(Duration::from_secs_f64(secs)),
            _ => Err(self.invalid(value, "expected a positive number of seconds")),
        }
    }

    fn flag(&self, value: &str) -> Result<bool, ConfigError> {
        match value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(self.invalid(value, "expected true or false")),
        }
    }
}

fn seconds(duration: Duration) -> String {
    duration.as_secs_f64().to_string()
}

fn expand_home(value: &str) -> PathBuf {
    match (value.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(value),
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ALL_KEYS
            .into_iter()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_are_unique() {
        let mut names: Vec<String> = ConfigKey::all().iter().map(ConfigKey::name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ConfigKey::all().len());
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(
            "transport.short_delay".parse::<ConfigKey>().unwrap(),
            ConfigKey::TransportShortDelay
        );
        assert_eq!(
            "Viper.DGFT_CYCLE_CONTROL".parse::<ConfigKey>().unwrap(),
            ConfigKey::ViperDgftCycleControl
        );
        assert!(matches!(
            "transport.nope".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_get_defaults() {
        let config = ConfigFile::default();
        assert_eq!(ConfigKey::TransportShortDelay.get(&config), "0.15");
        assert_eq!(ConfigKey::TransportMediumDelay.get(&config), "0.4");
        assert_eq!(ConfigKey::ExportRecvTimeout.get(&config), "2");
        assert_eq!(ConfigKey::ExportEnabled.get(&config), "true");
        assert_eq!(ConfigKey::GeneralVehicle.get(&config), "viper");
        assert_eq!(ConfigKey::ViperDgftCycleControl.get(&config), "DGFT_CYCLE");
    }

    #[test]
    fn test_set_validates() {
        let mut config = ConfigFile::default();

        ConfigKey::TransportMediumDelay.set(&mut config, "0.5").unwrap();
        assert_eq!(config.transport.medium_delay, Duration::from_millis(500));

        assert!(ConfigKey::TransportShortDelay.set(&mut config, "-1").is_err());
        assert!(ConfigKey::TransportShortDelay.set(&mut config, "fast").is_err());
        assert_eq!(config.transport.short_delay, Duration::from_millis(150));

        assert!(ConfigKey::ExportPort.set(&mut config, "0").is_err());
        assert!(ConfigKey::ExportHost.set(&mut config, "localhost").is_err());
        ConfigKey::ExportHost.set(&mut config, "0.0.0.0").unwrap();

        ConfigKey::GeneralVehicle.set(&mut config, "Hornet").unwrap();
        assert_eq!(config.general.vehicle, VehicleKind::Hornet);

        ConfigKey::LoggingLevel.set(&mut config, "DEBUG").unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(ConfigKey::LoggingLevel.set(&mut config, "loud").is_err());

        ConfigKey::ExportEnabled.set(&mut config, "off").unwrap();
        assert!(!config.export.enabled);
    }
}
