//! Vehicle catalog.
//!
//! Every airframe jetload can load is a variant of [`VehicleKind`]. The
//! lower-case internal names are the ones stored in profile documents and
//! accepted on the command line.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Airframes with a sequencing driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    /// F/A-18C Hornet
    Hornet,
    /// AV-8B Harrier
    Harrier,
    /// M-2000C Mirage
    Mirage,
    /// F-14A/B Tomcat
    Tomcat,
    /// A-10C Warthog
    Warthog,
    /// F-16C Viper
    #[default]
    Viper,
}

/// Error returned when parsing an unknown vehicle name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown vehicle type '{0}' (expected one of hornet, harrier, mirage, tomcat, warthog, viper)")]
pub struct UnknownVehicle(pub String);

impl VehicleKind {
    /// All supported vehicles, in catalog order.
    pub const ALL: [VehicleKind; 6] = [
        VehicleKind::Warthog,
        VehicleKind::Harrier,
        VehicleKind::Tomcat,
        VehicleKind::Viper,
        VehicleKind::Hornet,
        VehicleKind::Mirage,
    ];

    /// Internal (profile document) name.
    pub fn name(&self) -> &'static str {
        match self {
            VehicleKind::Hornet => "hornet",
            VehicleKind::Harrier => "harrier",
            VehicleKind::Mirage => "mirage",
            VehicleKind::Tomcat => "tomcat",
            VehicleKind::Warthog => "warthog",
            VehicleKind::Viper => "viper",
        }
    }

    /// Human readable airframe name.
    pub fn display_name(&self) -> &'static str {
        match self {
            VehicleKind::Hornet => "F/A-18C Hornet",
            VehicleKind::Harrier => "AV-8B Harrier",
            VehicleKind::Mirage => "M-2000C Mirage",
            VehicleKind::Tomcat => "F-14A/B Tomcat",
            VehicleKind::Warthog => "A-10C Warthog",
            VehicleKind::Viper => "F-16C Viper",
        }
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VehicleKind {
    type Err = UnknownVehicle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        VehicleKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| UnknownVehicle(s.to_string()))
    }
}
