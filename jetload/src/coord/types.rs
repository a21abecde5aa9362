//! Coordinate types and constants.

use std::fmt;

use thiserror::Error;

/// Minimum latitude in degrees.
pub const MIN_LAT: f64 = -90.0;

/// Maximum latitude in degrees.
pub const MAX_LAT: f64 = 90.0;

/// Minimum longitude in degrees.
pub const MIN_LON: f64 = -180.0;

/// Maximum longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Errors from coordinate validation, rendering and parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Latitude outside [-90, 90].
    #[error("invalid latitude: {0}")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180].
    #[error("invalid longitude: {0}")]
    InvalidLongitude(f64),

    /// Text could not be parsed with the requested format.
    #[error("malformed coordinate '{text}': {reason}")]
    Malformed { text: String, reason: &'static str },
}

/// Which half of a position a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

/// Hemisphere of a coordinate value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    /// Hemisphere for a signed value on the given axis (zero is north/east).
    pub fn of(value: f64, axis: Axis) -> Self {
        match (axis, value >= 0.0) {
            (Axis::Latitude, true) => Hemisphere::North,
            (Axis::Latitude, false) => Hemisphere::South,
            (Axis::Longitude, true) => Hemisphere::East,
            (Axis::Longitude, false) => Hemisphere::West,
        }
    }

    /// Sign applied to a magnitude in this hemisphere.
    pub fn sign(&self) -> f64 {
        match self {
            Hemisphere::North | Hemisphere::East => 1.0,
            Hemisphere::South | Hemisphere::West => -1.0,
        }
    }

    /// True for north and east.
    pub fn is_positive(&self) -> bool {
        matches!(self, Hemisphere::North | Hemisphere::East)
    }

    /// Single letter used by keypads that take a hemisphere key.
    pub fn letter(&self) -> char {
        match self {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
            Hemisphere::East => 'E',
            Hemisphere::West => 'W',
        }
    }
}

/// A validated geographic position in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    /// Create a position, rejecting out-of-range values.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordError> {
        if !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(CoordError::InvalidLatitude(lat));
        }
        if !(MIN_LON..=MAX_LON).contains(&lon) {
            return Err(CoordError::InvalidLongitude(lon));
        }
        Ok(Self { lat, lon })
    }

    pub fn lat_hemisphere(&self) -> Hemisphere {
        Hemisphere::of(self.lat, Axis::Latitude)
    }

    pub fn lon_hemisphere(&self) -> Hemisphere {
        Hemisphere::of(self.lon, Axis::Longitude)
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:.6} {}{:.6}",
            self.lat_hemisphere().letter(),
            self.lat.abs(),
            self.lon_hemisphere().letter(),
            self.lon.abs()
        )
    }
}

/// How seconds are rendered in degrees/minutes/seconds mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondsFormat {
    /// Two integer digits plus two decimal digits when the fraction is non-zero.
    Hundredths,
    /// Only the tens digit of the whole seconds.
    TensDigit,
}

/// Rendering style of a coordinate grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordStyle {
    /// Degrees, minutes, seconds.
    Dms(SecondsFormat),
    /// Degrees and decimal minutes with a fixed number of decimals.
    Ddm { decimals: u8 },
}

/// A vehicle-specific fixed-width coordinate grammar.
///
/// Latitude degrees are never padded; longitude degrees are padded to
/// `easting_pad` digits. Minutes are padded to `minutes_pad` digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordFormat {
    pub style: CoordStyle,
    pub easting_pad: usize,
    pub minutes_pad: usize,
}

impl CoordFormat {
    /// Degrees/minutes/seconds with hundredths of a second.
    pub const fn dms(easting_pad: usize) -> Self {
        Self {
            style: CoordStyle::Dms(SecondsFormat::Hundredths),
            easting_pad,
            minutes_pad: 2,
        }
    }

    /// Degrees/minutes/seconds keeping only the tens digit of the seconds.
    pub const fn dms_tens(easting_pad: usize) -> Self {
        Self {
            style: CoordStyle::Dms(SecondsFormat::TensDigit),
            easting_pad,
            minutes_pad: 2,
        }
    }

    /// Degrees and decimal minutes.
    pub const fn ddm(decimals: u8, easting_pad: usize) -> Self {
        Self {
            style: CoordStyle::Ddm { decimals },
            easting_pad,
            minutes_pad: 2,
        }
    }
}
