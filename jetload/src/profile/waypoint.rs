//! Waypoint records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coord::{CoordError, LatLon};

/// Waypoint type tag.
///
/// Variants are declared alphabetically; validated waypoints are stably
/// ordered by this tag before entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum WaypointType {
    /// Defended point
    Dp,
    /// Fixed point
    Fp,
    /// Home airfield
    Ha,
    /// Hostile area
    Hb,
    /// Initial point
    Ip,
    /// Pre-planned mission target (carries a station)
    Msn,
    /// Surface target
    St,
    /// Generic navigation waypoint
    #[default]
    Wp,
}

impl WaypointType {
    /// Short upper-case tag used in profile documents and logs.
    pub fn tag(&self) -> &'static str {
        match self {
            WaypointType::Dp => "DP",
            WaypointType::Fp => "FP",
            WaypointType::Ha => "HA",
            WaypointType::Hb => "HB",
            WaypointType::Ip => "IP",
            WaypointType::Msn => "MSN",
            WaypointType::St => "ST",
            WaypointType::Wp => "WP",
        }
    }
}

impl fmt::Display for WaypointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A single waypoint or mission waypoint.
///
/// Waypoint numbers are not stored; [`crate::profile::Profile`] derives them
/// from the document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    #[serde(rename = "wp_type", default)]
    pub kind: WaypointType,
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation in feet.
    #[serde(default)]
    pub elevation: i32,
    #[serde(default)]
    pub name: String,
    /// Sequence (route) id, 0 when the waypoint is in no sequence.
    #[serde(default)]
    pub sequence: u32,
    /// Weapon station, required for mission waypoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station: Option<u8>,
    #[serde(default, rename = "is_set_cur")]
    pub is_current: bool,
}

impl Waypoint {
    /// Create a waypoint of the given type at a position.
    pub fn new(kind: WaypointType, position: LatLon) -> Self {
        Self {
            kind,
            latitude: position.lat,
            longitude: position.lon,
            elevation: 0,
            name: String::new(),
            sequence: 0,
            station: None,
            is_current: false,
        }
    }

    /// Create a mission waypoint bound to a weapon station.
    pub fn mission(station: u8, position: LatLon) -> Self {
        Self {
            station: Some(station),
            ..Self::new(WaypointType::Msn, position)
        }
    }

    pub fn with_elevation(mut self, elevation: i32) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }

    /// Mark this waypoint as the one to select after entry.
    pub fn current(mut self) -> Self {
        self.is_current = true;
        self
    }

    /// Validated position.
    pub fn position(&self) -> Result<LatLon, CoordError> {
        LatLon::new(self.latitude, self.longitude)
    }

    pub fn is_mission(&self) -> bool {
        self.kind == WaypointType::Msn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn here() -> LatLon {
        LatLon::new(36.2, -115.0).unwrap()
    }

    #[test]
    fn test_type_ordering_is_alphabetical() {
        let mut kinds = vec![
            WaypointType::Wp,
            WaypointType::Msn,
            WaypointType::Dp,
            WaypointType::Ip,
        ];
        kinds.sort();
        assert_eq!(
            kinds,
            vec![
                WaypointType::Dp,
                WaypointType::Ip,
                WaypointType::Msn,
                WaypointType::Wp
            ]
        );
    }

    #[test]
    fn test_builder() {
        let wp = Waypoint::new(WaypointType::Wp, here())
            .with_elevation(1200)
            .with_name("NELLIS")
            .with_sequence(2)
            .current();
        assert_eq!(wp.elevation, 1200);
        assert_eq!(wp.name, "NELLIS");
        assert_eq!(wp.sequence, 2);
        assert!(wp.is_current);
        assert!(!wp.is_mission());
    }

    #[test]
    fn test_mission_has_station() {
        let msn = Waypoint::mission(8, here());
        assert_eq!(msn.kind, WaypointType::Msn);
        assert_eq!(msn.station, Some(8));
    }

    #[test]
    fn test_json_field_names() {
        let json = r#"{"wp_type":"FP","latitude":1.5,"longitude":2.5,"is_set_cur":true}"#;
        let wp: Waypoint = serde_json::from_str(json).unwrap();
        assert_eq!(wp.kind, WaypointType::Fp);
        assert_eq!(wp.elevation, 0);
        assert!(wp.is_current);
        assert!(wp.name.is_empty());
    }
}
