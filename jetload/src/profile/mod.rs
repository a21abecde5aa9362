//! Profile documents.
//!
//! A [`Profile`] is a read-only snapshot handed to the sequencer: a vehicle
//! type, an ordered list of waypoints (mission waypoints included) and an
//! optional avionics configuration.
//!
//! Waypoint numbers are never stored. They are derived from document order:
//!
//! ```text
//! waypoints:  WP  WP  FP  WP  MSN(8) MSN(2) MSN(8)
//! number:      1   2   1   3     1      1      2
//!              └─ per type ─┘    └ per station ┘
//! ```

mod avionics;
mod waypoint;

pub use avionics::{
    accept_or_keep, AvionicsConfiguration, CmdsConfig, CmdsParams, CmdsProgram, FieldError,
    JhmcsSetup, MasterMode, MfdConfig, MfdFormat, MfdSetup, TacanBand, TacanRole, TacanYardstick,
};
pub use waypoint::{Waypoint, WaypointType};

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::CoordError;
use crate::vehicle::VehicleKind;

/// Errors raised while building or loading a profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read profile: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid profile document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("waypoints {first} and {second} are both marked current")]
    MultipleCurrent { first: usize, second: usize },

    #[error("mission waypoint {index} has no station")]
    MissingStation { index: usize },

    #[error("waypoint {index}: {source}")]
    Position {
        index: usize,
        #[source]
        source: CoordError,
    },
}

/// A waypoint with its derived number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberedWaypoint<'a> {
    /// 1-based number within its type (or within its station for missions).
    pub number: u32,
    pub waypoint: &'a Waypoint,
}

/// On-disk shape; the vehicle may be omitted and filled from configuration.
#[derive(Deserialize)]
struct ProfileDocument {
    name: String,
    #[serde(default)]
    aircraft: Option<VehicleKind>,
    #[serde(default)]
    waypoints: Vec<Waypoint>,
    #[serde(default)]
    avionics: Option<AvionicsConfiguration>,
}

/// A validated profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    name: String,
    #[serde(rename = "aircraft")]
    vehicle: VehicleKind,
    waypoints: Vec<Waypoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avionics: Option<AvionicsConfiguration>,
}

impl Profile {
    /// Build a profile, checking positions, stations and the current flag.
    pub fn new(
        name: impl Into<String>,
        vehicle: VehicleKind,
        waypoints: Vec<Waypoint>,
    ) -> Result<Self, ProfileError> {
        let mut current: Option<usize> = None;
        for (index, wp) in waypoints.iter().enumerate() {
            wp.position()
                .map_err(|source| ProfileError::Position { index, source })?;
            if wp.is_mission() && wp.station.map_or(true, |s| s == 0) {
                return Err(ProfileError::MissingStation { index });
            }
            if wp.is_current {
                if let Some(first) = current {
                    return Err(ProfileError::MultipleCurrent {
                        first,
                        second: index,
                    });
                }
                current = Some(index);
            }
        }

        Ok(Self {
            name: name.into(),
            vehicle,
            waypoints,
            avionics: None,
        })
    }

    pub fn with_avionics(mut self, avionics: AvionicsConfiguration) -> Self {
        self.avionics = Some(avionics);
        self
    }

    /// Parse a JSON profile document.
    ///
    /// # Arguments
    ///
    /// * `text` - JSON document
    /// * `default_vehicle` - Vehicle used when the document names none
    pub fn from_json(text: &str, default_vehicle: VehicleKind) -> Result<Self, ProfileError> {
        let doc: ProfileDocument = serde_json::from_str(text)?;
        let profile = Self::new(
            doc.name,
            doc.aircraft.unwrap_or(default_vehicle),
            doc.waypoints,
        )?;
        Ok(match doc.avionics {
            Some(avionics) => profile.with_avionics(avionics),
            None => profile,
        })
    }

    /// Load a JSON profile from disk.
    pub fn load(path: &Path, default_vehicle: VehicleKind) -> Result<Self, ProfileError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text, default_vehicle)
    }

    pub fn to_json(&self) -> Result<String, ProfileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vehicle(&self) -> VehicleKind {
        self.vehicle
    }

    pub fn avionics(&self) -> Option<&AvionicsConfiguration> {
        self.avionics.as_ref()
    }

    /// All waypoints in document order, mission waypoints included.
    pub fn all(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Non-mission waypoints, numbered per type.
    pub fn waypoints(&self) -> Vec<NumberedWaypoint<'_>> {
        let mut counters: HashMap<WaypointType, u32> = HashMap::new();
        self.waypoints
            .iter()
            .filter(|wp| !wp.is_mission())
            .map(|wp| {
                let counter = counters.entry(wp.kind).or_insert(0);
                *counter += 1;
                NumberedWaypoint {
                    number: *counter,
                    waypoint: wp,
                }
            })
            .collect()
    }

    /// Mission waypoints in document order, numbered per station.
    pub fn missions(&self) -> Vec<NumberedWaypoint<'_>> {
        let mut counters: HashMap<u8, u32> = HashMap::new();
        self.waypoints
            .iter()
            .filter(|wp| wp.is_mission())
            .map(|wp| {
                let counter = counters.entry(wp.station.unwrap_or(0)).or_insert(0);
                *counter += 1;
                NumberedWaypoint {
                    number: *counter,
                    waypoint: wp,
                }
            })
            .collect()
    }

    /// Mission waypoints grouped by station, insertion order kept per station.
    pub fn stations(&self) -> BTreeMap<u8, Vec<NumberedWaypoint<'_>>> {
        let mut stations: BTreeMap<u8, Vec<NumberedWaypoint<'_>>> = BTreeMap::new();
        for msn in self.missions() {
            stations
                .entry(msn.waypoint.station.unwrap_or(0))
                .or_default()
                .push(msn);
        }
        stations
    }

    /// Sequence id to the 1-based positions of its members among the
    /// non-mission waypoints.
    pub fn sequences(&self) -> BTreeMap<u32, Vec<u32>> {
        let mut sequences: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
        for (position, wp) in self
            .waypoints
            .iter()
            .filter(|wp| !wp.is_mission())
            .enumerate()
        {
            if wp.sequence != 0 {
                sequences
                    .entry(wp.sequence)
                    .or_default()
                    .push(position as u32 + 1);
            }
        }
        sequences
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::LatLon;

    fn pos(lat: f64, lon: f64) -> LatLon {
        LatLon::new(lat, lon).unwrap()
    }

    fn sample() -> Profile {
        Profile::new(
            "sample",
            VehicleKind::Hornet,
            vec![
                Waypoint::new(WaypointType::Wp, pos(1.0, 1.0)).with_sequence(1),
                Waypoint::new(WaypointType::Wp, pos(2.0, 2.0)).with_sequence(1),
                Waypoint::new(WaypointType::Fp, pos(3.0, 3.0)),
                Waypoint::mission(8, pos(4.0, 4.0)),
                Waypoint::new(WaypointType::Wp, pos(5.0, 5.0)).with_sequence(2),
                Waypoint::mission(2, pos(6.0, 6.0)),
                Waypoint::mission(8, pos(7.0, 7.0)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_waypoint_numbers_per_type() {
        let profile = sample();
        let numbers: Vec<(WaypointType, u32)> = profile
            .waypoints()
            .iter()
            .map(|n| (n.waypoint.kind, n.number))
            .collect();
        assert_eq!(
            numbers,
            vec![
                (WaypointType::Wp, 1),
                (WaypointType::Wp, 2),
                (WaypointType::Fp, 1),
                (WaypointType::Wp, 3),
            ]
        );
    }

    #[test]
    fn test_mission_numbers_per_station() {
        let profile = sample();
        let stations = profile.stations();
        assert_eq!(stations.keys().copied().collect::<Vec<_>>(), vec![2, 8]);
        let eight: Vec<(u32, f64)> = stations[&8]
            .iter()
            .map(|n| (n.number, n.waypoint.latitude))
            .collect();
        assert_eq!(eight, vec![(1, 4.0), (2, 7.0)]);
    }

    #[test]
    fn test_sequences_use_positions() {
        let profile = sample();
        let sequences = profile.sequences();
        assert_eq!(sequences[&1], vec![1, 2]);
        assert_eq!(sequences[&2], vec![4]);
        assert_eq!(sequences.len(), 2);
    }

    #[test]
    fn test_rejects_two_current() {
        let result = Profile::new(
            "bad",
            VehicleKind::Viper,
            vec![
                Waypoint::new(WaypointType::Wp, pos(1.0, 1.0)).current(),
                Waypoint::new(WaypointType::Wp, pos(2.0, 2.0)).current(),
            ],
        );
        assert!(matches!(
            result,
            Err(ProfileError::MultipleCurrent {
                first: 0,
                second: 1
            })
        ));
    }

    #[test]
    fn test_rejects_mission_without_station() {
        let mut msn = Waypoint::mission(3, pos(1.0, 1.0));
        msn.station = None;
        let result = Profile::new("bad", VehicleKind::Hornet, vec![msn]);
        assert!(matches!(
            result,
            Err(ProfileError::MissingStation { index: 0 })
        ));
    }

    #[test]
    fn test_rejects_bad_position() {
        let mut wp = Waypoint::new(WaypointType::Wp, pos(1.0, 1.0));
        wp.latitude = 95.0;
        let result = Profile::new("bad", VehicleKind::Viper, vec![wp]);
        assert!(matches!(result, Err(ProfileError::Position { index: 0, .. })));
    }

    #[test]
    fn test_from_json_defaults_vehicle() {
        let json = r#"{
            "name": "range",
            "waypoints": [
                { "wp_type": "WP", "latitude": 36.1, "longitude": -115.2, "elevation": 2100 }
            ]
        }"#;
        let profile = Profile::from_json(json, VehicleKind::Warthog).unwrap();
        assert_eq!(profile.vehicle(), VehicleKind::Warthog);
        assert_eq!(profile.all().len(), 1);
        assert!(profile.avionics().is_none());
    }

    #[test]
    fn test_json_roundtrip_keeps_vehicle() {
        let profile = sample();
        let text = profile.to_json().unwrap();
        let parsed = Profile::from_json(&text, VehicleKind::Viper).unwrap();
        assert_eq!(parsed, profile);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        std::fs::write(&path, r#"{ "name": "x", "aircraft": "tomcat" }"#).unwrap();
        let profile = Profile::load(&path, VehicleKind::Viper).unwrap();
        assert_eq!(profile.vehicle(), VehicleKind::Tomcat);
        assert!(profile.waypoints().is_empty());
    }
}
