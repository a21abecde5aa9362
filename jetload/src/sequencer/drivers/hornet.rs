//! F/A-18C Hornet: UFC keypad, AMPCD sequences, LDDI pre-planned missions.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::info;

use super::{digits, hemisphere_key};
use crate::coord::{render_position, CoordFormat};
use crate::profile::NumberedWaypoint;
use crate::sequencer::driver::{EntryPlan, Session};
use crate::sequencer::SequenceError;
use crate::transport::ActuationSink;

pub(crate) const WAYPOINT_FORMAT: CoordFormat = CoordFormat::ddm(4, 2);
pub(crate) const MISSION_FORMAT: CoordFormat = CoordFormat::dms(2);
pub(crate) const OVERHEAD: usize = 2;

/// Lowest waypoint elevation the avionics accept.
const WAYPOINT_ELEVATION_FLOOR: i32 = -2000;
/// Lowest pre-planned target elevation the avionics accept.
const MISSION_ELEVATION_FLOOR: i32 = -328;
/// Stations in the order the stores page presents them.
const STATION_ORDER: [u8; 4] = [8, 2, 7, 3];
/// Sequences the AMPCD holds.
const MAX_SEQUENCE: u32 = 3;

/// Sequence entries: positions, with a leading 0 for sequence 1.
fn sequence_entries(plan: &EntryPlan<'_>) -> Vec<(u32, Vec<u32>)> {
    plan.sequences
        .iter()
        .filter(|(id, _)| **id <= MAX_SEQUENCE)
        .map(|(id, positions)| {
            let mut entries = Vec::with_capacity(positions.len() + 1);
            if *id == 1 {
                entries.push(0);
            }
            entries.extend_from_slice(positions);
            (*id, entries)
        })
        .collect()
}

pub(crate) fn steps(plan: &EntryPlan<'_>) -> usize {
    let waypoint_steps = if plan.waypoints.is_empty() {
        0
    } else {
        plan.waypoints.len()
            + sequence_entries(plan)
                .iter()
                .map(|(_, entries)| entries.len())
                .sum::<usize>()
    };
    waypoint_steps + plan.missions.len()
}

fn station_rank(station: u8) -> usize {
    STATION_ORDER
        .iter()
        .position(|s| *s == station)
        .unwrap_or(STATION_ORDER.len() + usize::from(station))
}

async fn ufc<S: ActuationSink>(s: &mut Session<'_, S>, key: &str) {
    s.press(&format!("UFC_{}", key)).await;
}

async fn ufc_hemisphere<S: ActuationSink>(s: &mut Session<'_, S>, key: &str) {
    let (medium, short) = (s.medium(), s.short());
    s.press_with(&format!("UFC_{}", key), medium, short).await;
}

async fn lmdi<S: ActuationSink>(s: &mut Session<'_, S>, pb: u32) {
    s.press(&format!("LEFT_DDI_PB_{:02}", pb)).await;
}

async fn ampcd<S: ActuationSink>(s: &mut Session<'_, S>, pb: u32) {
    s.press(&format!("AMPCD_PB_{:02}", pb)).await;
}

async fn enter<S: ActuationSink>(s: &mut Session<'_, S>) {
    let (long, medium) = (s.long(), s.medium());
    s.press_with("UFC_ENT", long, medium).await;
}

/// Key a number; with `two_enters` the fraction goes in after a second ENT.
async fn enter_number<S: ActuationSink>(s: &mut Session<'_, S>, text: &str, two_enters: bool) {
    let (whole, fraction) = match text.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (text, None),
    };
    for d in digits(whole) {
        ufc(s, &d.to_string()).await;
    }
    enter(s).await;

    match fraction {
        Some(fraction) if two_enters && !whole.is_empty() => {
            for d in digits(fraction) {
                ufc(s, &d.to_string()).await;
            }
            enter(s).await;
        }
        _ => {}
    }
}

fn ensure_decimal(text: String) -> String {
    if text.contains('.') {
        text
    } else {
        text + ".0"
    }
}

/// Elevation clamped at `floor`; negative values start with a `0` key.
async fn enter_elevation<S: ActuationSink>(s: &mut Session<'_, S>, elevation: i32, floor: i32) {
    let mut elevation = elevation;
    if elevation < 0 {
        elevation = -elevation.max(floor);
        ufc_hemisphere(s, "0").await;
    }
    enter_number(s, &elevation.to_string(), false).await;
}

async fn enter_coords<S: ActuationSink>(
    s: &mut Session<'_, S>,
    wp: &NumberedWaypoint<'_>,
    mission: bool,
) -> Result<(), SequenceError> {
    let pos = wp.waypoint.position()?;
    let format = if mission {
        MISSION_FORMAT
    } else {
        WAYPOINT_FORMAT
    };
    let (lat, lon) = render_position(&format, &pos);
    let (lat, lon) = (ensure_decimal(lat), ensure_decimal(lon));
    let lat_key = hemisphere_key(pos.lat, "2", "8");
    let lon_key = hemisphere_key(pos.lon, "6", "4");

    if !mission {
        info!("Entering coords string (W): {}, {}", lat, lon);
        ufc_hemisphere(s, lat_key).await;
        enter_number(s, &lat, true).await;
        s.settle(Duration::from_millis(500)).await;

        ufc_hemisphere(s, lon_key).await;
        enter_number(s, &lon, true).await;
        s.settle(Duration::from_millis(500)).await;

        ufc(s, "OS3").await;
        ufc(s, "OS1").await;
        enter_elevation(s, wp.waypoint.elevation, WAYPOINT_ELEVATION_FLOOR).await;
    } else {
        info!("Entering coords string (M): {}, {}", lat, lon);
        ufc(s, "OS1").await;
        ufc_hemisphere(s, lat_key).await;
        enter_number(s, &lat, true).await;

        ufc(s, "OS3").await;
        ufc_hemisphere(s, lon_key).await;
        enter_number(s, &lon, true).await;

        lmdi(s, 14).await;
        lmdi(s, 14).await;

        ufc(s, "OS4").await;
        ufc(s, "OS3").await;
        enter_elevation(s, wp.waypoint.elevation, MISSION_ELEVATION_FLOOR).await;
    }
    Ok(())
}

async fn enter_missions<S: ActuationSink>(
    s: &mut Session<'_, S>,
    missions: &[NumberedWaypoint<'_>],
) -> Result<(), SequenceError> {
    if missions.is_empty() {
        return Ok(());
    }

    let mut stations: BTreeMap<(usize, u8), Vec<&NumberedWaypoint<'_>>> = BTreeMap::new();
    for msn in missions {
        let station = msn.waypoint.station.unwrap_or(0);
        stations
            .entry((station_rank(station), station))
            .or_default()
            .push(msn);
    }

    lmdi(s, 19).await;
    lmdi(s, 4).await;

    for ((_, station), msns) in stations {
        for msn in msns {
            s.advance()?;
            if msn.waypoint.name.is_empty() {
                info!(station, "Entering PP mission {}", msn.number);
            } else {
                info!(station, "Entering PP mission {} - {}", msn.number, msn.waypoint.name);
            }

            if msn.number > 1 {
                lmdi(s, msn.number + 5).await;
            }
            lmdi(s, 14).await;
            ufc(s, "OS3").await;
            enter_coords(s, msn, true).await?;
            ufc(s, "CLR").await;
            ufc(s, "CLR").await;
        }
        lmdi(s, 13).await;
    }
    Ok(())
}

async fn enter_waypoints<S: ActuationSink>(
    s: &mut Session<'_, S>,
    plan: &EntryPlan<'_>,
) -> Result<(), SequenceError> {
    if plan.waypoints.is_empty() {
        return Ok(());
    }

    ampcd(s, 10).await;
    ampcd(s, 19).await;
    ufc(s, "CLR").await;
    ufc(s, "CLR").await;

    for (i, wp) in plan.waypoints.iter().enumerate() {
        s.advance()?;
        if wp.waypoint.name.is_empty() {
            info!("Entering waypoint {}", i + 1);
        } else {
            info!("Entering waypoint {} - {}", i + 1, wp.waypoint.name);
        }

        ampcd(s, 12).await;
        ampcd(s, 5).await;
        ufc(s, "OS1").await;
        enter_coords(s, wp, false).await?;
        ufc(s, "CLR").await;
    }

    for (id, entries) in sequence_entries(plan) {
        info!(sequence = id, "Entering sequence {:?}", entries);
        if id != 1 {
            ampcd(s, 15).await;
            ampcd(s, 15).await;
        }
        ampcd(s, 1).await;

        for entry in entries {
            s.advance()?;
            ufc(s, "OS4").await;
            enter_number(s, &entry.to_string(), false).await;
        }
    }

    ufc(s, "CLR").await;
    ufc(s, "CLR").await;
    ufc(s, "CLR").await;
    ampcd(s, 19).await;
    ampcd(s, 10).await;
    Ok(())
}

pub(crate) async fn sequence_waypoints<S: ActuationSink>(
    s: &mut Session<'_, S>,
    plan: &EntryPlan<'_>,
) -> Result<(), SequenceError> {
    enter_missions(s, &plan.missions).await?;
    s.advance()?;
    s.settle(Duration::from_secs(1)).await;
    enter_waypoints(s, plan).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::LatLon;
    use crate::profile::{Profile, Waypoint, WaypointType};
    use crate::sequencer::drivers::testing::{presses, record};
    use crate::sequencer::RunOutcome;
    use crate::vehicle::VehicleKind;

    fn pos(lat: f64, lon: f64) -> LatLon {
        LatLon::new(lat, lon).unwrap()
    }

    #[test]
    fn test_station_rank() {
        let mut stations = vec![3, 9, 2, 8, 7, 1];
        stations.sort_by_key(|s| station_rank(*s));
        assert_eq!(stations, vec![8, 2, 7, 3, 1, 9]);
    }

    #[test]
    fn test_ensure_decimal() {
        assert_eq!(ensure_decimal("4130".to_string()), "4130.0");
        assert_eq!(ensure_decimal("4130.25".to_string()), "4130.25");
    }

    #[tokio::test]
    async fn test_waypoint_entry_keys() {
        let profile = Profile::new(
            "h",
            VehicleKind::Hornet,
            vec![Waypoint::new(WaypointType::Wp, pos(41.5, -70.25)).with_elevation(-2500)],
        )
        .unwrap();
        let (outcome, lines) = record(&profile).await;
        assert_eq!(outcome, RunOutcome::Completed);

        let keys = presses(&lines);
        let expected: Vec<String> = [
            "AMPCD_PB_10", "AMPCD_PB_19", "UFC_CLR", "UFC_CLR",
            "AMPCD_PB_12", "AMPCD_PB_05", "UFC_OS1",
            // N 41 30.0000
            "UFC_2", "UFC_4", "UFC_1", "UFC_3", "UFC_0", "UFC_ENT",
            "UFC_0", "UFC_0", "UFC_0", "UFC_0", "UFC_ENT",
            // W 070 15.0000
            "UFC_4", "UFC_0", "UFC_7", "UFC_0", "UFC_1", "UFC_5", "UFC_ENT",
            "UFC_0", "UFC_0", "UFC_0", "UFC_0", "UFC_ENT",
            "UFC_OS3", "UFC_OS1",
            // -2500 clamps to -2000
            "UFC_0", "UFC_2", "UFC_0", "UFC_0", "UFC_0", "UFC_ENT",
            "UFC_CLR",
            "UFC_CLR", "UFC_CLR", "UFC_CLR", "AMPCD_PB_19", "AMPCD_PB_10",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(keys, expected);
    }

    #[tokio::test]
    async fn test_missions_follow_station_order() {
        let profile = Profile::new(
            "m",
            VehicleKind::Hornet,
            vec![
                Waypoint::mission(2, pos(1.0, 1.0)).with_name("A"),
                Waypoint::mission(8, pos(2.0, 2.0)).with_name("B"),
                Waypoint::mission(8, pos(3.0, 3.0)).with_name("C"),
            ],
        )
        .unwrap();
        let (outcome, lines) = record(&profile).await;
        assert_eq!(outcome, RunOutcome::Completed);

        let keys = presses(&lines);
        assert_eq!(&keys[..2], &["LEFT_DDI_PB_19", "LEFT_DDI_PB_04"]);
        // second mission on station 8 selects its slot with PB 07
        let first_slot = keys.iter().position(|k| k == "LEFT_DDI_PB_07").unwrap();
        let station_end: Vec<usize> = keys
            .iter()
            .enumerate()
            .filter(|(_, k)| *k == "LEFT_DDI_PB_13")
            .map(|(i, _)| i)
            .collect();
        assert_eq!(station_end.len(), 2);
        assert!(first_slot < station_end[0]);
        // no waypoint pages touched
        assert!(!keys.iter().any(|k| k.starts_with("AMPCD")));
    }

    #[tokio::test]
    async fn test_sequence_one_starts_with_zero() {
        let profile = Profile::new(
            "s",
            VehicleKind::Hornet,
            vec![
                Waypoint::new(WaypointType::Wp, pos(1.0, 1.0)).with_sequence(1),
                Waypoint::new(WaypointType::Wp, pos(2.0, 2.0)).with_sequence(1),
            ],
        )
        .unwrap();
        let plan = EntryPlan::build(&profile);
        assert_eq!(sequence_entries(&plan), vec![(1, vec![0, 1, 2])]);
        assert_eq!(steps(&plan), 5);
    }
}
