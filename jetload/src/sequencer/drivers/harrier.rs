//! AV-8B Harrier: UFC keypad and ODU option buttons.

use tracing::info;

use super::{digits, hemisphere_key};
use crate::coord::{render_position, CoordFormat};
use crate::profile::NumberedWaypoint;
use crate::sequencer::driver::{EntryPlan, Session};
use crate::sequencer::SequenceError;
use crate::transport::ActuationSink;

pub(crate) const FORMAT: CoordFormat = CoordFormat::dms(3);
pub(crate) const OVERHEAD: usize = 1;

fn ufc_key(key: &str) -> String {
    match key {
        "ENT" => "UFC_ENTER".to_string(),
        "CLR" => "UFC_CLEAR".to_string(),
        other => format!("UFC_B{}", other),
    }
}

async fn ufc<S: ActuationSink>(s: &mut Session<'_, S>, key: &str) {
    s.press(&ufc_key(key)).await;
}

async fn ufc_slow<S: ActuationSink>(s: &mut Session<'_, S>, key: &str) {
    let (medium, short) = (s.medium(), s.short());
    s.press_with(&ufc_key(key), medium, short).await;
}

async fn odu<S: ActuationSink>(s: &mut Session<'_, S>, option: u8) {
    s.press(&format!("ODU_OPT{}", option)).await;
}

async fn lmpcd<S: ActuationSink>(s: &mut Session<'_, S>, pb: u8) {
    s.press(&format!("MPCD_L_{}", pb)).await;
}

/// Whole part only; the UFC takes no fraction here.
async fn enter_number<S: ActuationSink>(s: &mut Session<'_, S>, text: &str) {
    let whole = text.split('.').next().unwrap_or_default();
    for d in digits(whole) {
        ufc(s, &d.to_string()).await;
    }
    ufc_slow(s, "ENT").await;
}

async fn enter_coords<S: ActuationSink>(
    s: &mut Session<'_, S>,
    wp: &NumberedWaypoint<'_>,
) -> Result<(), SequenceError> {
    let pos = wp.waypoint.position()?;
    let (lat, lon) = render_position(&FORMAT, &pos);
    info!("Entering coords string: {}, {}", lat, lon);

    ufc_slow(s, hemisphere_key(pos.lat, "2", "8")).await;
    enter_number(s, &lat).await;

    ufc_slow(s, hemisphere_key(pos.lon, "6", "4")).await;
    enter_number(s, &lon).await;

    let elevation = wp.waypoint.elevation;
    if elevation != 0 {
        odu(s, 3).await;
        enter_number(s, &elevation.max(0).to_string()).await;
    }
    Ok(())
}

pub(crate) async fn sequence_waypoints<S: ActuationSink>(
    s: &mut Session<'_, S>,
    plan: &EntryPlan<'_>,
) -> Result<(), SequenceError> {
    lmpcd(s, 2).await;

    for wp in &plan.waypoints {
        s.advance()?;
        info!("Entering waypoint {} {}", wp.waypoint.kind, wp.number);

        ufc(s, "7").await;
        ufc(s, "7").await;
        ufc(s, "ENT").await;
        odu(s, 2).await;
        enter_coords(s, wp).await?;
        odu(s, 1).await;
    }

    lmpcd(s, 2).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::LatLon;
    use crate::profile::{Profile, Waypoint, WaypointType};
    use crate::sequencer::drivers::testing::{presses, record};
    use crate::sequencer::RunOutcome;
    use crate::vehicle::VehicleKind;

    #[tokio::test]
    async fn test_negative_elevation_clamped_to_zero() {
        let pos = LatLon::new(-33.5, 151.25).unwrap();
        let profile = Profile::new(
            "h",
            VehicleKind::Harrier,
            vec![Waypoint::new(WaypointType::Wp, pos).with_elevation(-40)],
        )
        .unwrap();
        let (outcome, lines) = record(&profile).await;
        assert_eq!(outcome, RunOutcome::Completed);

        let keys = presses(&lines);
        let start = keys.iter().position(|k| k == "ODU_OPT2").unwrap();
        let expected: Vec<&str> = vec![
            // S 33 30 00
            "UFC_B8", "UFC_B3", "UFC_B3", "UFC_B3", "UFC_B0", "UFC_B0", "UFC_B0", "UFC_ENTER",
            // E 151 15 00
            "UFC_B6", "UFC_B1", "UFC_B5", "UFC_B1", "UFC_B1", "UFC_B5", "UFC_B0", "UFC_B0",
            "UFC_ENTER",
            "ODU_OPT3", "UFC_B0", "UFC_ENTER",
            "ODU_OPT1", "MPCD_L_2",
        ];
        assert_eq!(&keys[start + 1..], expected.as_slice());
    }

    #[tokio::test]
    async fn test_zero_elevation_skipped() {
        let pos = LatLon::new(10.0, 10.0).unwrap();
        let profile = Profile::new(
            "h",
            VehicleKind::Harrier,
            vec![Waypoint::new(WaypointType::Wp, pos)],
        )
        .unwrap();
        let (_, lines) = record(&profile).await;
        assert!(!presses(&lines).iter().any(|k| k == "ODU_OPT3"));
    }

    #[test]
    fn test_ufc_key_names() {
        assert_eq!(ufc_key("7"), "UFC_B7");
        assert_eq!(ufc_key("ENT"), "UFC_ENTER");
        assert_eq!(ufc_key("CLR"), "UFC_CLEAR");
    }
}
