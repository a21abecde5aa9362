//! M-2000C Mirage: PCN keypad. No elevation entry.

use tracing::info;

use super::{digits, hemisphere_key};
use crate::coord::{render_position, CoordFormat};
use crate::profile::NumberedWaypoint;
use crate::sequencer::driver::{EntryPlan, Session};
use crate::sequencer::SequenceError;
use crate::transport::ActuationSink;

pub(crate) const FORMAT: CoordFormat = CoordFormat::ddm(2, 3);
pub(crate) const OVERHEAD: usize = 1;

fn pcn_key(key: &str) -> String {
    match key {
        "ENTER" | "CLR" => format!("INS_{}_BTN", key),
        "PREP" => "INS_PREP_SW".to_string(),
        other => format!("INS_BTN_{}", other),
    }
}

async fn pcn<S: ActuationSink>(s: &mut Session<'_, S>, key: &str) {
    s.press(&pcn_key(key)).await;
}

async fn pcn_slow<S: ActuationSink>(s: &mut Session<'_, S>, key: &str) {
    let (medium, short) = (s.medium(), s.short());
    s.press_with(&pcn_key(key), medium, short).await;
}

async fn enter_number<S: ActuationSink>(s: &mut Session<'_, S>, text: &str) {
    for d in digits(text) {
        pcn(s, &d.to_string()).await;
    }
    pcn(s, "ENTER").await;
}

async fn enter_coords<S: ActuationSink>(
    s: &mut Session<'_, S>,
    wp: &NumberedWaypoint<'_>,
) -> Result<(), SequenceError> {
    let pos = wp.waypoint.position()?;
    let (lat, lon) = render_position(&FORMAT, &pos);
    info!("Entering coords string: {}, {}", lat, lon);

    pcn(s, "1").await;
    pcn_slow(s, hemisphere_key(pos.lat, "2", "8")).await;
    enter_number(s, &lat).await;

    pcn(s, "3").await;
    pcn_slow(s, hemisphere_key(pos.lon, "6", "4")).await;
    enter_number(s, &lon).await;
    Ok(())
}

pub(crate) async fn sequence_waypoints<S: ActuationSink>(
    s: &mut Session<'_, S>,
    plan: &EntryPlan<'_>,
) -> Result<(), SequenceError> {
    for (slot, wp) in (1..).zip(&plan.waypoints) {
        s.advance()?;
        info!("Entering waypoint {} into slot {}", wp.number, slot);

        pcn(s, "PREP").await;
        pcn(s, "0").await;
        pcn(s, &slot.to_string()).await;
        enter_coords(s, wp).await?;
        pcn(s, "ENTER").await;
    }
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
    async fn test_slot_and_coordinates() {
        let pos = LatLon::new(43.125, 5.5).unwrap();
        let profile = Profile::new(
            "m",
            VehicleKind::Mirage,
            vec![Waypoint::new(WaypointType::Wp, pos).with_elevation(900)],
        )
        .unwrap();
        let (outcome, lines) = record(&profile).await;
        assert_eq!(outcome, RunOutcome::Completed);

        let expected: Vec<&str> = vec![
            "INS_PREP_SW", "INS_BTN_0", "INS_BTN_1",
            // N 43 07.50
            "INS_BTN_1", "INS_BTN_2",
            "INS_BTN_4", "INS_BTN_3", "INS_BTN_0", "INS_BTN_7", "INS_BTN_5", "INS_BTN_0",
            "INS_ENTER_BTN",
            // E 005 30.00
            "INS_BTN_3", "INS_BTN_6",
            "INS_BTN_0", "INS_BTN_0", "INS_BTN_5", "INS_BTN_3", "INS_BTN_0", "INS_BTN_0",
            "INS_BTN_0", "INS_ENTER_BTN",
            "INS_ENTER_BTN",
        ];
        assert_eq!(presses(&lines), expected);
    }

    #[tokio::test]
    async fn test_capacity_is_nine() {
        let pos = LatLon::new(1.0, 1.0).unwrap();
        let profile = Profile::new(
            "m",
            VehicleKind::Mirage,
            (0..11).map(|_| Waypoint::new(WaypointType::Wp, pos)).collect(),
        )
        .unwrap();
        let (_, lines) = record(&profile).await;
        let preps = presses(&lines).iter().filter(|k| *k == "INS_PREP_SW").count();
        assert_eq!(preps, 9);
    }
}
