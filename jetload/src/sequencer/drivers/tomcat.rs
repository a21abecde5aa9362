//! F-14A/B Tomcat: RIO CAP keypad in the TAC category.

use tracing::info;

use super::{digits, hemisphere_key};
use crate::coord::{render_position, CoordFormat};
use crate::profile::{NumberedWaypoint, WaypointType};
use crate::sequencer::driver::{EntryPlan, Session};
use crate::sequencer::SequenceError;
use crate::transport::ActuationSink;

pub(crate) const FORMAT: CoordFormat = CoordFormat::dms_tens(2);
pub(crate) const OVERHEAD: usize = 1;

/// Raw line selecting the TAC category on the CAP category knob.
const TAC_CATEGORY: &str = "RIO_CAP_CATRGORY 3";

fn cap_key(key: &str) -> String {
    let prefix = match key {
        "0" => "RIO_CAP_BRG_",
        "1" => "RIO_CAP_LAT_",
        "2" => "RIO_CAP_NBR_",
        "3" => "RIO_CAP_SPD_",
        "4" => "RIO_CAP_ALT_",
        "5" => "RIO_CAP_RNG_",
        "6" => "RIO_CAP_LONG_",
        "8" => "RIO_CAP_HDG_",
        _ => "RIO_CAP_",
    };
    format!("{}{}", prefix, key)
}

/// CAP button holding a waypoint type.
fn slot_button(wp: &NumberedWaypoint<'_>) -> u32 {
    match wp.waypoint.kind {
        WaypointType::Fp => 4,
        WaypointType::Ip => 5,
        WaypointType::Hb => 6,
        WaypointType::Dp => 7,
        WaypointType::Ha => 8,
        WaypointType::St => 9,
        WaypointType::Wp | WaypointType::Msn => wp.number,
    }
}

async fn cap<S: ActuationSink>(s: &mut Session<'_, S>, key: &str) {
    s.press(&cap_key(key)).await;
}

async fn cap_slow<S: ActuationSink>(s: &mut Session<'_, S>, key: &str) {
    let (medium, short) = (s.medium(), s.short());
    s.press_with(&cap_key(key), medium, short).await;
}

async fn enter_number<S: ActuationSink>(s: &mut Session<'_, S>, text: &str) {
    for d in digits(text) {
        cap(s, &d.to_string()).await;
    }
    cap(s, "ENTER").await;
}

async fn enter_coords<S: ActuationSink>(
    s: &mut Session<'_, S>,
    wp: &NumberedWaypoint<'_>,
) -> Result<(), SequenceError> {
    let pos = wp.waypoint.position()?;
    let (lat, lon) = render_position(&FORMAT, &pos);
    info!("Entering coords string: {}, {}", lat, lon);

    cap(s, "1").await;
    cap_slow(s, hemisphere_key(pos.lat, "NE", "SW")).await;
    enter_number(s, &lat).await;

    cap(s, "6").await;
    cap_slow(s, hemisphere_key(pos.lon, "NE", "SW")).await;
    enter_number(s, &lon).await;

    let elevation = wp.waypoint.elevation;
    if elevation != 0 {
        cap(s, "3").await;
        enter_number(s, &elevation.max(0).to_string()).await;
    }
    Ok(())
}

pub(crate) async fn sequence_waypoints<S: ActuationSink>(
    s: &mut Session<'_, S>,
    plan: &EntryPlan<'_>,
) -> Result<(), SequenceError> {
    let short = s.short();
    s.raw(TAC_CATEGORY, short).await;

    for wp in &plan.waypoints {
        s.advance()?;
        info!("Entering waypoint {} {}", wp.waypoint.kind, wp.number);

        cap(s, &format!("BTN_{}", slot_button(wp))).await;
        enter_coords(s, wp).await?;
        cap(s, "CLEAR").await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::LatLon;
    use crate::profile::{Profile, Waypoint};
    use crate::sequencer::drivers::testing::{presses, record};
    use crate::vehicle::VehicleKind;

    #[test]
    fn test_cap_key_names() {
        assert_eq!(cap_key("1"), "RIO_CAP_LAT_1");
        assert_eq!(cap_key("7"), "RIO_CAP_7");
        assert_eq!(cap_key("ENTER"), "RIO_CAP_ENTER");
        assert_eq!(cap_key("BTN_4"), "RIO_CAP_BTN_4");
    }

    #[tokio::test]
    async fn test_slots_by_type() {
        let pos = LatLon::new(26.5, 56.25).unwrap();
        let profile = Profile::new(
            "t",
            VehicleKind::Tomcat,
            vec![
                Waypoint::new(WaypointType::Wp, pos),
                Waypoint::new(WaypointType::Ip, pos),
                Waypoint::new(WaypointType::Wp, pos),
            ],
        )
        .unwrap();
        let (_, lines) = record(&profile).await;
        assert_eq!(lines[0], TAC_CATEGORY);

        let slots: Vec<String> = presses(&lines)
            .into_iter()
            .filter(|k| k.starts_with("RIO_CAP_BTN_"))
            .collect();
        // types sort IP before WP
        assert_eq!(slots, vec!["RIO_CAP_BTN_5", "RIO_CAP_BTN_1", "RIO_CAP_BTN_2"]);
    }

    #[tokio::test]
    async fn test_coordinates_use_tens_of_seconds() {
        // 26°30'00" N, 56°15'00" E
        let pos = LatLon::new(26.5, 56.25).unwrap();
        let profile = Profile::new(
            "t",
            VehicleKind::Tomcat,
            vec![Waypoint::new(WaypointType::Wp, pos)],
        )
        .unwrap();
        let (_, lines) = record(&profile).await;
        let keys = presses(&lines);
        let expected: Vec<&str> = vec![
            "RIO_CAP_BTN_1",
            "RIO_CAP_LAT_1", "RIO_CAP_NE",
            "RIO_CAP_NBR_2", "RIO_CAP_LONG_6", "RIO_CAP_SPD_3", "RIO_CAP_BRG_0", "RIO_CAP_BRG_0",
            "RIO_CAP_ENTER",
            "RIO_CAP_LONG_6", "RIO_CAP_NE",
            "RIO_CAP_RNG_5", "RIO_CAP_LONG_6", "RIO_CAP_LAT_1", "RIO_CAP_RNG_5", "RIO_CAP_BRG_0",
            "RIO_CAP_ENTER",
            "RIO_CAP_CLEAR",
        ];
        assert_eq!(keys, expected);
    }
}
