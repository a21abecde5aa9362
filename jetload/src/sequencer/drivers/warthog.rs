//! A-10C Warthog: CDU with named waypoints.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use super::digits;
use crate::coord::{render_position, CoordFormat};
use crate::profile::NumberedWaypoint;
use crate::sequencer::driver::{EntryPlan, Session};
use crate::sequencer::SequenceError;
use crate::transport::ActuationSink;

pub(crate) const FORMAT: CoordFormat = CoordFormat::ddm(3, 3);
pub(crate) const OVERHEAD: usize = 1;

/// Longest waypoint name the CDU keeps.
const MAX_NAME_LEN: usize = 12;

fn leading_non_letters() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^A-Z]+").unwrap())
}

fn non_alphanumerics() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^A-Z0-9]").unwrap())
}

/// Name as the CDU accepts it: upper case, starting with a letter, letters
/// and digits only.
pub(crate) fn cdu_name(name: &str, number: u32) -> String {
    let upper = name.to_uppercase();
    let trimmed = leading_non_letters().replace(&upper, "");
    let cleaned = non_alphanumerics().replace_all(&trimmed, "");
    if cleaned.is_empty() {
        return format!("WP{}", number);
    }
    cleaned.chars().take(MAX_NAME_LEN).collect()
}

fn cdu_key(key: &str) -> String {
    match key {
        " " => "CDU_SPC".to_string(),
        other => format!("CDU_{}", other),
    }
}

async fn cdu<S: ActuationSink>(s: &mut Session<'_, S>, key: &str) {
    s.press(&cdu_key(key)).await;
}

async fn clear<S: ActuationSink>(s: &mut Session<'_, S>, times: usize) {
    for _ in 0..times {
        cdu(s, "CLR").await;
    }
}

async fn enter_number<S: ActuationSink>(s: &mut Session<'_, S>, text: &str) {
    for d in digits(text) {
        cdu(s, &d.to_string()).await;
    }
}

async fn enter_name<S: ActuationSink>(s: &mut Session<'_, S>, wp: &NumberedWaypoint<'_>) {
    let name = cdu_name(&wp.waypoint.name, wp.number);
    debug!(name = %name, "Waypoint name");
    clear(s, 3).await;
    for c in name.chars() {
        cdu(s, &c.to_string()).await;
    }
    cdu(s, "LSK_3R").await;
}

async fn enter_coords<S: ActuationSink>(
    s: &mut Session<'_, S>,
    wp: &NumberedWaypoint<'_>,
) -> Result<(), SequenceError> {
    let pos = wp.waypoint.position()?;
    let (lat, lon) = render_position(&FORMAT, &pos);
    info!("Entering coords string: {}, {}", lat, lon);

    clear(s, 2).await;
    cdu(s, &pos.lat_hemisphere().letter().to_string()).await;
    enter_number(s, &lat).await;
    cdu(s, "LSK_7L").await;
    clear(s, 2).await;

    cdu(s, &pos.lon_hemisphere().letter().to_string()).await;
    enter_number(s, &lon).await;
    cdu(s, "LSK_9L").await;
    clear(s, 2).await;
    Ok(())
}

async fn enter_elevation<S: ActuationSink>(s: &mut Session<'_, S>, elevation: i32) {
    clear(s, 2).await;
    enter_number(s, &elevation.max(0).to_string()).await;
    cdu(s, "LSK_5L").await;
    clear(s, 2).await;
}

pub(crate) async fn sequence_waypoints<S: ActuationSink>(
    s: &mut Session<'_, S>,
    plan: &EntryPlan<'_>,
) -> Result<(), SequenceError> {
    let (short, medium) = (s.short(), s.medium());
    s.press_with(&cdu_key("WP"), short, short).await;
    s.press_with(&cdu_key("LSK_3L"), short, medium).await;
    debug!(count = plan.waypoints.len(), "Number of waypoints");

    let mut selected: Option<u32> = None;
    for (position, wp) in (1u32..).zip(&plan.waypoints) {
        s.advance()?;
        info!("Entering waypoint {} - {}", position, wp.waypoint.name);

        cdu(s, "LSK_7R").await;
        enter_name(s, wp).await;
        enter_coords(s, wp).await?;

        // a zero elevation is left to the CDU, which defaults it to 0 ft AGL
        if wp.waypoint.elevation != 0 {
            enter_elevation(s, wp.waypoint.elevation).await;
        }

        if wp.waypoint.is_current {
            selected = Some(position);
        }
    }

    if let Some(position) = selected {
        clear(s, 3).await;
        enter_number(s, &position.to_string()).await;
        cdu(s, "LSK_3L").await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::LatLon;
    use crate::profile::{Profile, Waypoint, WaypointType};
    use crate::sequencer::drivers::testing::{presses, record};
    use crate::vehicle::VehicleKind;

    #[test]
    fn test_cdu_name_sanitizing() {
        assert_eq!(cdu_name("12 north gate!", 3), "NORTHGATE");
        assert_eq!(cdu_name("  ", 4), "WP4");
        assert_eq!(cdu_name("123", 5), "WP5");
        assert_eq!(cdu_name("alpha-bravo-charlie", 1), "ALPHABRAVOCH");
        assert_eq!(cdu_name("ip2", 1), "IP2");
    }

    #[tokio::test]
    async fn test_current_waypoint_selected_by_number() {
        let pos = LatLon::new(42.0, 43.0).unwrap();
        let profile = Profile::new(
            "w",
            VehicleKind::Warthog,
            vec![
                Waypoint::new(WaypointType::Wp, pos).with_name("a"),
                Waypoint::new(WaypointType::Wp, pos).with_name("b").current(),
                Waypoint::new(WaypointType::Wp, pos).with_name("c"),
            ],
        )
        .unwrap();
        let (_, lines) = record(&profile).await;
        let keys = presses(&lines);
        let tail: Vec<&str> = keys[keys.len() - 5..].iter().map(String::as_str).collect();
        assert_eq!(tail, vec!["CDU_CLR", "CDU_CLR", "CDU_CLR", "CDU_2", "CDU_LSK_3L"]);
    }

    #[tokio::test]
    async fn test_elevation_entry() {
        let pos = LatLon::new(42.0, 43.0).unwrap();
        let profile = Profile::new(
            "w",
            VehicleKind::Warthog,
            vec![
                Waypoint::new(WaypointType::Wp, pos).with_elevation(-10),
                Waypoint::new(WaypointType::Wp, pos),
            ],
        )
        .unwrap();
        let (_, lines) = record(&profile).await;
        let keys = presses(&lines);
        // only the first waypoint enters an elevation, clamped to 0
        assert_eq!(keys.iter().filter(|k| *k == "CDU_LSK_5L").count(), 1);
        let lsk = keys.iter().position(|k| k == "CDU_LSK_5L").unwrap();
        assert_eq!(keys[lsk - 1], "CDU_0");
    }
}
