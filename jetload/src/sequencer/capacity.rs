//! Per-vehicle waypoint capacity tables and validation.

use tracing::warn;

use crate::profile::{NumberedWaypoint, WaypointType};
use crate::vehicle::VehicleKind;

/// Maximum waypoint number per type tag. `None` means unbounded; a tag that
/// is not listed cannot be entered at all.
#[derive(Debug, Clone, Copy)]
pub struct CapacityTable {
    limits: &'static [(WaypointType, Option<u32>)],
}

const HORNET: &[(WaypointType, Option<u32>)] =
    &[(WaypointType::Wp, None), (WaypointType::Msn, Some(6))];
const HARRIER: &[(WaypointType, Option<u32>)] = &[(WaypointType::Wp, None)];
const MIRAGE: &[(WaypointType, Option<u32>)] = &[(WaypointType::Wp, Some(9))];
const TOMCAT: &[(WaypointType, Option<u32>)] = &[
    (WaypointType::Wp, Some(3)),
    (WaypointType::Fp, Some(1)),
    (WaypointType::Ip, Some(1)),
    (WaypointType::St, Some(1)),
    (WaypointType::Ha, Some(1)),
    (WaypointType::Dp, Some(1)),
    (WaypointType::Hb, Some(1)),
];
const WARTHOG: &[(WaypointType, Option<u32>)] = &[(WaypointType::Wp, Some(99))];
const VIPER: &[(WaypointType, Option<u32>)] = &[(WaypointType::Wp, Some(127))];

impl CapacityTable {
    pub fn for_vehicle(kind: VehicleKind) -> Self {
        let limits = match kind {
            VehicleKind::Hornet => HORNET,
            VehicleKind::Harrier => HARRIER,
            VehicleKind::Mirage => MIRAGE,
            VehicleKind::Tomcat => TOMCAT,
            VehicleKind::Warthog => WARTHOG,
            VehicleKind::Viper => VIPER,
        };
        Self { limits }
    }

    /// `None` if the type is unsupported, `Some(None)` if unbounded.
    pub fn limit(&self, kind: WaypointType) -> Option<Option<u32>> {
        self.limits
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, limit)| *limit)
    }

    pub fn accepts(&self, wp: &NumberedWaypoint<'_>) -> bool {
        match self.limit(wp.waypoint.kind) {
            None => false,
            Some(None) => true,
            Some(Some(max)) => wp.number <= max,
        }
    }

    /// Drop what the vehicle cannot hold, then order stably by type tag.
    pub fn validate<'a>(&self, waypoints: Vec<NumberedWaypoint<'a>>) -> Vec<NumberedWaypoint<'a>> {
        let mut accepted: Vec<NumberedWaypoint<'a>> = waypoints
            .into_iter()
            .filter(|wp| {
                let ok = self.accepts(wp);
                if !ok {
                    warn!(
                        kind = %wp.waypoint.kind,
                        number = wp.number,
                        name = %wp.waypoint.name,
                        "Waypoint exceeds vehicle capacity, skipped"
                    );
                }
                ok
            })
            .collect();
        accepted.sort_by_key(|wp| wp.waypoint.kind);
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::LatLon;
    use crate::profile::{Profile, Waypoint};

    fn profile(vehicle: VehicleKind, kinds: &[WaypointType]) -> Profile {
        let pos = LatLon::new(10.0, 10.0).unwrap();
        Profile::new(
            "t",
            vehicle,
            kinds.iter().map(|k| Waypoint::new(*k, pos)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_limit_lookup() {
        let tomcat = CapacityTable::for_vehicle(VehicleKind::Tomcat);
        assert_eq!(tomcat.limit(WaypointType::Wp), Some(Some(3)));
        assert_eq!(tomcat.limit(WaypointType::Msn), None);
        let hornet = CapacityTable::for_vehicle(VehicleKind::Hornet);
        assert_eq!(hornet.limit(WaypointType::Wp), Some(None));
    }

    #[test]
    fn test_excess_waypoints_dropped() {
        let p = profile(VehicleKind::Mirage, &[WaypointType::Wp; 12]);
        let table = CapacityTable::for_vehicle(VehicleKind::Mirage);
        let valid = table.validate(p.waypoints());
        assert_eq!(valid.len(), 9);
        assert_eq!(valid.last().unwrap().number, 9);
    }

    #[test]
    fn test_unsupported_type_dropped() {
        let p = profile(
            VehicleKind::Viper,
            &[WaypointType::Wp, WaypointType::Fp, WaypointType::Wp],
        );
        let valid = CapacityTable::for_vehicle(VehicleKind::Viper).validate(p.waypoints());
        assert_eq!(valid.len(), 2);
        assert!(valid.iter().all(|wp| wp.waypoint.kind == WaypointType::Wp));
    }

    #[test]
    fn test_sorted_by_type_stably() {
        let p = profile(
            VehicleKind::Tomcat,
            &[
                WaypointType::Wp,
                WaypointType::St,
                WaypointType::Wp,
                WaypointType::Fp,
            ],
        );
        let valid = CapacityTable::for_vehicle(VehicleKind::Tomcat).validate(p.waypoints());
        let order: Vec<(WaypointType, u32)> =
            valid.iter().map(|wp| (wp.waypoint.kind, wp.number)).collect();
        assert_eq!(
            order,
            vec![
                (WaypointType::Fp, 1),
                (WaypointType::St, 1),
                (WaypointType::Wp, 1),
                (WaypointType::Wp, 2),
            ]
        );
    }
}
