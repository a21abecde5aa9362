//! Watches, shadow memory and the per-buffer decoder.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::frame::FrameReader;
use crate::vehicle::VehicleKind;

/// Action raised when the cockpit asks for the current profile to be loaded.
pub const ENTER_PROFILE_ACTION: &str = "enter_profile";

/// A masked bit-field of one export word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watch {
    pub address: u16,
    pub mask: u16,
    pub shift: u8,
    pub expected: u16,
}

impl Watch {
    pub const fn new(address: u16, mask: u16, shift: u8, expected: u16) -> Self {
        Self {
            address,
            mask,
            shift,
            expected,
        }
    }

    pub fn matches(&self, word: u16) -> bool {
        (word & self.mask) >> self.shift == self.expected
    }
}

/// Immutable set of named watches for one vehicle.
#[derive(Debug, Clone, Default)]
pub struct WatchSet {
    entries: Vec<(String, Watch)>,
    addresses: HashSet<u16>,
}

impl WatchSet {
    /// Built-in watches for a vehicle.
    pub fn for_vehicle(kind: VehicleKind) -> Self {
        match kind {
            // ICP FLIR WX button
            VehicleKind::Viper => Self::from_entries([(
                ENTER_PROFILE_ACTION.to_string(),
                Watch::new(17450, 0x0040, 6, 1),
            )]),
            VehicleKind::Hornet
            | VehicleKind::Harrier
            | VehicleKind::Mirage
            | VehicleKind::Tomcat
            | VehicleKind::Warthog => Self::default(),
        }
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, Watch)>) -> Self {
        let entries: Vec<(String, Watch)> = entries.into_iter().collect();
        let addresses = entries.iter().map(|(_, w)| w.address).collect();
        Self { entries, addresses }
    }

    pub fn is_watched(&self, address: u16) -> bool {
        self.addresses.contains(&address)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Watch)> {
        self.entries.iter().map(|(name, w)| (name.as_str(), w))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Last observed value of each watched export word.
#[derive(Debug, Clone, Default)]
pub struct ShadowMap {
    values: HashMap<u16, u16>,
}

impl ShadowMap {
    /// Record a word; returns true if it differs from the last one seen.
    ///
    /// The first observation of an address always counts as a change.
    pub fn observe(&mut self, address: u16, word: u16) -> bool {
        self.values.insert(address, word) != Some(word)
    }

    pub fn get(&self, address: u16) -> Option<u16> {
        self.values.get(&address).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Stateful decoder for one vehicle's watch set.
#[derive(Debug)]
pub struct ExportDecoder {
    vehicle: VehicleKind,
    watches: WatchSet,
    shadow: ShadowMap,
}

impl ExportDecoder {
    /// Decoder with the built-in watches of `vehicle`.
    pub fn new(vehicle: VehicleKind) -> Self {
        Self::with_watches(vehicle, WatchSet::for_vehicle(vehicle))
    }

    pub fn with_watches(vehicle: VehicleKind, watches: WatchSet) -> Self {
        Self {
            vehicle,
            watches,
            shadow: ShadowMap::default(),
        }
    }

    pub fn vehicle(&self) -> VehicleKind {
        self.vehicle
    }

    pub fn shadow(&self) -> &ShadowMap {
        &self.shadow
    }

    /// Switch to another vehicle. The shadow map starts over.
    pub fn rebuild(&mut self, vehicle: VehicleKind) {
        debug!(from = %self.vehicle, to = %vehicle, "Rebuilding export watch set");
        self.vehicle = vehicle;
        self.watches = WatchSet::for_vehicle(vehicle);
        self.shadow = ShadowMap::default();
    }

    /// Decode one received buffer and return the actions whose watch matched.
    ///
    /// Watches are only evaluated when a watched word changed, and then every
    /// watch is evaluated once, so each action fires at most once per buffer.
    pub fn process(&mut self, buf: &[u8]) -> Vec<String> {
        let mut dirty = false;
        let mut reader = FrameReader::new(buf);
        for record in reader.by_ref() {
            for (address, word) in record.words() {
                if self.watches.is_watched(address) && self.shadow.observe(address, word) {
                    dirty = true;
                }
            }
        }
        if reader.truncated() {
            debug!(len = buf.len(), "Truncated export record, rest of buffer dropped");
        }
        if !dirty {
            return Vec::new();
        }

        self.watches
            .iter()
            .filter(|(_, watch)| {
                self.shadow
                    .get(watch.address)
                    .is_some_and(|word| watch.matches(word))
            })
            .map(|(name, watch)| {
                debug!(
                    action = name,
                    address = watch.address,
                    mask = watch.mask,
                    shift = watch.shift,
                    "Export watch matched"
                );
                name.to_string()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::FRAME_MARKER;

    fn frame(address: u16, word: u16) -> Vec<u8> {
        let mut buf = FRAME_MARKER.to_vec();
        buf.extend_from_slice(&address.to_le_bytes());
        buf.extend_from_slice(&2u16.to_le_bytes());
        buf.extend_from_slice(&word.to_le_bytes());
        buf
    }

    fn test_decoder() -> ExportDecoder {
        ExportDecoder::with_watches(
            VehicleKind::Viper,
            WatchSet::from_entries([("press".to_string(), Watch::new(100, 0x0040, 6, 1))]),
        )
    }

    #[test]
    fn test_watch_matches() {
        let watch = Watch::new(100, 0x0040, 6, 1);
        assert!(watch.matches(0x0040));
        assert!(watch.matches(0xFFFF));
        assert!(!watch.matches(0x0020));
    }

    #[test]
    fn test_first_frame_fires_replay_does_not() {
        let mut decoder = test_decoder();
        assert_eq!(decoder.process(&frame(100, 0x0040)), vec!["press"]);
        assert!(decoder.process(&frame(100, 0x0040)).is_empty());
    }

    #[test]
    fn test_release_and_press_again_fires() {
        let mut decoder = test_decoder();
        assert_eq!(decoder.process(&frame(100, 0x0040)).len(), 1);
        assert!(decoder.process(&frame(100, 0x0000)).is_empty());
        assert_eq!(decoder.process(&frame(100, 0x0040)).len(), 1);
    }

    #[test]
    fn test_unwatched_bit_change_retriggers_matching_watch() {
        let mut decoder = test_decoder();
        assert_eq!(decoder.process(&frame(100, 0x0040)).len(), 1);
        assert_eq!(decoder.process(&frame(100, 0x0041)).len(), 1);
    }

    #[test]
    fn test_unwatched_address_is_ignored() {
        let mut decoder = test_decoder();
        assert!(decoder.process(&frame(200, 0x0040)).is_empty());
        assert!(decoder.shadow().is_empty());
    }

    #[test]
    fn test_no_marker_leaves_shadow_untouched() {
        let mut decoder = test_decoder();
        let buf = &frame(100, 0x0040)[4..];
        assert!(decoder.process(buf).is_empty());
        assert!(decoder.shadow().is_empty());
    }

    #[test]
    fn test_truncated_buffer_drops_only_itself() {
        let mut decoder = test_decoder();

        // declares four bytes, carries two
        let mut truncated = FRAME_MARKER.to_vec();
        truncated.extend_from_slice(&100u16.to_le_bytes());
        truncated.extend_from_slice(&4u16.to_le_bytes());
        truncated.extend_from_slice(&0x0040u16.to_le_bytes());
        assert!(decoder.process(&truncated).is_empty());
        assert_eq!(decoder.shadow().get(100), None);

        assert_eq!(decoder.process(&frame(100, 0x0040)), vec!["press"]);
        assert_eq!(decoder.shadow().get(100), Some(0x0040));
    }

    #[test]
    fn test_fires_once_per_buffer() {
        let mut decoder = test_decoder();
        let mut buf = frame(100, 0x0000);
        buf.extend_from_slice(&frame(100, 0x0040));
        assert_eq!(decoder.process(&buf), vec!["press"]);
    }

    #[test]
    fn test_rebuild_resets_shadow() {
        let mut decoder = ExportDecoder::new(VehicleKind::Viper);
        assert_eq!(decoder.process(&frame(17450, 0x0040)), vec![ENTER_PROFILE_ACTION]);
        decoder.rebuild(VehicleKind::Hornet);
        assert!(decoder.shadow().is_empty());
        assert!(decoder.process(&frame(17450, 0x0040)).is_empty());
        decoder.rebuild(VehicleKind::Viper);
        assert_eq!(decoder.process(&frame(17450, 0x0040)).len(), 1);
    }

    #[test]
    fn test_builtin_watch_sets() {
        assert!(!WatchSet::for_vehicle(VehicleKind::Viper).is_empty());
        for kind in [VehicleKind::Hornet, VehicleKind::Warthog, VehicleKind::Tomcat] {
            assert!(WatchSet::for_vehicle(kind).is_empty());
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_markerless_buffers_never_fire(
                bytes in proptest::collection::vec(0u8..0x55, 0..256)
            ) {
                let mut decoder = ExportDecoder::new(VehicleKind::Viper);
                prop_assert!(decoder.process(&bytes).is_empty());
                prop_assert!(decoder.shadow().is_empty());
            }

            #[test]
            fn test_replay_is_idempotent(word in any::<u16>()) {
                let mut decoder = test_decoder();
                let buf = frame(100, word);
                let first = decoder.process(&buf);
                prop_assert_eq!(first.len(), usize::from((word & 0x0040) != 0));
                prop_assert!(decoder.process(&buf).is_empty());
            }
        }
    }
}
