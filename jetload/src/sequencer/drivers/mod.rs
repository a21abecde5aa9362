//! Per-vehicle entry grammars.
//!
//! Each module knows one cockpit: which controls to press, in which order,
//! and how it wants numbers and coordinates keyed in. They all work through
//! the shared [`Session`](super::driver::Session).

pub(crate) mod harrier;
pub(crate) mod hornet;
pub(crate) mod mirage;
pub(crate) mod tomcat;
pub(crate) mod viper;
pub(crate) mod warthog;

/// Decimal digits of `text`, in order.
fn digits(text: &str) -> impl Iterator<Item = char> + '_ {
    text.chars().filter(|c| c.is_ascii_digit())
}

/// Hemisphere keypad key for a latitude (`north`, `south`) or longitude
/// (`east`, `west`) value. Zero counts as north/east.
fn hemisphere_key(value: f64, positive: &'static str, negative: &'static str) -> &'static str {
    if value >= 0.0 {
        positive
    } else {
        negative
    }
}
