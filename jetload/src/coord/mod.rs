//! Coordinate grammar module
//!
//! Renders signed decimal-degree positions into the fixed-width digit strings
//! cockpit keypads expect, and parses those strings back. Hemispheres are not
//! part of the rendered text: every keypad enters them with a separate key,
//! so callers pick the key from [`Hemisphere::of`].
//!
//! Rounding always carries upward through seconds/minutes into degrees, so a
//! rendered string never contains a 60 in a minutes or seconds field.

mod types;

pub use types::{
    Axis, CoordError, CoordFormat, CoordStyle, Hemisphere, LatLon, SecondsFormat, MAX_LAT,
    MAX_LON, MIN_LAT, MIN_LON,
};

/// Renders the magnitude of a coordinate value with the given grammar.
///
/// # Arguments
///
/// * `format` - Vehicle-specific grammar
/// * `value` - Signed decimal degrees (the sign is dropped)
/// * `axis` - Latitude or longitude (controls degree padding)
pub fn render(format: &CoordFormat, value: f64, axis: Axis) -> String {
    let magnitude = value.abs();
    let mp = format.minutes_pad;

    match format.style {
        CoordStyle::Dms(SecondsFormat::Hundredths) => {
            let units = (magnitude * 360_000.0).round() as u64;
            let deg = units / 360_000;
            let rem = units % 360_000;
            let min = rem / 6_000;
            let hundredths = rem % 6_000;
            let (sec, frac) = (hundredths / 100, hundredths % 100);

            let mut text = format!("{}{:0mp$}{:02}", degrees(format, deg, axis), min, sec);
            if frac != 0 {
                text.push_str(&format!(".{:02}", frac));
            }
            text
        }
        CoordStyle::Dms(SecondsFormat::TensDigit) => {
            let units = (magnitude * 3_600.0).round() as u64;
            let deg = units / 3_600;
            let rem = units % 3_600;
            let (min, sec) = (rem / 60, rem % 60);
            format!("{}{:0mp$}{}", degrees(format, deg, axis), min, sec / 10)
        }
        CoordStyle::Ddm { decimals } => {
            let scale = 10_u64.pow(u32::from(decimals));
            let per_degree = 60 * scale;
            let units = (magnitude * per_degree as f64).round() as u64;
            let deg = units / per_degree;
            let rem = units % per_degree;
            let (min, frac) = (rem / scale, rem % scale);

            let mut text = format!("{}{:0mp$}", degrees(format, deg, axis), min);
            if decimals > 0 {
                text.push_str(&format!(".{:0width$}", frac, width = usize::from(decimals)));
            }
            text
        }
    }
}

/// Renders both halves of a position.
#[inline]
pub fn render_position(format: &CoordFormat, position: &LatLon) -> (String, String) {
    (
        render(format, position.lat, Axis::Latitude),
        render(format, position.lon, Axis::Longitude),
    )
}

/// Parses text produced by [`render`] back into signed decimal degrees.
///
/// Minutes (and seconds) are fixed width and read from the right; whatever
/// digits remain on the left are the degrees.
pub fn parse(format: &CoordFormat, text: &str, hemisphere: Hemisphere) -> Result<f64, CoordError> {
    let malformed = |reason| CoordError::Malformed {
        text: text.to_string(),
        reason,
    };

    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, f),
        None => (text, ""),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed("expected digits"));
    }
    if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed("expected digits after decimal point"));
    }

    let mp = format.minutes_pad;
    let magnitude = match format.style {
        CoordStyle::Dms(seconds_format) => {
            let sec_width = match seconds_format {
                SecondsFormat::Hundredths => 2,
                SecondsFormat::TensDigit => 1,
            };
            if int_part.len() <= mp + sec_width {
                return Err(malformed("too few digits"));
            }
            let (head, sec_text) = int_part.split_at(int_part.len() - sec_width);
            let (deg_text, min_text) = head.split_at(head.len() - mp);

            let mut seconds = number(sec_text).ok_or_else(|| malformed("bad seconds"))?;
            if seconds_format == SecondsFormat::TensDigit {
                if !frac_part.is_empty() {
                    return Err(malformed("unexpected decimal point"));
                }
                seconds *= 10.0;
            } else {
                seconds += fraction(frac_part);
            }
            let minutes = number(min_text).ok_or_else(|| malformed("bad minutes"))?;
            if minutes >= 60.0 || seconds >= 60.0 {
                return Err(malformed("minutes or seconds out of range"));
            }
            let deg = number(deg_text).ok_or_else(|| malformed("bad degrees"))?;
            deg + minutes / 60.0 + seconds / 3_600.0
        }
        CoordStyle::Ddm { .. } => {
            if int_part.len() <= mp {
                return Err(malformed("too few digits"));
            }
            let (deg_text, min_text) = int_part.split_at(int_part.len() - mp);
            let minutes =
                number(min_text).ok_or_else(|| malformed("bad minutes"))? + fraction(frac_part);
            if minutes >= 60.0 {
                return Err(malformed("minutes out of range"));
            }
            let deg = number(deg_text).ok_or_else(|| malformed("bad degrees"))?;
            deg + minutes / 60.0
        }
    };

    let value = hemisphere.sign() * magnitude;
    match hemisphere {
        Hemisphere::North | Hemisphere::South if magnitude > MAX_LAT => {
            Err(CoordError::InvalidLatitude(value))
        }
        Hemisphere::East | Hemisphere::West if magnitude > MAX_LON => {
            Err(CoordError::InvalidLongitude(value))
        }
        _ => Ok(value),
    }
}

fn degrees(format: &CoordFormat, deg: u64, axis: Axis) -> String {
    match axis {
        Axis::Latitude => deg.to_string(),
        Axis::Longitude => format!("{:0width$}", deg, width = format.easting_pad),
    }
}

fn number(text: &str) -> Option<f64> {
    text.parse::<u64>().ok().map(|v| v as f64)
}

fn fraction(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let digits = text.parse::<u64>().unwrap_or(0) as f64;
    digits / 10_f64.powi(text.len() as i32)
}
