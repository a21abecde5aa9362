//! Avionics configuration fields.
//!
//! Every field is optional; absence means "leave the vehicle default alone".
//! Fields are stored as typed values but serialize to the compact strings the
//! profile documents have always used, e.g. `"38,X,W"` for a TACAN yardstick or
//! `"1,0.020,10,1.00;1,0.020,10,1.00"` for a countermeasure program.
//!
//! Setters never clamp. An out-of-range value is rejected with a
//! [`FieldError`] and the previous value stays in place.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejection of an avionics field value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{field}: value {value} outside {range}")]
    OutOfRange {
        field: &'static str,
        value: String,
        range: &'static str,
    },

    #[error("{field}: cannot parse '{text}'")]
    Malformed { field: &'static str, text: String },
}

fn malformed(field: &'static str, text: &str) -> FieldError {
    FieldError::Malformed {
        field,
        text: text.to_string(),
    }
}

fn check_range<T>(
    field: &'static str,
    value: T,
    valid: RangeInclusive<T>,
    range: &'static str,
) -> Result<T, FieldError>
where
    T: PartialOrd + fmt::Display,
{
    if valid.contains(&value) {
        Ok(value)
    } else {
        Err(FieldError::OutOfRange {
            field,
            value: value.to_string(),
            range,
        })
    }
}

/// Parse `text` into `slot`, leaving the previous value in place on error.
///
/// Empty text clears the field back to "use default".
pub fn accept_or_keep<T>(slot: &mut Option<T>, text: &str) -> Result<(), FieldError>
where
    T: FromStr<Err = FieldError>,
{
    let text = text.trim();
    if text.is_empty() {
        *slot = None;
        return Ok(());
    }
    let value = text.parse::<T>()?;
    *slot = Some(value);
    Ok(())
}

// =============================================================================
// TACAN yardstick
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TacanBand {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TacanRole {
    Lead,
    Wingman,
}

/// Air-to-air TACAN yardstick between a lead and wingman.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TacanYardstick {
    pub channel: u8,
    pub band: TacanBand,
    pub role: TacanRole,
}

impl TacanYardstick {
    pub const CHANNELS: RangeInclusive<u8> = 1..=63;

    pub fn new(channel: u8, band: TacanBand, role: TacanRole) -> Result<Self, FieldError> {
        let channel = check_range("tacan channel", channel, Self::CHANNELS, "1..=63")?;
        Ok(Self {
            channel,
            band,
            role,
        })
    }

    /// Channel keyed into the ICP. The wingman flies 63 channels above lead.
    pub fn entered_channel(&self) -> u8 {
        match self.role {
            TacanRole::Lead => self.channel,
            TacanRole::Wingman => self.channel + 63,
        }
    }
}

impl FromStr for TacanYardstick {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        let [chan, band, role] = fields.as_slice() else {
            return Err(malformed("tacan", s));
        };
        let channel = chan.parse::<u8>().map_err(|_| malformed("tacan channel", chan))?;
        let band = match *band {
            "X" | "x" => TacanBand::X,
            "Y" | "y" => TacanBand::Y,
            other => return Err(malformed("tacan band", other)),
        };
        let role = match *role {
            "L" | "l" => TacanRole::Lead,
            "W" | "w" => TacanRole::Wingman,
            other => return Err(malformed("tacan role", other)),
        };
        Self::new(channel, band, role)
    }
}

impl fmt::Display for TacanYardstick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let band = match self.band {
            TacanBand::X => 'X',
            TacanBand::Y => 'Y',
        };
        let role = match self.role {
            TacanRole::Lead => 'L',
            TacanRole::Wingman => 'W',
        };
        write!(f, "{},{},{}", self.channel, band, role)
    }
}

impl TryFrom<String> for TacanYardstick {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TacanYardstick> for String {
    fn from(value: TacanYardstick) -> Self {
        value.to_string()
    }
}

// =============================================================================
// MFD formats
// =============================================================================

/// MFD format page, identified by the OSB code used to select it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MfdFormat {
    Blank,
    Had,
    Sms,
    Hsd,
    Dte,
    Test,
    Flcs,
    Wpn,
    Tgp,
    Fcr,
}

impl MfdFormat {
    pub fn code(&self) -> u8 {
        match self {
            MfdFormat::Blank => 1,
            MfdFormat::Had => 2,
            MfdFormat::Sms => 6,
            MfdFormat::Hsd => 7,
            MfdFormat::Dte => 8,
            MfdFormat::Test => 9,
            MfdFormat::Flcs => 10,
            MfdFormat::Wpn => 18,
            MfdFormat::Tgp => 19,
            MfdFormat::Fcr => 20,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => MfdFormat::Blank,
            2 => MfdFormat::Had,
            6 => MfdFormat::Sms,
            7 => MfdFormat::Hsd,
            8 => MfdFormat::Dte,
            9 => MfdFormat::Test,
            10 => MfdFormat::Flcs,
            18 => MfdFormat::Wpn,
            19 => MfdFormat::Tgp,
            20 => MfdFormat::Fcr,
            _ => return None,
        })
    }
}

/// Master mode an MFD setup applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterMode {
    Nav,
    Air,
    Gnd,
    Dog,
}

/// Six MFD formats in left-14, left-13, left-12, right-14, right-13,
/// right-12 order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MfdSetup(pub [MfdFormat; 6]);

impl MfdSetup {
    /// Factory setup of a master mode.
    pub fn default_for(mode: MasterMode) -> Self {
        use MfdFormat::*;
        match mode {
            MasterMode::Nav => MfdSetup([Fcr, Test, Dte, Sms, Hsd, Blank]),
            MasterMode::Air | MasterMode::Gnd => MfdSetup([Fcr, Flcs, Test, Sms, Hsd, Blank]),
            MasterMode::Dog => MfdSetup([Fcr, Blank, Blank, Sms, Blank, Blank]),
        }
    }

    pub fn formats(&self) -> &[MfdFormat; 6] {
        &self.0
    }
}

impl FromStr for MfdSetup {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut formats = [MfdFormat::Blank; 6];
        let mut count = 0;
        for field in s.split(',') {
            if count == formats.len() {
                return Err(malformed("mfd setup", s));
            }
            let code = field
                .trim()
                .parse::<u8>()
                .map_err(|_| malformed("mfd format", field))?;
            formats[count] = MfdFormat::from_code(code).ok_or_else(|| FieldError::OutOfRange {
                field: "mfd format",
                value: code.to_string(),
                range: "1,2,6,7,8,9,10,18,19,20",
            })?;
            count += 1;
        }
        if count != formats.len() {
            return Err(malformed("mfd setup", s));
        }
        Ok(MfdSetup(formats))
    }
}

impl fmt::Display for MfdSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<String> = self.0.iter().map(|m| m.code().to_string()).collect();
        f.write_str(&codes.join(","))
    }
}

impl TryFrom<String> for MfdSetup {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MfdSetup> for String {
    fn from(value: MfdSetup) -> Self {
        value.to_string()
    }
}

/// MFD setups per master mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MfdConfig {
    pub nav: Option<MfdSetup>,
    pub air: Option<MfdSetup>,
    pub gnd: Option<MfdSetup>,
    pub dog: Option<MfdSetup>,
    /// Skip formats already at their factory setting.
    pub optimize: bool,
}

impl MfdConfig {
    pub fn setup(&self, mode: MasterMode) -> Option<&MfdSetup> {
        match mode {
            MasterMode::Nav => self.nav.as_ref(),
            MasterMode::Air => self.air.as_ref(),
            MasterMode::Gnd => self.gnd.as_ref(),
            MasterMode::Dog => self.dog.as_ref(),
        }
    }

    pub fn set(&mut self, mode: MasterMode, text: &str) -> Result<(), FieldError> {
        let slot = match mode {
            MasterMode::Nav => &mut self.nav,
            MasterMode::Air => &mut self.air,
            MasterMode::Gnd => &mut self.gnd,
            MasterMode::Dog => &mut self.dog,
        };
        accept_or_keep(slot, text)
    }

    pub fn is_empty(&self) -> bool {
        self.nav.is_none() && self.air.is_none() && self.gnd.is_none() && self.dog.is_none()
    }
}

// =============================================================================
// CMDS programs
// =============================================================================

/// One countermeasure quadruple.
///
/// Intervals are held in integer units (milliseconds for bursts, hundredths
/// of a second for salvos) so equality against defaults is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmdsParams {
    pub burst_quantity: u8,
    pub burst_interval_ms: u16,
    pub salvo_quantity: u8,
    pub salvo_interval_cs: u16,
}

impl CmdsParams {
    pub fn new(
        burst_quantity: u8,
        burst_interval_ms: u16,
        salvo_quantity: u8,
        salvo_interval_cs: u16,
    ) -> Result<Self, FieldError> {
        check_range("burst quantity", burst_quantity, 0..=99, "0..=99")?;
        if burst_interval_ms != 0 {
            check_range(
                "burst interval",
                burst_interval_ms,
                20..=10_000,
                "0.020..=10.000",
            )?;
        }
        check_range("salvo quantity", salvo_quantity, 0..=99, "0..=99")?;
        if salvo_interval_cs != 0 {
            check_range(
                "salvo interval",
                salvo_interval_cs,
                50..=15_000,
                "0.50..=150.00",
            )?;
        }
        Ok(Self {
            burst_quantity,
            burst_interval_ms,
            salvo_quantity,
            salvo_interval_cs,
        })
    }

    /// The four fields in the textual form the DED accepts.
    pub fn fields(&self) -> [String; 4] {
        [
            self.burst_quantity.to_string(),
            format!(
                "{}.{:03}",
                self.burst_interval_ms / 1000,
                self.burst_interval_ms % 1000
            ),
            self.salvo_quantity.to_string(),
            format!(
                "{}.{:02}",
                self.salvo_interval_cs / 100,
                self.salvo_interval_cs % 100
            ),
        ]
    }
}

/// Parse a decimal interval into units of `10^-decimals` seconds.
///
/// Input finer than the field's resolution is rejected, not rounded.
fn parse_scaled(field: &'static str, text: &str, decimals: u32) -> Result<u16, FieldError> {
    let text = text.trim();
    if !text.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(malformed(field, text));
    }
    let value = text.parse::<f64>().map_err(|_| malformed(field, text))?;
    let fraction = text
        .split_once('.')
        .map_or("", |(_, fraction)| fraction.trim_end_matches('0'));
    if fraction.len() > decimals as usize {
        return Err(FieldError::OutOfRange {
            field,
            value: text.to_string(),
            range: if decimals == 3 { "0.001 s steps" } else { "0.01 s steps" },
        });
    }
    let scaled = (value * 10f64.powi(decimals as i32)).round();
    if !(0.0..=f64::from(u16::MAX)).contains(&scaled) {
        return Err(FieldError::OutOfRange {
            field,
            value: text.to_string(),
            range: "interval",
        });
    }
    Ok(scaled as u16)
}

impl FromStr for CmdsParams {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        let [bq, bi, sq, si] = fields.as_slice() else {
            return Err(malformed("cmds program", s));
        };
        let bq = bq.parse::<u8>().map_err(|_| malformed("burst quantity", bq))?;
        let bi = parse_scaled("burst interval", bi, 3)?;
        let sq = sq.parse::<u8>().map_err(|_| malformed("salvo quantity", sq))?;
        let si = parse_scaled("salvo interval", si, 2)?;
        Self::new(bq, bi, sq, si)
    }
}

impl fmt::Display for CmdsParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fields().join(","))
    }
}

/// Chaff and flare quadruples of one CMDS program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CmdsProgram {
    pub chaff: CmdsParams,
    pub flare: CmdsParams,
}

impl CmdsProgram {
    /// Number of programs the CMDS holds.
    pub const COUNT: usize = 6;

    /// Factory program `number` (1-based), identical for chaff and flare.
    pub fn default_for(number: usize) -> Option<Self> {
        let (bq, bi, sq, si) = match number {
            1 => (1, 20, 10, 100),
            2 => (1, 20, 10, 50),
            3 => (2, 100, 5, 100),
            4 => (2, 100, 5, 50),
            5 => (2, 50, 20, 75),
            6 => (1, 20, 1, 50),
            _ => return None,
        };
        let params = CmdsParams {
            burst_quantity: bq,
            burst_interval_ms: bi,
            salvo_quantity: sq,
            salvo_interval_cs: si,
        };
        Some(Self {
            chaff: params,
            flare: params,
        })
    }
}

impl FromStr for CmdsProgram {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (chaff, flare) = s.split_once(';').ok_or_else(|| malformed("cmds program", s))?;
        Ok(Self {
            chaff: chaff.parse()?,
            flare: flare.parse()?,
        })
    }
}

impl fmt::Display for CmdsProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.chaff, self.flare)
    }
}

impl TryFrom<String> for CmdsProgram {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CmdsProgram> for String {
    fn from(value: CmdsProgram) -> Self {
        value.to_string()
    }
}

/// CMDS programs 1..=6.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CmdsConfig {
    pub programs: [Option<CmdsProgram>; CmdsProgram::COUNT],
    /// Skip programs and fields already at their factory setting.
    pub optimize: bool,
}

impl CmdsConfig {
    /// Set program `number` (1-based).
    pub fn set(&mut self, number: usize, text: &str) -> Result<(), FieldError> {
        let index = check_range("cmds program number", number, 1..=CmdsProgram::COUNT, "1..=6")?;
        accept_or_keep(&mut self.programs[index - 1], text)
    }

    pub fn is_empty(&self) -> bool {
        self.programs.iter().all(Option::is_none)
    }
}

// =============================================================================
// JHMCS
// =============================================================================

/// Helmet display blanking and declutter options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JhmcsSetup {
    pub hud_blank: bool,
    pub cockpit_blank: bool,
    pub rwr: bool,
    /// Declutter level 0..=2.
    pub declutter: u8,
}

impl JhmcsSetup {
    pub fn new(
        hud_blank: bool,
        cockpit_blank: bool,
        rwr: bool,
        declutter: u8,
    ) -> Result<Self, FieldError> {
        let declutter = check_range("jhmcs declutter", declutter, 0..=2, "0..=2")?;
        Ok(Self {
            hud_blank,
            cockpit_blank,
            rwr,
            declutter,
        })
    }
}

fn parse_flag(field: &'static str, text: &str) -> Result<bool, FieldError> {
    match text {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(malformed(field, other)),
    }
}

impl FromStr for JhmcsSetup {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        let [hud, pit, rwr, declutter] = fields.as_slice() else {
            return Err(malformed("jhmcs", s));
        };
        let declutter = declutter
            .parse::<u8>()
            .map_err(|_| malformed("jhmcs declutter", declutter))?;
        Self::new(
            parse_flag("jhmcs hud blank", hud)?,
            parse_flag("jhmcs cockpit blank", pit)?,
            parse_flag("jhmcs rwr", rwr)?,
            declutter,
        )
    }
}

impl fmt::Display for JhmcsSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            u8::from(self.hud_blank),
            u8::from(self.cockpit_blank),
            u8::from(self.rwr),
            self.declutter
        )
    }
}

impl TryFrom<String> for JhmcsSetup {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<JhmcsSetup> for String {
    fn from(value: JhmcsSetup) -> Self {
        value.to_string()
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// A named, sparse set of avionics options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvionicsConfiguration {
    pub name: String,
    #[serde(rename = "tacan_yard")]
    pub tacan: Option<TacanYardstick>,
    pub mfd: MfdConfig,
    pub cmds: CmdsConfig,
    /// Use ownship as the bullseye reference.
    pub bullseye_ownship: Option<bool>,
    pub jhmcs: Option<JhmcsSetup>,
}

impl AvionicsConfiguration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn set_tacan(&mut self, text: &str) -> Result<(), FieldError> {
        accept_or_keep(&mut self.tacan, text)
    }

    pub fn set_jhmcs(&mut self, text: &str) -> Result<(), FieldError> {
        accept_or_keep(&mut self.jhmcs, text)
    }

    /// True when no section carries a value.
    pub fn is_empty(&self) -> bool {
        self.tacan.is_none()
            && self.mfd.is_empty()
            && self.cmds.is_empty()
            && self.bullseye_ownship.is_none()
            && self.jhmcs.is_none()
    }
}
