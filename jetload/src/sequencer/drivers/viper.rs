//! F-16C Viper: ICP keypad, DED rocker switches, MFD and CMDS setup.
//!
//! Configuration sections run after the waypoints in a fixed order:
//!
//! ```text
//! waypoints ─► TACAN ─► MFD (NAV, AA, AG, DGFT dogfight, DGFT missile)
//!           ─► CMDS (chaff P1..P6, flare P1..P6) ─► bullseye ─► JHMCS
//! ```
//!
//! With a section's optimize flag set, values equal to the factory setup are
//! skipped; without it every value is keyed in.

use std::time::Duration;

use tracing::info;

use super::{digits, hemisphere_key};
use crate::coord::{render_position, CoordFormat};
use crate::profile::{
    AvionicsConfiguration, CmdsConfig, CmdsParams, CmdsProgram, JhmcsSetup, MasterMode,
    MfdFormat, MfdSetup, NumberedWaypoint, TacanBand, TacanYardstick,
};
use crate::sequencer::driver::{EntryPlan, Session};
use crate::sequencer::SequenceError;
use crate::transport::ActuationSink;

pub(crate) const FORMAT: CoordFormat = CoordFormat::ddm(3, 3);
pub(crate) const OVERHEAD: usize = 1;

/// Lowest steerpoint elevation the avionics accept.
const ELEVATION_FLOOR: i32 = -1500;

const DED_SWITCH: &str = "ICP_DED_SW";
const DATA_UP_DN_SWITCH: &str = "ICP_DATA_UP_DN_SW";
const DATA_RTN_SEQ_SWITCH: &str = "ICP_DATA_RTN_SEQ_SW";

const SETTLE_100: Duration = Duration::from_millis(100);
const SETTLE_150: Duration = Duration::from_millis(150);
const SETTLE_250: Duration = Duration::from_millis(250);
const SETTLE_350: Duration = Duration::from_millis(350);

// =============================================================================
// Controls
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dobber {
    Up,
    Down,
    Return,
    Sequence,
}

fn icp_key(key: &str) -> String {
    match key {
        "ENTR" => "ICP_ENTR_BTN".to_string(),
        "AA_MODE" | "AG_MODE" | "LIST" | "RCL" => format!("ICP_{}_BTN", key),
        other => format!("ICP_BTN_{}", other),
    }
}

async fn icp<S: ActuationSink>(s: &mut Session<'_, S>, key: &str) {
    s.press(&icp_key(key)).await;
}

async fn icp_then<S: ActuationSink>(s: &mut Session<'_, S>, key: &str, after: Duration) {
    let short = s.short();
    s.press_with(&icp_key(key), short, after).await;
}

async fn icp_release<S: ActuationSink>(s: &mut Session<'_, S>, key: &str, release: Duration) {
    let short = s.short();
    s.press_with(&icp_key(key), release, short).await;
}

/// DED increment/decrement rocker.
async fn ded<S: ActuationSink>(s: &mut Session<'_, S>, up: bool, after: Option<Duration>) {
    let position = if up { 2 } else { 0 };
    s.rocker(DED_SWITCH, position, &[DED_SWITCH], after).await;
}

/// DCS (data control switch) four-way rocker.
async fn data<S: ActuationSink>(s: &mut Session<'_, S>, dir: Dobber, after: Option<Duration>) {
    let (switch, position) = match dir {
        Dobber::Down => (DATA_UP_DN_SWITCH, 0),
        Dobber::Up => (DATA_UP_DN_SWITCH, 2),
        Dobber::Return => (DATA_RTN_SEQ_SWITCH, 0),
        Dobber::Sequence => (DATA_RTN_SEQ_SWITCH, 2),
    };
    s.rocker(switch, position, &[DATA_UP_DN_SWITCH, DATA_RTN_SEQ_SWITCH], after)
        .await;
}

async fn enter_number<S: ActuationSink>(s: &mut Session<'_, S>, text: &str) {
    for d in digits(text) {
        icp(s, &d.to_string()).await;
    }
}

// =============================================================================
// Waypoints
// =============================================================================

async fn enter_coords<S: ActuationSink>(
    s: &mut Session<'_, S>,
    wp: &NumberedWaypoint<'_>,
) -> Result<(), SequenceError> {
    let pos = wp.waypoint.position()?;
    let (lat, lon) = render_position(&FORMAT, &pos);
    info!("Entering coords string: {}, {}", lat, lon);

    icp(s, hemisphere_key(pos.lat, "2", "8")).await;
    enter_number(s, &lat).await;
    icp(s, "ENTR").await;
    data(s, Dobber::Down, None).await;

    icp(s, hemisphere_key(pos.lon, "6", "4")).await;
    enter_number(s, &lon).await;
    icp(s, "ENTR").await;
    data(s, Dobber::Down, None).await;
    Ok(())
}

async fn enter_elevation<S: ActuationSink>(s: &mut Session<'_, S>, elevation: i32) {
    let mut elevation = elevation;
    if elevation < 0 {
        elevation = -elevation.max(ELEVATION_FLOOR);
        icp(s, "0").await;
    }
    enter_number(s, &elevation.to_string()).await;
    icp(s, "ENTR").await;
}

/// Decrements needed after the forward pass to land on the current
/// steerpoint: one per steerpoint entered after it, plus one for the final
/// increment. Without a current steerpoint the last one entered is used.
pub(crate) fn backup_count(waypoints: &[NumberedWaypoint<'_>]) -> usize {
    match waypoints.iter().position(|wp| wp.waypoint.is_current) {
        Some(index) => waypoints.len() - index,
        None => 1,
    }
}

pub(crate) async fn sequence_waypoints<S: ActuationSink>(
    s: &mut Session<'_, S>,
    plan: &EntryPlan<'_>,
) -> Result<(), SequenceError> {
    if plan.waypoints.is_empty() {
        return Ok(());
    }

    data(s, Dobber::Return, None).await;
    // STPT page
    icp_then(s, "4", SETTLE_100).await;

    for (position, wp) in (1..).zip(&plan.waypoints) {
        s.advance()?;
        data(s, Dobber::Down, None).await;
        data(s, Dobber::Down, None).await;

        if wp.waypoint.name.is_empty() {
            info!("Entering steerpoint {}", position);
        } else {
            info!("Entering steerpoint {} - {}", position, wp.waypoint.name);
        }

        enter_coords(s, wp).await?;
        if wp.waypoint.elevation != 0 {
            enter_elevation(s, wp.waypoint.elevation).await;
        }

        for _ in 0..4 {
            data(s, Dobber::Up, None).await;
        }
        ded(s, true, None).await;
    }

    for _ in 0..backup_count(&plan.waypoints) {
        ded(s, false, None).await;
    }
    data(s, Dobber::Return, None).await;
    Ok(())
}

// =============================================================================
// Configuration
// =============================================================================

/// One MFD setup pass: which master mode is entered and which setup and
/// default it uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MfdPass {
    Nav,
    AirToAir,
    AirToGround,
    DogfightOverride,
    MissileOverride,
}

impl MfdPass {
    const ALL: [MfdPass; 5] = [
        MfdPass::Nav,
        MfdPass::AirToAir,
        MfdPass::AirToGround,
        MfdPass::DogfightOverride,
        MfdPass::MissileOverride,
    ];

    /// (setup source, default source)
    fn modes(&self) -> (MasterMode, MasterMode) {
        match self {
            MfdPass::Nav => (MasterMode::Nav, MasterMode::Nav),
            MfdPass::AirToAir => (MasterMode::Air, MasterMode::Air),
            MfdPass::AirToGround => (MasterMode::Gnd, MasterMode::Gnd),
            MfdPass::DogfightOverride => (MasterMode::Dog, MasterMode::Dog),
            MfdPass::MissileOverride => (MasterMode::Air, MasterMode::Dog),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            MfdPass::Nav => "NAV",
            MfdPass::AirToAir => "AA",
            MfdPass::AirToGround => "AG",
            MfdPass::DogfightOverride => "DGFT_D",
            MfdPass::MissileOverride => "DGFT_M",
        }
    }
}

/// OSBs a setup writes, in entry order: (side, osb, index into the setup).
const MFD_OSBS: [(&str, u8, usize); 6] = [
    ("R", 12, 5),
    ("R", 13, 4),
    ("R", 14, 3),
    ("L", 12, 2),
    ("L", 13, 1),
    ("L", 14, 0),
];

/// OSB of each setup slot, in setup order.
const SLOT_OSB: [u8; 6] = [14, 13, 12, 14, 13, 12];

fn mfd_passes(avionics: &AvionicsConfiguration) -> Vec<(MfdPass, MfdSetup, Option<MfdSetup>)> {
    MfdPass::ALL
        .iter()
        .filter_map(|pass| {
            let (source, default) = pass.modes();
            let setup = *avionics.mfd.setup(source)?;
            let default = avionics
                .mfd
                .optimize
                .then(|| MfdSetup::default_for(default));
            Some((*pass, setup, default))
        })
        .collect()
}

/// Chaff or flare half of a program.
type CmdsHalf = fn(&CmdsProgram) -> CmdsParams;

fn chaff(program: &CmdsProgram) -> CmdsParams {
    program.chaff
}

fn flare(program: &CmdsProgram) -> CmdsParams {
    program.flare
}

const CMDS_HALVES: [(&str, CmdsHalf); 2] = [("Chaff", chaff), ("Flare", flare)];

fn cmds_default(cmds: &CmdsConfig, number: usize) -> Option<CmdsProgram> {
    if cmds.optimize {
        CmdsProgram::default_for(number)
    } else {
        None
    }
}

/// Programs that will be entered for one half: present and not equal to
/// the default in use.
fn cmds_changed(
    cmds: &CmdsConfig,
    half: CmdsHalf,
    number: usize,
) -> Option<(CmdsParams, Option<CmdsParams>)> {
    let program = cmds.programs.get(number - 1).copied().flatten()?;
    let value = half(&program);
    let default = cmds_default(cmds, number).map(|d| half(&d));
    (default != Some(value)).then_some((value, default))
}

pub(crate) fn steps(plan: &EntryPlan<'_>) -> usize {
    plan.waypoints.len() + plan.avionics.map_or(0, configuration_steps)
}

fn configuration_steps(avionics: &AvionicsConfiguration) -> usize {
    let tacan = usize::from(avionics.tacan.is_some());
    let mfd = mfd_passes(avionics).len();
    let cmds = if avionics.cmds.is_empty() {
        0
    } else {
        CMDS_HALVES
            .iter()
            .map(|(_, half)| {
                (1..=CmdsProgram::COUNT)
                    .filter(|n| cmds_changed(&avionics.cmds, *half, *n).is_some())
                    .count()
            })
            .sum()
    };
    let bulls = usize::from(avionics.bullseye_ownship.is_some());
    let jhmcs = usize::from(avionics.jhmcs.is_some());
    tacan + mfd + cmds + bulls + jhmcs
}

async fn enter_tacan<S: ActuationSink>(
    s: &mut Session<'_, S>,
    tacan: &TacanYardstick,
) -> Result<(), SequenceError> {
    s.advance()?;
    data(s, Dobber::Return, None).await;
    info!("Entering TACAN: {} A/A mode; EHSI TACAN", tacan);

    // T-ILS
    icp_then(s, "1", SETTLE_250).await;
    if tacan.band == TacanBand::Y {
        icp(s, "0").await;
        icp(s, "ENTR").await;
    }
    data(s, Dobber::Down, None).await;
    enter_number(s, &tacan.entered_channel().to_string()).await;
    icp_then(s, "ENTR", SETTLE_100).await;
    // REC -> T/R -> A/A TR
    data(s, Dobber::Sequence, Some(SETTLE_100)).await;
    data(s, Dobber::Sequence, Some(SETTLE_100)).await;
    data(s, Dobber::Return, Some(SETTLE_100)).await;

    s.press("EHSI_MODE").await;
    s.press("EHSI_MODE").await;

    data(s, Dobber::Return, None).await;
    Ok(())
}

async fn dgft_cycle<S: ActuationSink>(s: &mut Session<'_, S>, times: usize) {
    let control = s.options().dgft_cycle_control.clone();
    let (short, medium) = (s.short(), s.medium());
    for _ in 0..times {
        s.press_with(&control, short, medium).await;
    }
}

async fn mfd_btn<S: ActuationSink>(s: &mut Session<'_, S>, side: &str, osb: u8, after: Option<Duration>) {
    let short = s.short();
    s.press_with(&format!("MFD_{}_{}", side, osb), short, after.unwrap_or(short))
        .await;
}

async fn enter_mfd<S: ActuationSink>(
    s: &mut Session<'_, S>,
    pass: MfdPass,
    setup: &MfdSetup,
    default: Option<&MfdSetup>,
) -> Result<(), SequenceError> {
    s.advance()?;
    info!("Entering MFD: {}, formats [ {} ]", pass.label(), setup);

    match pass {
        MfdPass::Nav => {}
        MfdPass::AirToAir => icp(s, "AA_MODE").await,
        MfdPass::AirToGround => icp(s, "AG_MODE").await,
        MfdPass::DogfightOverride => dgft_cycle(s, 1).await,
        MfdPass::MissileOverride => dgft_cycle(s, 2).await,
    }

    // Start from OSB 12 on each side: no master mode comes up with an OSB 12
    // format selected, and the OSB being set up must not be selected.
    for (side, osb, index) in MFD_OSBS {
        let format = setup.formats()[index];
        mfd_btn(s, side, osb, None).await;
        if default.map_or(true, |d| d.formats()[index] != format) {
            mfd_btn(s, side, osb, Some(SETTLE_100)).await;
            mfd_btn(s, side, format.code(), Some(SETTLE_100)).await;
        }
    }

    match pass {
        MfdPass::Nav => {}
        MfdPass::AirToAir => icp(s, "AA_MODE").await,
        MfdPass::AirToGround => icp(s, "AG_MODE").await,
        MfdPass::DogfightOverride => dgft_cycle(s, 2).await,
        MfdPass::MissileOverride => dgft_cycle(s, 1).await,
    }

    // Back in NAV: select FCR and HSD where they are not on OSB 14.
    if pass == MfdPass::Nav {
        for (index, format) in setup.formats().iter().enumerate() {
            let osb = SLOT_OSB[index];
            if osb != 14 && matches!(format, MfdFormat::Fcr | MfdFormat::Hsd) {
                let side = if index > 3 { "R" } else { "L" };
                mfd_btn(s, side, osb, None).await;
            }
        }
    }
    Ok(())
}

async fn enter_cmds_field<S: ActuationSink>(s: &mut Session<'_, S>, value: &str, default: Option<&str>) {
    if default != Some(value) {
        enter_number(s, value).await;
        icp_release(s, "ENTR", SETTLE_150).await;
    }
    data(s, Dobber::Down, Some(SETTLE_150)).await;
}

async fn enter_cmds<S: ActuationSink>(
    s: &mut Session<'_, S>,
    cmds: &CmdsConfig,
) -> Result<(), SequenceError> {
    if cmds.is_empty() {
        return Ok(());
    }

    s.check_cancelled()?;
    icp(s, "LIST").await;
    icp(s, "7").await;
    // BINGO -> CHAFF
    data(s, Dobber::Sequence, Some(SETTLE_350)).await;

    for (label, half) in CMDS_HALVES {
        for number in 1..=CmdsProgram::COUNT {
            match cmds_changed(cmds, half, number) {
                Some((value, default)) => {
                    s.advance()?;
                    let dflt = default.map(|d| d.fields());
                    info!(
                        "Entering CMDS program P{} {}: <{}>, <{}> default",
                        number,
                        label,
                        value,
                        default.map_or_else(|| "none".to_string(), |d| d.to_string())
                    );
                    for (index, field) in value.fields().iter().enumerate() {
                        let default_field = dflt.as_ref().map(|d| d[index].as_str());
                        enter_cmds_field(s, field, default_field).await;
                    }
                }
                None => {
                    info!("Skipping unchanged CMDS program P{} {}", number, label);
                    s.settle(SETTLE_350).await;
                }
            }
            // next program
            ded(s, true, Some(SETTLE_250)).await;
        }
        if label == "Chaff" {
            // CHAFF -> FLARE
            data(s, Dobber::Sequence, Some(SETTLE_350)).await;
        }
    }

    data(s, Dobber::Return, None).await;
    Ok(())
}

async fn enter_bullseye<S: ActuationSink>(s: &mut Session<'_, S>, ownship: bool) -> Result<(), SequenceError> {
    s.advance()?;
    info!(ownship, "Entering bullseye setup");
    icp(s, "LIST").await;
    icp(s, "0").await;
    icp(s, "8").await;
    if ownship {
        icp(s, "0").await;
    }
    data(s, Dobber::Return, None).await;
    Ok(())
}

async fn enter_jhmcs<S: ActuationSink>(s: &mut Session<'_, S>, jhmcs: &JhmcsSetup) -> Result<(), SequenceError> {
    s.advance()?;
    info!("Entering JHMCS setup: {}", jhmcs);
    icp(s, "LIST").await;
    icp(s, "0").await;
    icp(s, "RCL").await;

    // HUD BLNK, then CKPT BLNK: "0" toggles off and advances, DN keeps it
    for blank in [jhmcs.hud_blank, jhmcs.cockpit_blank] {
        if blank {
            data(s, Dobber::Down, Some(SETTLE_150)).await;
        } else {
            icp_then(s, "0", SETTLE_150).await;
        }
    }
    for _ in 0..jhmcs.declutter.min(2) {
        icp_then(s, "1", SETTLE_150).await;
    }
    data(s, Dobber::Down, Some(SETTLE_150)).await;
    if !jhmcs.rwr {
        icp_then(s, "0", SETTLE_150).await;
    }
    data(s, Dobber::Return, None).await;
    Ok(())
}

pub(crate) async fn sequence_configuration<S: ActuationSink>(
    s: &mut Session<'_, S>,
    avionics: &AvionicsConfiguration,
) -> Result<(), SequenceError> {
    if let Some(tacan) = &avionics.tacan {
        enter_tacan(s, tacan).await?;
    }
    for (pass, setup, default) in mfd_passes(avionics) {
        enter_mfd(s, pass, &setup, default.as_ref()).await?;
    }
    enter_cmds(s, &avionics.cmds).await?;
    if let Some(ownship) = avionics.bullseye_ownship {
        enter_bullseye(s, ownship).await?;
    }
    if let Some(jhmcs) = &avionics.jhmcs {
        enter_jhmcs(s, jhmcs).await?;
    }
    Ok(())
}
