//! Driver front door and the shared actuation session.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::capacity::CapacityTable;
use super::control::{Progress, RunCommand, RunControl};
use super::drivers::{harrier, hornet, mirage, tomcat, viper, warthog};
use super::{RunOutcome, SequenceError};
use crate::coord::CoordFormat;
use crate::profile::{AvionicsConfiguration, NumberedWaypoint, Profile};
use crate::transport::{ActuationSink, Actuator};
use crate::vehicle::VehicleKind;

/// Default control pressed to cycle the viper dogfight override.
pub const DEFAULT_DGFT_CYCLE_CONTROL: &str = "DGFT_CYCLE";

/// Driver options that come from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOptions {
    /// Control used to step through the dogfight master modes.
    pub dgft_cycle_control: String,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            dgft_cycle_control: DEFAULT_DGFT_CYCLE_CONTROL.to_string(),
        }
    }
}

/// Coordinate grammars a vehicle keys in, labelled by what they are used for.
pub fn entry_formats(kind: VehicleKind) -> Vec<(&'static str, CoordFormat)> {
    match kind {
        VehicleKind::Hornet => vec![
            ("waypoint", hornet::WAYPOINT_FORMAT),
            ("mission", hornet::MISSION_FORMAT),
        ],
        VehicleKind::Harrier => vec![("waypoint", harrier::FORMAT)],
        VehicleKind::Mirage => vec![("waypoint", mirage::FORMAT)],
        VehicleKind::Tomcat => vec![("waypoint", tomcat::FORMAT)],
        VehicleKind::Warthog => vec![("waypoint", warthog::FORMAT)],
        VehicleKind::Viper => vec![("waypoint", viper::FORMAT)],
    }
}

// =============================================================================
// Entry plan
// =============================================================================

/// The validated part of a profile a driver works from.
#[derive(Debug)]
pub(crate) struct EntryPlan<'a> {
    /// Non-mission waypoints the vehicle accepts, ordered by type.
    pub waypoints: Vec<NumberedWaypoint<'a>>,
    /// Mission waypoints the vehicle accepts, in document order.
    pub missions: Vec<NumberedWaypoint<'a>>,
    pub sequences: BTreeMap<u32, Vec<u32>>,
    pub avionics: Option<&'a AvionicsConfiguration>,
}

impl<'a> EntryPlan<'a> {
    pub fn build(profile: &'a Profile) -> Self {
        let table = CapacityTable::for_vehicle(profile.vehicle());
        Self {
            waypoints: table.validate(profile.waypoints()),
            missions: table.validate(profile.missions()),
            sequences: profile.sequences(),
            avionics: profile.avionics(),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// Actuation helpers for one run, shared by every vehicle driver.
pub(crate) struct Session<'a, S> {
    actuator: &'a Actuator<S>,
    control: &'a mut RunControl,
    options: &'a DriverOptions,
    missed: usize,
}

impl<'a, S: ActuationSink> Session<'a, S> {
    fn new(actuator: &'a Actuator<S>, control: &'a mut RunControl, options: &'a DriverOptions) -> Self {
        Self {
            actuator,
            control,
            options,
            missed: 0,
        }
    }

    pub fn options(&self) -> &DriverOptions {
        self.options
    }

    pub fn short(&self) -> Duration {
        self.actuator.timing().short
    }

    pub fn medium(&self) -> Duration {
        self.actuator.timing().medium
    }

    pub fn long(&self) -> Duration {
        self.actuator.timing().long()
    }

    fn record(&mut self, sent: bool) {
        if !sent {
            self.missed += 1;
        }
    }

    /// Press with the short release and settle delays.
    pub async fn press(&mut self, name: &str) {
        let short = self.short();
        self.press_with(name, short, short).await;
    }

    pub async fn press_with(&mut self, name: &str, release: Duration, after: Duration) {
        let sent = self.actuator.press_with(name, release, after).await;
        self.record(sent);
    }

    pub async fn raw(&mut self, payload: &str, after: Duration) {
        let sent = self.actuator.raw(payload, after).await;
        self.record(sent);
    }

    pub async fn rocker(&mut self, switch: &str, position: u8, rest: &[&str], after: Option<Duration>) {
        let release = self.short();
        let sent = self.actuator.rocker(switch, position, rest, release).await;
        self.record(sent);
        if let Some(after) = after {
            self.actuator.settle(after).await;
        }
    }

    pub async fn settle(&self, delay: Duration) {
        self.actuator.settle(delay).await;
    }

    /// Step boundary: cancellation check and progress.
    pub fn advance(&mut self) -> Result<(), SequenceError> {
        self.control.advance()
    }

    /// Cancellation check without a progress step, for section navigation.
    pub fn check_cancelled(&mut self) -> Result<(), SequenceError> {
        self.control.check_cancelled()
    }
}

// =============================================================================
// Driver
// =============================================================================

/// Translates profiles into actuations for any supported vehicle.
///
/// Owns the actuator (and so the transport socket); one driver serves one
/// run at a time.
pub struct Driver<S> {
    actuator: Actuator<S>,
    options: DriverOptions,
}

impl<S: ActuationSink> Driver<S> {
    pub fn new(actuator: Actuator<S>, options: DriverOptions) -> Self {
        Self { actuator, options }
    }

    pub fn actuator(&self) -> &Actuator<S> {
        &self.actuator
    }

    /// Enter a whole profile.
    ///
    /// Never panics on sequencing problems and never returns an error: the
    /// outcome says whether the run completed, was cancelled or failed.
    ///
    /// # Arguments
    ///
    /// * `profile` - Read-only profile snapshot
    /// * `commands` - Cancel requests from the caller
    /// * `progress` - Progress updates to the caller
    pub async fn enter_all(
        &self,
        profile: &Profile,
        commands: mpsc::UnboundedReceiver<RunCommand>,
        progress: mpsc::UnboundedSender<Progress>,
    ) -> RunOutcome {
        let mut control = RunControl::new(commands, progress);
        self.run(profile, &mut control).await
    }

    /// Enter a whole profile with an existing control endpoint.
    pub async fn run(&self, profile: &Profile, control: &mut RunControl) -> RunOutcome {
        let kind = profile.vehicle();
        info!(profile = profile.name(), vehicle = %kind, "Entering profile");

        let plan = EntryPlan::build(profile);
        let (steps, overhead) = step_plan(kind, &plan);
        control.set_total_steps(steps, overhead);

        let (result, missed) = {
            let mut session = Session::new(&self.actuator, control, &self.options);
            let result = sequence(kind, &mut session, &plan).await;
            (result, session.missed)
        };

        if missed > 0 {
            warn!(missed, "Some actuations were not fully sent");
        }

        match result {
            Ok(()) => {
                control.finish();
                info!(profile = profile.name(), "Profile entry complete");
                RunOutcome::Completed
            }
            Err(SequenceError::Cancelled) => {
                info!(profile = profile.name(), "Profile entry cancelled");
                RunOutcome::Cancelled
            }
            Err(SequenceError::Internal(reason)) => {
                error!(profile = profile.name(), reason = %reason, "Profile entry failed");
                RunOutcome::Failed(reason)
            }
        }
    }
}

/// Logical steps and fixed overhead for progress accounting.
fn step_plan(kind: VehicleKind, plan: &EntryPlan<'_>) -> (usize, usize) {
    match kind {
        VehicleKind::Hornet => (hornet::steps(plan), hornet::OVERHEAD),
        VehicleKind::Harrier => (plan.waypoints.len(), harrier::OVERHEAD),
        VehicleKind::Mirage => (plan.waypoints.len(), mirage::OVERHEAD),
        VehicleKind::Tomcat => (plan.waypoints.len(), tomcat::OVERHEAD),
        VehicleKind::Warthog => (plan.waypoints.len(), warthog::OVERHEAD),
        VehicleKind::Viper => (viper::steps(plan), viper::OVERHEAD),
    }
}

async fn sequence<S: ActuationSink>(
    kind: VehicleKind,
    session: &mut Session<'_, S>,
    plan: &EntryPlan<'_>,
) -> Result<(), SequenceError> {
    sequence_waypoints(kind, session, plan).await?;
    sequence_configuration(kind, session, plan).await
}

async fn sequence_waypoints<S: ActuationSink>(
    kind: VehicleKind,
    session: &mut Session<'_, S>,
    plan: &EntryPlan<'_>,
) -> Result<(), SequenceError> {
    match kind {
        VehicleKind::Hornet => hornet::sequence_waypoints(session, plan).await,
        VehicleKind::Harrier => harrier::sequence_waypoints(session, plan).await,
        VehicleKind::Mirage => mirage::sequence_waypoints(session, plan).await,
        VehicleKind::Tomcat => tomcat::sequence_waypoints(session, plan).await,
        VehicleKind::Warthog => warthog::sequence_waypoints(session, plan).await,
        VehicleKind::Viper => viper::sequence_waypoints(session, plan).await,
    }
}

async fn sequence_configuration<S: ActuationSink>(
    kind: VehicleKind,
    session: &mut Session<'_, S>,
    plan: &EntryPlan<'_>,
) -> Result<(), SequenceError> {
    match (kind, plan.avionics) {
        (VehicleKind::Viper, Some(avionics)) => {
            viper::sequence_configuration(session, avionics).await
        }
        (_, Some(_)) => {
            info!(vehicle = %kind, "Vehicle has no avionics setup, configuration skipped");
            Ok(())
        }
        (_, None) => Ok(()),
    }
}
