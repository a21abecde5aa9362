//! `listen`: enter a profile when the cockpit asks for it.
//!
//! ```text
//! DCS-BIOS :7777 ──► ExportListener ──► ExportEvent ──► load profile ──► Sequencer
//!                         ▲                                                 │
//!                      Ctrl+C ◄────────────── shutdown ─────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use clap::Args;
use jetload::config::ConfigFile;
use jetload::export::{ExportEvent, ExportListener, StaticSession, ENTER_PROFILE_ACTION};
use jetload::profile::Profile;
use jetload::sequencer::{Driver, RunOutcome, Sequencer, SequencerError};
use jetload::transport::{Actuator, UdpSink};
use jetload::vehicle::VehicleKind;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::runtime;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct ListenArgs {
    /// Vehicle whose cockpit controls to watch (default: the profile's
    /// vehicle, then general.vehicle)
    #[arg(long)]
    pub vehicle: Option<VehicleKind>,

    /// Profile to enter when the cockpit trigger is pressed; re-read on
    /// every trigger
    #[arg(long)]
    pub profile: Option<PathBuf>,
}

pub fn run(args: ListenArgs, config: &ConfigFile) -> Result<(), CliError> {
    if !config.export.enabled {
        return Err(CliError::Config(
            "export listener is disabled (export.enabled = false)".to_string(),
        ));
    }

    let profile_vehicle = match &args.profile {
        Some(path) => Some(Profile::load(path, config.general.vehicle)?.vehicle()),
        None => None,
    };
    let vehicle = args
        .vehicle
        .or(profile_vehicle)
        .unwrap_or(config.general.vehicle);

    let sequencer = match &args.profile {
        Some(_) => {
            let sink = UdpSink::connect(&config.transport.host, config.transport.port)
                .map_err(CliError::Transport)?;
            Some(Sequencer::new(Driver::new(
                Actuator::new(sink, config.timing()),
                config.driver_options(),
            )))
        }
        None => None,
    };

    let listener_config = config.export_listener();
    println!(
        "Listening for {} on {}",
        vehicle.display_name(),
        listener_config.bind
    );
    println!("Press Ctrl+C to exit");

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    ctrlc::set_handler(move || {
        signal.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let runtime = runtime()?;
    runtime.block_on(async {
        let (tx, mut events) = mpsc::unbounded_channel();
        // this CLI cannot see the simulation window, so it is always "focused"
        let listener = ExportListener::new(listener_config, StaticSession::focused(vehicle), tx);
        let listener_task = tokio::spawn(listener.run(shutdown.clone()));

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => on_event(
                        &event,
                        args.profile.as_deref(),
                        sequencer.as_ref(),
                        config.general.vehicle,
                    ),
                    None => break,
                },
            }
        }

        shutdown.cancel();
        match listener_task.await {
            Ok(result) => result.map_err(CliError::from),
            Err(e) => Err(CliError::Run(e.to_string())),
        }
    })?;

    println!("Stopped.");
    Ok(())
}

fn on_event(
    event: &ExportEvent,
    profile_path: Option<&Path>,
    sequencer: Option<&Sequencer<UdpSink>>,
    default_vehicle: VehicleKind,
) {
    println!("{}: {}", event.vehicle, event.action);
    if event.action != ENTER_PROFILE_ACTION {
        return;
    }
    let (Some(path), Some(sequencer)) = (profile_path, sequencer) else {
        return;
    };

    let profile = match Profile::load(path, default_vehicle) {
        Ok(profile) => profile,
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to load profile");
            return;
        }
    };
    if profile.vehicle() != event.vehicle {
        warn!(
            profile = %profile.vehicle(),
            cockpit = %event.vehicle,
            "Profile is for another vehicle, not entering"
        );
        return;
    }

    match sequencer.start(profile) {
        Ok(run) => {
            tokio::spawn(async move {
                match run.join().await {
                    RunOutcome::Completed => info!("Profile entered"),
                    RunOutcome::Cancelled => info!("Profile entry cancelled"),
                    RunOutcome::Failed(reason) => error!(reason = %reason, "Profile entry failed"),
                }
            });
        }
        Err(SequencerError::AlreadyRunning) => {
            warn!("Profile entry already in progress, trigger ignored");
        }
    }
}
