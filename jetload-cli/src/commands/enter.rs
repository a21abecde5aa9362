//! `enter`: sequence a profile into the cockpit.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use jetload::config::ConfigFile;
use jetload::profile::Profile;
use jetload::sequencer::{Driver, Progress, RunCommand, RunOutcome, Sequencer};
use jetload::transport::{ActuationSink, ActuationTiming, Actuator, RecordingSink, UdpSink};
use jetload::vehicle::VehicleKind;
use tracing::info;

use super::runtime;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct EnterArgs {
    /// Profile document (JSON)
    pub profile: PathBuf,

    /// Vehicle for profiles that do not name one (default: general.vehicle)
    #[arg(long)]
    pub vehicle: Option<VehicleKind>,

    /// Print the actuations instead of sending them
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: EnterArgs, config: &ConfigFile) -> Result<(), CliError> {
    let default_vehicle = args.vehicle.unwrap_or(config.general.vehicle);
    let profile = Profile::load(&args.profile, default_vehicle)?;

    println!(
        "Profile: {} ({}, {} waypoints)",
        profile.name(),
        profile.vehicle().display_name(),
        profile.all().len()
    );

    let runtime = runtime()?;

    if args.dry_run {
        let sink = Arc::new(RecordingSink::new());
        let driver = Driver::new(
            Actuator::new(Arc::clone(&sink), ActuationTiming::immediate()),
            config.driver_options(),
        );
        let outcome = runtime.block_on(drive(Sequencer::new(driver), profile))?;
        for line in sink.take() {
            println!("{}", line.trim_end());
        }
        return finish(outcome);
    }

    let sink = UdpSink::connect(&config.transport.host, config.transport.port)
        .map_err(CliError::Transport)?;
    println!("Sending to {}", sink.target());
    let driver = Driver::new(
        Actuator::new(sink, config.timing()),
        config.driver_options(),
    );
    let outcome = runtime.block_on(drive(Sequencer::new(driver), profile))?;
    finish(outcome)
}

/// Run one sequence with a progress bar; Ctrl+C cancels it.
async fn drive<S: ActuationSink + 'static>(
    sequencer: Sequencer<S>,
    profile: Profile,
) -> Result<RunOutcome, CliError> {
    let mut run = sequencer.start(profile)?;

    let canceller = run.canceller();
    ctrlc::set_handler(move || {
        let _ = canceller.send(RunCommand::Cancel);
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let bar = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::default_bar().template("{spinner} [{bar:40}] {pos:>3}% {msg}") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_message("entering (Ctrl+C to cancel)");

    while let Some(progress) = run.progress().await {
        match progress {
            Progress::Percent(percent) => bar.set_position(u64::from(percent)),
            Progress::Done => bar.set_message("done"),
        }
    }

    let outcome = run.join().await;
    match &outcome {
        RunOutcome::Completed => bar.finish(),
        _ => bar.abandon_with_message("stopped"),
    }
    Ok(outcome)
}

fn finish(outcome: RunOutcome) -> Result<(), CliError> {
    match outcome {
        RunOutcome::Completed => {
            info!("Profile entered");
            println!("Profile entered.");
            Ok(())
        }
        RunOutcome::Cancelled => Err(CliError::Run("cancelled".to_string())),
        RunOutcome::Failed(reason) => Err(CliError::Run(reason)),
    }
}
