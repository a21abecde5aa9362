//! Run lifecycle: one sequence at a time per driver.
//!
//! [`Sequencer::start`] claims the driver, spawns the run on the tokio
//! runtime and hands back a [`RunHandle`]. The claim is released when the
//! run task ends, however it ends.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::control::{run_channel, Progress, RunCommand, RunRemote};
use super::driver::Driver;
use super::RunOutcome;
use crate::profile::Profile;
use crate::transport::ActuationSink;

/// Errors starting a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequencerError {
    #[error("a sequence is already running")]
    AlreadyRunning,
}

/// Releases the busy flag when the run task finishes or unwinds.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Starts sequencing runs on a shared driver.
pub struct Sequencer<S> {
    driver: Arc<Driver<S>>,
    busy: Arc<AtomicBool>,
}

impl<S> Clone for Sequencer<S> {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            busy: Arc::clone(&self.busy),
        }
    }
}

impl<S: ActuationSink + 'static> Sequencer<S> {
    pub fn new(driver: Driver<S>) -> Self {
        Self {
            driver: Arc::new(driver),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a run is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn driver(&self) -> &Driver<S> {
        &self.driver
    }

    /// Start entering `profile`.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// [`SequencerError::AlreadyRunning`] if another run has not finished yet.
    pub fn start(&self, profile: Profile) -> Result<RunHandle, SequencerError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SequencerError::AlreadyRunning);
        }
        let guard = BusyGuard(Arc::clone(&self.busy));

        let (mut control, remote) = run_channel();

        info!(
            profile = %profile.name(),
            vehicle = %profile.vehicle(),
            "Starting sequence"
        );

        let driver = Arc::clone(&self.driver);
        let task = tokio::spawn(async move {
            let _guard = guard;
            driver.run(&profile, &mut control).await
        });

        Ok(RunHandle { remote, task })
    }
}

/// Caller's side of a running sequence.
pub struct RunHandle {
    remote: RunRemote,
    task: JoinHandle<RunOutcome>,
}

impl RunHandle {
    /// Request cancellation; honoured at the next step boundary.
    pub fn cancel(&self) {
        self.remote.cancel();
    }

    /// Sender that can cancel the run from elsewhere.
    pub fn canceller(&self) -> mpsc::UnboundedSender<RunCommand> {
        self.remote.canceller()
    }

    /// Next progress update; `None` once the run has ended.
    pub async fn progress(&mut self) -> Option<Progress> {
        self.remote.progress().await
    }

    /// Wait for the run to end.
    pub async fn join(self) -> RunOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Sequence task failed");
                RunOutcome::Failed(e.to_string())
            }
        }
    }
}
