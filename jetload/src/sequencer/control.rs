//! Progress and cancellation between a run and its caller.
//!
//! Two one-way queues connect the two sides. Neither side ever blocks on
//! them: the run polls for commands at step boundaries and pushes progress
//! without waiting.
//!
//! ```text
//!  caller (RunRemote)                    run (RunControl)
//!     cancel() ── RunCommand::Cancel ──►  advance() checks, returns Cancelled
//!     progress() ◄── Percent(n) ───────   advance() publishes
//!                ◄── Percent(100), Done   finish()
//! ```

use tokio::sync::mpsc;
use tracing::debug;

use super::SequenceError;

/// Command sent from the caller to a running sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunCommand {
    Cancel,
}

/// Progress published by a running sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Cumulative completion, 0..=100, strictly increasing within a run.
    Percent(u8),
    /// Terminal marker, only sent by a run that completed.
    Done,
}

/// Create the connected pair of queues for one run.
pub fn run_channel() -> (RunControl, RunRemote) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (progress_tx, progress_rx) = mpsc::unbounded_channel();
    (
        RunControl::new(command_rx, progress_tx),
        RunRemote {
            commands: command_tx,
            progress: progress_rx,
        },
    )
}

/// Run-side end of the queues, with the progress arithmetic.
#[derive(Debug)]
pub struct RunControl {
    commands: mpsc::UnboundedReceiver<RunCommand>,
    progress: mpsc::UnboundedSender<Progress>,
    step: f64,
    current: f64,
    published: Option<u8>,
}

impl RunControl {
    pub fn new(
        commands: mpsc::UnboundedReceiver<RunCommand>,
        progress: mpsc::UnboundedSender<Progress>,
    ) -> Self {
        Self {
            commands,
            progress,
            step: 0.0,
            current: 0.0,
            published: None,
        }
    }

    /// Size each step as `100 / (steps + overhead)` and reset progress.
    pub fn set_total_steps(&mut self, steps: usize, overhead: usize) {
        let total = (steps + overhead).max(1);
        self.step = 100.0 / total as f64;
        self.current = 0.0;
        debug!(steps, overhead, "Sequence step plan");
    }

    /// Cancellation point plus one step of progress.
    ///
    /// Returns [`SequenceError::Cancelled`] if the caller asked to stop; in
    /// that case no progress is published.
    pub fn advance(&mut self) -> Result<(), SequenceError> {
        self.check_cancelled()?;
        self.current = (self.current + self.step).min(100.0);
        self.publish(self.current.floor() as u8);
        Ok(())
    }

    /// Non-blocking check of the command queue.
    pub fn check_cancelled(&mut self) -> Result<(), SequenceError> {
        match self.commands.try_recv() {
            Ok(RunCommand::Cancel) => Err(SequenceError::Cancelled),
            Err(_) => Ok(()),
        }
    }

    /// Publish 100 and the terminal marker.
    pub fn finish(&mut self) {
        self.current = 100.0;
        self.publish(100);
        let _ = self.progress.send(Progress::Done);
    }

    fn publish(&mut self, percent: u8) {
        if self.published.map_or(true, |last| percent > last) {
            self.published = Some(percent);
            // a caller that stopped listening is not an error
            let _ = self.progress.send(Progress::Percent(percent));
        }
    }
}

/// Caller-side end of the queues.
#[derive(Debug)]
pub struct RunRemote {
    commands: mpsc::UnboundedSender<RunCommand>,
    progress: mpsc::UnboundedReceiver<Progress>,
}

impl RunRemote {
    /// Ask the run to stop at its next step boundary.
    pub fn cancel(&self) {
        let _ = self.commands.send(RunCommand::Cancel);
    }

    /// A cloneable sender for cancel requests, e.g. for a signal handler.
    pub fn canceller(&self) -> mpsc::UnboundedSender<RunCommand> {
        self.commands.clone()
    }

    /// Next progress value; `None` once the run has ended and the queue is
    /// drained.
    pub async fn progress(&mut self) -> Option<Progress> {
        self.progress.recv().await
    }

    /// Next progress value if one is already queued.
    pub fn try_progress(&mut self) -> Option<Progress> {
        self.progress.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(remote: &mut RunRemote) -> Vec<Progress> {
        std::iter::from_fn(|| remote.try_progress()).collect()
    }

    #[test]
    fn test_progress_steps() {
        let (mut control, mut remote) = run_channel();
        control.set_total_steps(3, 1);
        for _ in 0..3 {
            control.advance().unwrap();
        }
        control.finish();
        assert_eq!(
            drain(&mut remote),
            vec![
                Progress::Percent(25),
                Progress::Percent(50),
                Progress::Percent(75),
                Progress::Percent(100),
                Progress::Done
            ]
        );
    }

    #[test]
    fn test_small_steps_publish_only_changes() {
        let (mut control, mut remote) = run_channel();
        control.set_total_steps(299, 1);
        for _ in 0..10 {
            control.advance().unwrap();
        }
        let values: Vec<u8> = drain(&mut remote)
            .into_iter()
            .filter_map(|p| match p {
                Progress::Percent(v) => Some(v),
                Progress::Done => None,
            })
            .collect();
        assert!(values.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(values.last(), Some(&3));
    }

    #[test]
    fn test_progress_clamps_at_hundred() {
        let (mut control, mut remote) = run_channel();
        control.set_total_steps(1, 0);
        control.advance().unwrap();
        control.advance().unwrap();
        control.finish();
        assert_eq!(
            drain(&mut remote),
            vec![Progress::Percent(100), Progress::Done]
        );
    }

    #[test]
    fn test_cancel_is_seen_at_next_advance() {
        let (mut control, mut remote) = run_channel();
        control.set_total_steps(4, 1);
        control.advance().unwrap();
        remote.cancel();
        assert_eq!(control.advance(), Err(SequenceError::Cancelled));
        assert_eq!(drain(&mut remote), vec![Progress::Percent(20)]);
    }

    #[test]
    fn test_zero_steps_still_finishes() {
        let (mut control, mut remote) = run_channel();
        control.set_total_steps(0, 0);
        control.finish();
        assert_eq!(
            drain(&mut remote),
            vec![Progress::Percent(100), Progress::Done]
        );
    }
}
