//! Sequencing engine.
//!
//! Turns a [`Profile`](crate::profile::Profile) into the timed actuation
//! stream for its vehicle. A run moves through a fixed set of states:
//!
//! ```text
//! Idle ──► Validating ──► Sequencing(waypoints) ──► Sequencing(config) ──► Done
//!                               │                        │
//!                               └──── cancel ────────────┴──► Cancelled
//!                               └──── internal error ────┴──► Failed
//! ```
//!
//! Cancellation is only observed at step boundaries ([`RunControl::advance`]);
//! whatever the cockpit shows at that point stays as it is.
//!
//! # Example
//!
//! ```ignore
//! use jetload::sequencer::{Driver, DriverOptions, Sequencer};
//! use jetload::transport::{Actuator, ActuationTiming, UdpSink};
//!
//! let sink = UdpSink::connect("127.0.0.1", 7778)?;
//! let driver = Driver::new(Actuator::new(sink, ActuationTiming::default()), DriverOptions::default());
//! let sequencer = Sequencer::new(driver);
//!
//! let mut run = sequencer.start(profile)?;
//! while let Some(progress) = run.progress().await {
//!     println!("{:?}", progress);
//! }
//! let outcome = run.join().await;
//! ```

mod capacity;
mod control;
mod driver;
mod drivers;
mod engine;

pub use capacity::CapacityTable;
pub use control::{run_channel, Progress, RunCommand, RunControl, RunRemote};
pub use driver::{entry_formats, Driver, DriverOptions, DEFAULT_DGFT_CYCLE_CONTROL};
pub use engine::{RunHandle, Sequencer, SequencerError};

use thiserror::Error;

use crate::coord::CoordError;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Cancelled,
    Failed(String),
}

/// Conditions that unwind a run before its last step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Internal(String),
}

impl From<CoordError> for SequenceError {
    fn from(e: CoordError) -> Self {
        SequenceError::Internal(e.to_string())
    }
}
