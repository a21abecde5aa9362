//! DCS-BIOS export stream decoding.
//!
//! The simulation broadcasts cockpit state on UDP port 7777 as a stream of
//! memory writes:
//!
//! ```text
//! ┌──────────────┬──────────┬──────────┬───────────┬──────────┬─────
//! │ 55 55 55 55  │ addr u16 │ len u16  │ len bytes │ addr u16 │ ...
//! └──────────────┴──────────┴──────────┴───────────┴──────────┴─────
//!     marker        little-endian record            (markers may repeat)
//! ```
//!
//! [`FrameReader`] walks the records of one datagram, [`ExportDecoder`]
//! tracks the watched words and reports watch matches, and
//! [`ExportListener`] runs the receive loop as a background task.
//!
//! # Example
//!
//! ```ignore
//! use jetload::export::{ExportListener, ExportListenerConfig, StaticSession};
//!
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let session = StaticSession::focused(VehicleKind::Viper);
//! let listener = ExportListener::new(ExportListenerConfig::default(), session, tx);
//!
//! let shutdown = CancellationToken::new();
//! tokio::spawn(listener.run(shutdown.clone()));
//!
//! while let Some(event) = rx.recv().await {
//!     println!("{} pressed in {}", event.action, event.vehicle);
//! }
//! ```

mod daemon;
mod frame;
mod watch;

pub use daemon::{
    ExportError, ExportEvent, ExportListener, ExportListenerConfig, SimSession, StaticSession,
    DEFAULT_EXPORT_PORT, RECV_BUFFER_SIZE,
};
pub use frame::{ExportRecord, FrameReader, FRAME_MARKER};
pub use watch::{ExportDecoder, ShadowMap, Watch, WatchSet, ENTER_PROFILE_ACTION};
