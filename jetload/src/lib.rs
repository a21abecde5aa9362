//! jetload - flight plan and avionics loading for DCS cockpits
//!
//! This library drives a simulated cockpit over the DCS-BIOS text protocol and
//! watches the DCS-BIOS export stream for cockpit controls that should trigger
//! a load.
//!
//! # Architecture
//!
//! ```text
//!                 ┌──────────────┐   ActuationSink   ┌─────────────────┐
//!  Profile ─────► │  Sequencer   │ ────────────────► │ DCS-BIOS :7778  │
//!  (read-only)    │  + Drivers   │   "UFC_1 1\n"     └─────────────────┘
//!                 └──────┬───────┘
//!                        │ Progress / RunCommand
//!                        ▼
//!                     caller
//!
//!  DCS-BIOS :7777 ──► ExportListener ──► ExportDecoder ──► ExportEvent ──► caller
//! ```
//!
//! The two halves never share state; each owns its own socket.

pub mod config;
pub mod coord;
pub mod export;
pub mod profile;
pub mod sequencer;
pub mod transport;
pub mod vehicle;

/// Crate version, as reported by the CLI banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
