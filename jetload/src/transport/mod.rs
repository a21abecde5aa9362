//! Actuation transport.
//!
//! Cockpit controls are driven by sending DCS-BIOS text lines to the
//! simulation's input port (7778 by default):
//!
//! ```text
//! press/release:  "UFC_1 1\n"  ...release delay...  "UFC_1 0\n"  ...settle...
//! raw:            "ICP_DED_SW 2\n"                                ...settle...
//! ```
//!
//! [`ActuationSink`] is the byte-level seam (a UDP socket in production, a
//! recording buffer in tests and dry runs). [`Actuator`] layers the timing
//! rules on top.

mod actuator;
mod sink;

pub use actuator::{
    Actuation, ActuationTiming, Actuator, DEFAULT_MEDIUM_DELAY, DEFAULT_SHORT_DELAY,
};
pub use sink::{ActuationSink, RecordingSink, UdpSink, DEFAULT_ACTUATION_PORT};
