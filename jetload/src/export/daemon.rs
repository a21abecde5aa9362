//! Export listener daemon.
//!
//! Receives export datagrams, feeds them through an [`ExportDecoder`] and
//! forwards matches as [`ExportEvent`]s. What the simulation is showing is
//! learned from a [`SimSession`]:
//!
//! ```text
//!            sim_focus()
//!   ┌────────────┼─────────────────┐
//!  None        Some(false)       Some(true)
//!   │            │                 │
//!  idle     rebuild if vehicle   recv (timeout) ──► decode ──► ExportEvent
//!           changed, then idle
//! ```

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::watch::ExportDecoder;
use crate::vehicle::VehicleKind;

// =============================================================================
// Configuration
// =============================================================================

/// Default DCS-BIOS export port.
pub const DEFAULT_EXPORT_PORT: u16 = 7777;

/// Receive buffer size, large enough for any UDP datagram.
pub const RECV_BUFFER_SIZE: usize = 65_536;

/// Configuration for the export listener.
#[derive(Clone, Debug)]
pub struct ExportListenerConfig {
    /// Local address the export stream is received on.
    pub bind: SocketAddr,
    /// Receive timeout; expiry is not an error, the loop just polls again.
    pub recv_timeout: Duration,
    /// Sleep between focus polls while the simulation is not in front.
    pub idle_interval: Duration,
}

impl Default for ExportListenerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], DEFAULT_EXPORT_PORT)),
            recv_timeout: Duration::from_secs(2),
            idle_interval: Duration::from_secs(5),
        }
    }
}

impl ExportListenerConfig {
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    pub fn with_recv_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = timeout;
        self
    }

    pub fn with_idle_interval(mut self, interval: Duration) -> Self {
        self.idle_interval = interval;
        self
    }
}

// =============================================================================
// Session probe and events
// =============================================================================

/// What the host knows about the running simulation.
pub trait SimSession: Send + Sync {
    /// `Some(true)` when the simulation window has focus, `Some(false)` when it
    /// does not, `None` when focus cannot be determined.
    fn sim_focus(&self) -> Option<bool>;

    /// Vehicle type the watches should follow.
    fn active_vehicle(&self) -> VehicleKind;
}

/// A session that never changes: fixed focus and vehicle.
#[derive(Debug, Clone, Copy)]
pub struct StaticSession {
    focus: Option<bool>,
    vehicle: VehicleKind,
}

impl StaticSession {
    pub fn new(focus: Option<bool>, vehicle: VehicleKind) -> Self {
        Self { focus, vehicle }
    }

    /// Always focused.
    pub fn focused(vehicle: VehicleKind) -> Self {
        Self::new(Some(true), vehicle)
    }
}

impl SimSession for StaticSession {
    fn sim_focus(&self) -> Option<bool> {
        self.focus
    }

    fn active_vehicle(&self) -> VehicleKind {
        self.vehicle
    }
}

/// A watch match reported by the listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEvent {
    pub action: String,
    pub vehicle: VehicleKind,
}

/// Errors that stop the listener.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to bind export socket {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
}

// =============================================================================
// Listener
// =============================================================================

/// Long-running export stream listener.
pub struct ExportListener<S> {
    config: ExportListenerConfig,
    session: S,
    decoder: ExportDecoder,
    events: mpsc::UnboundedSender<ExportEvent>,
}

enum Step {
    Continue,
    Stop,
}

impl<S: SimSession> ExportListener<S> {
    pub fn new(
        config: ExportListenerConfig,
        session: S,
        events: mpsc::UnboundedSender<ExportEvent>,
    ) -> Self {
        let decoder = ExportDecoder::new(session.active_vehicle());
        Self {
            config,
            session,
            decoder,
            events,
        }
    }

    /// Run until `shutdown` is cancelled or the event receiver goes away.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<(), ExportError> {
        let socket = UdpSocket::bind(self.config.bind)
            .await
            .map_err(|source| ExportError::Bind {
                addr: self.config.bind,
                source,
            })?;
        info!(
            addr = %self.config.bind,
            vehicle = %self.decoder.vehicle(),
            "Export listener started"
        );

        let mut buf = vec![0u8; RECV_BUFFER_SIZE];
        loop {
            if shutdown.is_cancelled() {
                break;
            }

            match self.session.sim_focus() {
                None => {
                    if let Step::Stop = self.idle(&shutdown).await {
                        break;
                    }
                    continue;
                }
                Some(false) => {
                    let vehicle = self.session.active_vehicle();
                    if vehicle != self.decoder.vehicle() {
                        self.decoder.rebuild(vehicle);
                    }
                    if let Step::Stop = self.idle(&shutdown).await {
                        break;
                    }
                    continue;
                }
                Some(true) => {}
            }

            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    break;
                }

                received = tokio::time::timeout(self.config.recv_timeout, socket.recv_from(&mut buf)) => {
                    match received {
                        Err(_) => continue,
                        Ok(Err(e)) => {
                            // ICMP port-unreachable surfaces here on some platforms
                            debug!(error = %e, "Export receive failed");
                            continue;
                        }
                        Ok(Ok((len, _))) => {
                            if let Step::Stop = self.dispatch(&buf[..len]) {
                                break;
                            }
                        }
                    }
                }
            }
        }

        info!("Export listener stopped");
        Ok(())
    }

    async fn idle(&self, shutdown: &CancellationToken) -> Step {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => Step::Stop,
            _ = tokio::time::sleep(self.config.idle_interval) => Step::Continue,
        }
    }

    fn dispatch(&mut self, datagram: &[u8]) -> Step {
        let vehicle = self.decoder.vehicle();
        for action in self.decoder.process(datagram) {
            info!(action = %action, vehicle = %vehicle, "Cockpit export trigger");
            if self.events.send(ExportEvent { action, vehicle }).is_err() {
                warn!("Export event receiver dropped, stopping listener");
                return Step::Stop;
            }
        }
        Step::Continue
    }
}
