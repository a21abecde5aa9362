//! Integration tests for the export listener.
//!
//! These tests run the listener on a real loopback UDP socket and feed it
//! DCS-BIOS export datagrams:
//! - A watched button press raises exactly one event
//! - Repeated identical frames do not raise it again
//! - Release and press again raises a second event
//! - Watches follow a vehicle change made while the simulation is unfocused
//! - Watches are left alone while focus is unknown
//!
//! Run with: `cargo test --test export_integration`

use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use jetload::export::{
    ExportError, ExportEvent, ExportListener, ExportListenerConfig, SimSession, StaticSession,
    ENTER_PROFILE_ACTION, FRAME_MARKER,
};
use jetload::vehicle::VehicleKind;

// ============================================================================
// Helper Functions
// ============================================================================

/// ICP FLIR WX button word in the viper export map.
const VIPER_BUTTON_ADDRESS: u16 = 17450;
const VIPER_BUTTON_BIT: u16 = 0x0040;

/// Reserve a free loopback port by binding and releasing it.
fn free_port() -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.local_addr().unwrap()
}

/// One datagram with a single two-byte record, plus an unrelated record.
fn datagram(word: u16) -> Vec<u8> {
    let mut buf = FRAME_MARKER.to_vec();
    buf.extend_from_slice(&0x1000u16.to_le_bytes());
    buf.extend_from_slice(&2u16.to_le_bytes());
    buf.extend_from_slice(&0xBEEFu16.to_le_bytes());
    buf.extend_from_slice(&VIPER_BUTTON_ADDRESS.to_le_bytes());
    buf.extend_from_slice(&2u16.to_le_bytes());
    buf.extend_from_slice(&word.to_le_bytes());
    buf
}

/// Session whose focus and vehicle the test changes while the listener runs.
#[derive(Clone)]
struct SwitchableSession {
    state: Arc<Mutex<(Option<bool>, VehicleKind)>>,
}

impl SwitchableSession {
    fn new(focus: Option<bool>, vehicle: VehicleKind) -> Self {
        Self {
            state: Arc::new(Mutex::new((focus, vehicle))),
        }
    }

    fn set(&self, focus: Option<bool>, vehicle: VehicleKind) {
        *self.state.lock() = (focus, vehicle);
    }
}

impl SimSession for SwitchableSession {
    fn sim_focus(&self) -> Option<bool> {
        self.state.lock().0
    }

    fn active_vehicle(&self) -> VehicleKind {
        self.state.lock().1
    }
}

/// Long enough for the listener to go round its loop several times.
const SETTLE: Duration = Duration::from_millis(300);

struct Harness {
    addr: SocketAddr,
    sender: UdpSocket,
    events: mpsc::UnboundedReceiver<ExportEvent>,
    shutdown: CancellationToken,
    task: JoinHandle<Result<(), ExportError>>,
}

impl Harness {
    fn start(vehicle: VehicleKind) -> Self {
        Self::start_with(StaticSession::focused(vehicle))
    }

    fn start_with<S: SimSession + 'static>(session: S) -> Self {
        let addr = free_port();
        let config = ExportListenerConfig::default()
            .with_bind(addr)
            .with_recv_timeout(Duration::from_millis(50))
            .with_idle_interval(Duration::from_millis(50));
        let (tx, events) = mpsc::unbounded_channel();
        let listener = ExportListener::new(config, session, tx);
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(listener.run(shutdown.clone()));

        Self {
            addr,
            sender: UdpSocket::bind("127.0.0.1:0").unwrap(),
            events,
            shutdown,
            task,
        }
    }

    fn send(&self, word: u16) {
        self.sender.send_to(&datagram(word), self.addr).unwrap();
    }

    /// Keep sending `word` until an event arrives; the listener may not be
    /// bound yet when the first datagrams go out.
    async fn send_until_event(&mut self, word: u16) -> ExportEvent {
        for _ in 0..100 {
            self.send(word);
            if let Ok(Some(event)) =
                tokio::time::timeout(Duration::from_millis(20), self.events.recv()).await
            {
                return event;
            }
        }
        panic!("no export event received");
    }

    async fn quiet_for(&mut self, period: Duration) -> bool {
        tokio::time::timeout(period, self.events.recv()).await.is_err()
    }

    async fn stop(self) {
        self.shutdown.cancel();
        let result = tokio::time::timeout(Duration::from_secs(2), self.task)
            .await
            .expect("listener did not stop")
            .unwrap();
        assert!(result.is_ok());
    }
}

// ============================================================================
// Integration Tests
// ============================================================================

#[tokio::test]
async fn test_button_press_raises_one_event() {
    let mut harness = Harness::start(VehicleKind::Viper);

    let event = harness.send_until_event(VIPER_BUTTON_BIT).await;
    assert_eq!(event.action, ENTER_PROFILE_ACTION);
    assert_eq!(event.vehicle, VehicleKind::Viper);

    // Same state again: no change, no event
    for _ in 0..5 {
        harness.send(VIPER_BUTTON_BIT);
    }
    assert!(harness.quiet_for(Duration::from_millis(200)).await);

    harness.stop().await;
}

#[tokio::test]
async fn test_release_and_press_again() {
    let mut harness = Harness::start(VehicleKind::Viper);

    harness.send_until_event(VIPER_BUTTON_BIT).await;

    // Release: the word changes but the watch does not match
    harness.send(0);
    assert!(harness.quiet_for(Duration::from_millis(100)).await);

    // Other bits of the word do not matter
    harness.send(VIPER_BUTTON_BIT | 0x0001);
    let event = tokio::time::timeout(Duration::from_secs(1), harness.events.recv())
        .await
        .expect("second press not reported")
        .unwrap();
    assert_eq!(event.action, ENTER_PROFILE_ACTION);

    harness.stop().await;
}

#[tokio::test]
async fn test_vehicle_without_watches_is_silent() {
    let mut harness = Harness::start(VehicleKind::Hornet);

    for _ in 0..10 {
        harness.send(VIPER_BUTTON_BIT);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(harness.quiet_for(Duration::from_millis(200)).await);

    harness.stop().await;
}

#[tokio::test]
async fn test_vehicle_change_while_unfocused_rebuilds_watches() {
    let session = SwitchableSession::new(Some(true), VehicleKind::Hornet);
    let mut harness = Harness::start_with(session.clone());

    // Hornet has no watches
    for _ in 0..10 {
        harness.send(VIPER_BUTTON_BIT);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(harness.quiet_for(Duration::from_millis(200)).await);

    // Switch to the viper behind the simulation's back, then refocus
    session.set(Some(false), VehicleKind::Viper);
    tokio::time::sleep(SETTLE).await;
    session.set(Some(true), VehicleKind::Viper);

    // The fresh shadow map has not seen the pressed word yet
    let event = harness.send_until_event(VIPER_BUTTON_BIT).await;
    assert_eq!(event.action, ENTER_PROFILE_ACTION);
    assert_eq!(event.vehicle, VehicleKind::Viper);

    harness.stop().await;
}

#[tokio::test]
async fn test_vehicle_change_while_focus_unknown_keeps_watches() {
    let session = SwitchableSession::new(Some(true), VehicleKind::Hornet);
    let mut harness = Harness::start_with(session.clone());
    tokio::time::sleep(SETTLE).await;

    session.set(None, VehicleKind::Viper);
    tokio::time::sleep(SETTLE).await;
    // Focused again: no rebuild happens on the focused path either
    session.set(Some(true), VehicleKind::Viper);

    for _ in 0..10 {
        harness.send(VIPER_BUTTON_BIT);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(harness.quiet_for(Duration::from_millis(200)).await);

    harness.stop().await;
}

#[tokio::test]
async fn test_bind_conflict_is_reported() {
    let taken = UdpSocket::bind("127.0.0.1:0").unwrap();
    let addr = taken.local_addr().unwrap();

    let (tx, _rx) = mpsc::unbounded_channel();
    let listener = ExportListener::new(
        ExportListenerConfig::default().with_bind(addr),
        StaticSession::focused(VehicleKind::Viper),
        tx,
    );
    let result = listener.run(CancellationToken::new()).await;
    assert!(matches!(result, Err(ExportError::Bind { .. })));
}
