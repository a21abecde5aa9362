//! Datagram sinks for actuation lines.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::Arc;

use parking_lot::Mutex;

/// Default DCS-BIOS input port.
pub const DEFAULT_ACTUATION_PORT: u16 = 7778;

/// Destination for actuation lines.
///
/// Implementations return the number of bytes accepted; the caller compares it
/// against the line length to detect a short send.
pub trait ActuationSink: Send + Sync {
    fn send_line(&self, line: &str) -> io::Result<usize>;
}

impl<S: ActuationSink + ?Sized> ActuationSink for Arc<S> {
    fn send_line(&self, line: &str) -> io::Result<usize> {
        (**self).send_line(line)
    }
}

/// UDP sink bound to an ephemeral local port.
///
/// The socket is non-blocking so a send never parks the async task that
/// calls it; a full send buffer comes back as `WouldBlock` and counts as a
/// missed actuation.
#[derive(Debug)]
pub struct UdpSink {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpSink {
    /// Create a sink sending to `host:port`.
    pub fn connect(host: &str, port: u16) -> io::Result<Self> {
        let target = (host, port).to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no address for {}:{}", host, port),
            )
        })?;
        let bind = if target.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };
        let socket = UdpSocket::bind(bind)?;
        socket.set_nonblocking(true)?;
        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl ActuationSink for UdpSink {
    fn send_line(&self, line: &str) -> io::Result<usize> {
        self.socket.send_to(line.as_bytes(), self.target)
    }
}

/// Sink that keeps every line in memory.
///
/// Used by dry runs and tests to inspect the exact actuation stream.
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines sent so far, newline included.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Drain the recorded lines.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

impl ActuationSink for RecordingSink {
    fn send_line(&self, line: &str) -> io::Result<usize> {
        self.lines.lock().push(line.to_string());
        Ok(line.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_counts_bytes() {
        let sink = RecordingSink::new();
        assert_eq!(sink.send_line("UFC_1 1\n").unwrap(), 8);
        assert_eq!(sink.lines(), vec!["UFC_1 1\n".to_string()]);
        assert_eq!(sink.take().len(), 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_udp_sink_delivers_line() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = receiver.local_addr().unwrap().port();
        let sink = UdpSink::connect("127.0.0.1", port).unwrap();

        let sent = sink.send_line("ICP_BTN_4 1\n").unwrap();
        assert_eq!(sent, 12);

        let mut buf = [0u8; 64];
        let (n, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"ICP_BTN_4 1\n");
    }

    #[test]
    fn test_arc_sink_forwards() {
        let sink = Arc::new(RecordingSink::new());
        let shared: Arc<RecordingSink> = Arc::clone(&sink);
        shared.send_line("X 1\n").unwrap();
        assert_eq!(sink.len(), 1);
    }
}
