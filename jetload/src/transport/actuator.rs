//! Timed actuation on top of an [`ActuationSink`].

use std::time::Duration;

use tracing::{trace, warn};

use super::sink::ActuationSink;

/// Default release delay for ordinary presses.
pub const DEFAULT_SHORT_DELAY: Duration = Duration::from_millis(150);

/// Default delay for presses the cockpit needs more time to register.
pub const DEFAULT_MEDIUM_DELAY: Duration = Duration::from_millis(400);

/// One control event: a named press/release or a raw single-shot line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actuation {
    pub name: String,
    pub raw: bool,
}

impl Actuation {
    /// A momentary press of a named control.
    pub fn press(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw: false,
        }
    }

    /// A raw protocol line, e.g. an absolute switch position.
    pub fn raw(payload: impl Into<String>) -> Self {
        Self {
            name: payload.into(),
            raw: true,
        }
    }

    /// Lines sent for this actuation, in order.
    pub fn lines(&self) -> Vec<String> {
        if self.raw {
            vec![format!("{}\n", self.name)]
        } else {
            vec![format!("{} 1\n", self.name), format!("{} 0\n", self.name)]
        }
    }
}

/// Release and settle delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuationTiming {
    pub short: Duration,
    pub medium: Duration,
}

impl ActuationTiming {
    pub fn new(short: Duration, medium: Duration) -> Self {
        Self { short, medium }
    }

    /// No delays at all, for dry runs.
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Long delay, twice the medium delay.
    pub fn long(&self) -> Duration {
        self.medium * 2
    }
}

impl Default for ActuationTiming {
    fn default() -> Self {
        Self::new(DEFAULT_SHORT_DELAY, DEFAULT_MEDIUM_DELAY)
    }
}

/// Sends actuations through a sink with release and settle delays.
///
/// Every method reports a short send as `false` and carries on; deciding
/// whether a missed press matters is up to the caller.
#[derive(Debug)]
pub struct Actuator<S> {
    sink: S,
    timing: ActuationTiming,
}

impl<S: ActuationSink> Actuator<S> {
    pub fn new(sink: S, timing: ActuationTiming) -> Self {
        Self { sink, timing }
    }

    pub fn timing(&self) -> &ActuationTiming {
        &self.timing
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn send_line(&self, line: &str) -> bool {
        trace!(line = line.trim_end(), "actuation");
        match self.sink.send_line(line) {
            Ok(sent) if sent == line.len() => true,
            Ok(sent) => {
                warn!(line = line.trim_end(), sent, "Short actuation send");
                false
            }
            Err(e) => {
                warn!(line = line.trim_end(), error = %e, "Actuation send failed");
                false
            }
        }
    }

    /// Send one actuation.
    ///
    /// # Arguments
    ///
    /// * `actuation` - Control to drive
    /// * `release` - Delay between press and release (ignored for raw lines)
    /// * `after` - Settle delay after the actuation
    pub async fn send(&self, actuation: &Actuation, release: Duration, after: Duration) -> bool {
        let lines = actuation.lines();
        let mut ok = true;
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(release).await;
            }
            ok &= self.send_line(line);
        }
        tokio::time::sleep(after).await;
        ok
    }

    /// Press and release with the short delays.
    pub async fn press(&self, name: &str) -> bool {
        let short = self.timing.short;
        self.press_with(name, short, short).await
    }

    /// Press and release with explicit delays.
    pub async fn press_with(&self, name: &str, release: Duration, after: Duration) -> bool {
        self.send(&Actuation::press(name), release, after).await
    }

    /// Send a raw line and settle.
    pub async fn raw(&self, payload: &str, after: Duration) -> bool {
        self.send(&Actuation::raw(payload), Duration::ZERO, after)
            .await
    }

    /// Move a multi-position switch and spring it back.
    ///
    /// Sends `"<switch> <position>"`, waits `release`, then puts every switch
    /// in `rest` back to its centre position `1`.
    pub async fn rocker(&self, switch: &str, position: u8, rest: &[&str], release: Duration) -> bool {
        let mut ok = self.send_line(&format!("{} {}\n", switch, position));
        tokio::time::sleep(release).await;
        for name in rest {
            ok &= self.send_line(&format!("{} 1\n", name));
        }
        ok
    }

    /// Plain wait between actuations.
    pub async fn settle(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::RecordingSink;
    use std::io;
    use std::sync::Arc;

    struct ShortSink;

    impl ActuationSink for ShortSink {
        fn send_line(&self, line: &str) -> io::Result<usize> {
            Ok(line.len() - 1)
        }
    }

    #[test]
    fn test_actuation_lines() {
        assert_eq!(
            Actuation::press("UFC_ENT").lines(),
            vec!["UFC_ENT 1\n", "UFC_ENT 0\n"]
        );
        assert_eq!(
            Actuation::raw("RIO_CAP_CATRGORY 3").lines(),
            vec!["RIO_CAP_CATRGORY 3\n"]
        );
    }

    #[test]
    fn test_long_is_twice_medium() {
        let timing = ActuationTiming::default();
        assert_eq!(timing.long(), Duration::from_millis(800));
        assert_eq!(ActuationTiming::immediate().long(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_press_sends_pair_and_waits() {
        let sink = Arc::new(RecordingSink::new());
        let actuator = Actuator::new(Arc::clone(&sink), ActuationTiming::default());

        let start = tokio::time::Instant::now();
        assert!(actuator.press("ICP_BTN_1").await);
        assert_eq!(start.elapsed(), Duration::from_millis(300));
        assert_eq!(sink.lines(), vec!["ICP_BTN_1 1\n", "ICP_BTN_1 0\n"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rocker_returns_to_centre() {
        let sink = Arc::new(RecordingSink::new());
        let actuator = Actuator::new(Arc::clone(&sink), ActuationTiming::default());

        actuator
            .rocker(
                "ICP_DATA_UP_DN_SW",
                0,
                &["ICP_DATA_UP_DN_SW", "ICP_DATA_RTN_SEQ_SW"],
                Duration::from_millis(150),
            )
            .await;
        assert_eq!(
            sink.lines(),
            vec![
                "ICP_DATA_UP_DN_SW 0\n",
                "ICP_DATA_UP_DN_SW 1\n",
                "ICP_DATA_RTN_SEQ_SW 1\n"
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_send_reports_false() {
        let actuator = Actuator::new(ShortSink, ActuationTiming::immediate());
        assert!(!actuator.press("UFC_1").await);
        assert!(!actuator.raw("X 3", Duration::ZERO).await);
    }
}
