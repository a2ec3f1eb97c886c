//! Throttled progress reporting against a chat status message.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::{SinkError, human_size};

/// A boxed future returned by sink methods.
pub type SinkFuture<'a> = Pin<Box<dyn Future<Output = Result<(), SinkError>> + Send + 'a>>;

/// A display surface showing the current status of one transfer.
///
/// The chat layer implements this by editing the request's status message.
/// Updates are last-value-wins: each call replaces whatever was displayed
/// before, so bursty or out-of-order calls can only overwrite state, never
/// corrupt it.
pub trait StatusSink: Send + Sync {
    /// Replaces the displayed status text.
    fn update(&self, text: String) -> SinkFuture<'_>;

    /// Replaces the displayed status with a terminal message carrying a
    /// download link the user can act on.
    ///
    /// The default just shows the text; chat implementations attach their
    /// own affordance (e.g. an inline button).
    fn present_link(&self, text: String, link: String) -> SinkFuture<'_> {
        let _ = link;
        self.update(text)
    }
}

/// A point-in-time measurement of one transfer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSample {
    /// Bytes moved so far.
    pub bytes_done: u64,
    /// Total bytes expected (0 when unknown).
    pub bytes_total: u64,
    /// Time since the transfer started.
    pub elapsed: Duration,
}

impl ProgressSample {
    /// Completion percentage in `0.0..=100.0` (0 when the total is unknown).
    pub fn percent(&self) -> f64 {
        if self.bytes_total == 0 {
            return 0.0;
        }
        (self.bytes_done as f64 * 100.0 / self.bytes_total as f64).min(100.0)
    }

    /// Average transfer speed in bytes per second.
    ///
    /// The elapsed time is floored at one second so a sample taken right
    /// after the start cannot divide by zero.
    pub fn bytes_per_second(&self) -> f64 {
        self.bytes_done as f64 / self.elapsed.as_secs_f64().max(1.0)
    }

    /// Estimated seconds until completion (0 when the speed is zero).
    pub fn eta_seconds(&self) -> u64 {
        let speed = self.bytes_per_second();
        if speed <= 0.0 {
            return 0;
        }
        let remaining = self.bytes_total.saturating_sub(self.bytes_done) as f64;
        (remaining / speed) as u64
    }
}

/// Renders a fixed ten-segment progress bar for the given percentage.
pub fn render_bar(percent: f64) -> String {
    let filled = ((percent / 10.0) as usize).min(10);
    format!("⫷{}{}⫸", "●".repeat(filled), "○".repeat(10 - filled))
}

fn render_status(name: &str, headline: &str, sample: &ProgressSample) -> String {
    format!(
        "*📂 File:* `{name}`\n\
         *📦 Size:* `{total}`\n\n\
         *{headline}*\n\
         {bar} `{percent:.2}%`\n\
         *⚡ Speed:* `{speed}/s`\n\
         *⏱️ ETA:* `{eta}s`",
        total = human_size(sample.bytes_total),
        bar = render_bar(sample.percent()),
        percent = sample.percent(),
        speed = human_size(sample.bytes_per_second() as u64),
        eta = sample.eta_seconds(),
    )
}

/// Pushes rendered progress for one transfer to a [`StatusSink`].
///
/// Reporting is best-effort twice over: updates closer together than the
/// configured interval are dropped (chat transports rate-limit message
/// edits), and sink failures are logged at debug and discarded.
pub struct ProgressReporter<'a> {
    sink: &'a dyn StatusSink,
    name: String,
    headline: String,
    bytes_total: u64,
    started: Instant,
    min_interval: Duration,
    last_update: Mutex<Option<Instant>>,
}

impl<'a> ProgressReporter<'a> {
    /// Creates a reporter for a transfer of `bytes_total` bytes.
    ///
    /// `headline` names the phase shown above the bar (e.g.
    /// "⬇️ Downloading...").
    pub fn new(
        sink: &'a dyn StatusSink,
        name: impl Into<String>,
        headline: impl Into<String>,
        bytes_total: u64,
        min_interval: Duration,
    ) -> Self {
        Self {
            sink,
            name: name.into(),
            headline: headline.into(),
            bytes_total,
            started: Instant::now(),
            min_interval,
            last_update: Mutex::new(None),
        }
    }

    /// Reports that `bytes_done` bytes have been moved so far.
    ///
    /// Never fails: a throttled call is a no-op, and a failed display
    /// update is logged and dropped.
    pub async fn report(&self, bytes_done: u64) {
        if !self.due() {
            return;
        }

        let sample = ProgressSample {
            // The advertised total can undershoot; keep done <= total.
            bytes_done: if self.bytes_total > 0 {
                bytes_done.min(self.bytes_total)
            } else {
                bytes_done
            },
            bytes_total: self.bytes_total,
            elapsed: self.started.elapsed(),
        };

        let text = render_status(&self.name, &self.headline, &sample);
        if let Err(e) = self.sink.update(text).await {
            debug!(file = %self.name, error = %e, "progress update dropped");
        }
    }

    /// Claims an update slot, enforcing the minimum interval between edits.
    fn due(&self) -> bool {
        let mut last = match self.last_update.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = Instant::now();
        match *last {
            Some(at) if now.duration_since(at) < self.min_interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct RecordingSink {
        texts: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingSink {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                texts: Mutex::new(Vec::new()),
                fail,
            })
        }

        fn texts(&self) -> Vec<String> {
            self.texts.lock().unwrap().clone()
        }
    }

    impl StatusSink for RecordingSink {
        fn update(&self, text: String) -> SinkFuture<'_> {
            Box::pin(async move {
                if self.fail {
                    return Err(SinkError("rate limited".into()));
                }
                self.texts.lock().unwrap().push(text);
                Ok(())
            })
        }
    }

    #[test]
    fn percent_of_zero_total_is_zero() {
        let sample = ProgressSample {
            bytes_done: 500,
            bytes_total: 0,
            elapsed: Duration::ZERO,
        };
        assert_eq!(sample.percent(), 0.0);
        assert_eq!(sample.eta_seconds(), 0);
    }

    #[test]
    fn speed_floors_elapsed_at_one_second() {
        let sample = ProgressSample {
            bytes_done: 4096,
            bytes_total: 8192,
            elapsed: Duration::from_millis(10),
        };
        // 10 ms elapsed must not inflate the speed.
        assert_eq!(sample.bytes_per_second(), 4096.0);
    }

    #[test]
    fn eta_from_speed_and_remaining() {
        let sample = ProgressSample {
            bytes_done: 1024,
            bytes_total: 3072,
            elapsed: Duration::from_secs(2),
        };
        // 512 B/s with 2048 bytes remaining.
        assert_eq!(sample.eta_seconds(), 4);
    }

    #[test]
    fn eta_zero_when_nothing_moved() {
        let sample = ProgressSample {
            bytes_done: 0,
            bytes_total: 1024,
            elapsed: Duration::from_secs(5),
        };
        assert_eq!(sample.eta_seconds(), 0);
    }

    #[test]
    fn bar_fill_boundaries() {
        assert_eq!(render_bar(0.0), "⫷○○○○○○○○○○⫸");
        assert_eq!(render_bar(9.9), "⫷○○○○○○○○○○⫸");
        assert_eq!(render_bar(10.0), "⫷●○○○○○○○○○⫸");
        assert_eq!(render_bar(35.0), "⫷●●●○○○○○○○⫸");
        assert_eq!(render_bar(100.0), "⫷●●●●●●●●●●⫸");
        assert_eq!(render_bar(250.0), "⫷●●●●●●●●●●⫸");
    }

    #[tokio::test]
    async fn reports_render_to_sink() {
        let sink = RecordingSink::new(false);
        let reporter =
            ProgressReporter::new(sink.as_ref(), "demo.bin", "⬇️ Downloading...", 2048, Duration::ZERO);

        reporter.report(1024).await;

        let texts = sink.texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("demo.bin"));
        assert!(texts[0].contains("50.00%"));
        assert!(texts[0].contains("⬇️ Downloading..."));
    }

    #[tokio::test]
    async fn last_value_wins() {
        let sink = RecordingSink::new(false);
        let reporter =
            ProgressReporter::new(sink.as_ref(), "demo.bin", "⬇️ Downloading...", 1000, Duration::ZERO);

        reporter.report(100).await;
        reporter.report(900).await;

        let texts = sink.texts();
        assert!(texts.last().unwrap().contains("90.00%"));
    }

    #[tokio::test]
    async fn throttles_bursty_updates() {
        let sink = RecordingSink::new(false);
        let reporter = ProgressReporter::new(
            sink.as_ref(),
            "demo.bin",
            "⬇️ Downloading...",
            1000,
            Duration::from_secs(3600),
        );

        for done in [100, 200, 300, 400] {
            reporter.report(done).await;
        }

        // Only the first call inside the interval lands.
        assert_eq!(sink.texts().len(), 1);
    }

    #[tokio::test]
    async fn sink_failures_are_swallowed() {
        let sink = RecordingSink::new(true);
        let reporter =
            ProgressReporter::new(sink.as_ref(), "demo.bin", "⬇️ Downloading...", 1000, Duration::ZERO);

        // Must not panic or propagate.
        reporter.report(500).await;
        reporter.report(1000).await;
    }

    #[tokio::test]
    async fn done_clamped_to_total() {
        let sink = RecordingSink::new(false);
        let reporter =
            ProgressReporter::new(sink.as_ref(), "demo.bin", "⬇️ Downloading...", 1000, Duration::ZERO);

        reporter.report(4000).await;

        assert!(sink.texts()[0].contains("100.00%"));
    }
}
