//! Progress reporting for a running evaluation.
//!
//! The evaluator publishes its processed-row count through [`ProgressState`];
//! a [`ProgressReporter`] on another thread samples it and redraws a single
//! status line. The reporter only reads the counter, so removing it never
//! changes the counts.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// How often the progress line is redrawn.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(1);

/// How long the reporter sleeps between checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Poll interval used when the configured one works out to zero.
pub const MINIMUM_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Progress display settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressConfig {
    /// Whether a reporter runs at all.
    pub enabled: bool,
    /// Minimum time between two redraws.
    pub update_interval: Duration,
    /// Sleep between checks of the counter and completion flag.
    pub poll_interval: Duration,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            update_interval: DEFAULT_UPDATE_INTERVAL,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ProgressConfig {
    /// No progress output.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// The poll interval actually used: never longer than the update interval
    /// and never zero.
    pub fn effective_poll_interval(&self) -> Duration {
        let interval = self.poll_interval.min(self.update_interval);
        if interval.is_zero() {
            MINIMUM_POLL_INTERVAL
        } else {
            interval
        }
    }
}

/// State shared between the evaluator and the reporter.
#[derive(Debug, Default)]
pub struct ProgressState {
    processed: AtomicU64,
    complete: AtomicBool,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the number of rows processed so far.
    pub fn record(&self, rows: u64) {
        self.processed.store(rows, Ordering::Relaxed);
    }

    /// Latest published row count.
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Signal that the evaluator is done. Everything it wrote before is
    /// visible to a thread that then observes [`ProgressState::is_complete`].
    pub fn finish(&self) {
        self.complete.store(true, Ordering::Release);
    }

    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }
}

/// Marks a [`ProgressState`] complete when dropped, including on panic.
pub struct CompletionGuard<'a> {
    state: &'a ProgressState,
}

impl<'a> CompletionGuard<'a> {
    pub fn new(state: &'a ProgressState) -> Self {
        Self { state }
    }
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        self.state.finish();
    }
}

/// Renders `Processed N rows...` on a single, rewritten line.
pub struct ProgressReporter<W: Write> {
    writer: W,
    config: ProgressConfig,
    last_displayed: u64,
    max_width: usize,
    displayed: bool,
}

impl<W: Write> ProgressReporter<W> {
    pub fn new(writer: W, config: ProgressConfig) -> Self {
        Self {
            writer,
            config,
            last_displayed: 0,
            max_width: 0,
            displayed: false,
        }
    }

    /// Sample `state` until it is complete, then draw the final count.
    pub fn watch(&mut self, state: &ProgressState) -> io::Result<()> {
        let poll_interval = self.config.effective_poll_interval();
        let mut next_display = Instant::now() + self.config.update_interval;

        while !state.is_complete() {
            let now = Instant::now();
            if now >= next_display {
                self.render_if_changed(state.processed())?;
                next_display = now + self.config.update_interval;
            }
            thread::sleep(poll_interval);
        }

        self.finish(state.processed())
    }

    /// Draw the last count if it was never shown and end the line.
    pub fn finish(&mut self, rows: u64) -> io::Result<()> {
        self.render_if_changed(rows)?;
        if self.displayed {
            writeln!(self.writer)?;
            self.writer.flush()?;
        }
        Ok(())
    }

    fn render_if_changed(&mut self, rows: u64) -> io::Result<()> {
        if rows == 0 || rows == self.last_displayed {
            return Ok(());
        }

        let message = format!("Processed {} rows...", rows);
        self.max_width = self.max_width.max(message.len());
        write!(self.writer, "\r{:<width$}", message, width = self.max_width)?;
        self.writer.flush()?;

        self.last_displayed = rows;
        self.displayed = true;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
