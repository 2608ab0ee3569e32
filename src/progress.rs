//! Progress reporting for concurrent fetches
//!
//! Fetchers announce how many units they submitted and tick once per
//! completed unit. Where that goes (log lines, a terminal bar, nowhere) is
//! decided by the caller through the [`ProgressSink`] it injects.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};

/// Receiver of progress events from a fetcher
pub trait ProgressSink: Send + Sync {
    /// A run of `total` units has been submitted
    fn start(&self, label: &str, total: u64);

    /// One unit completed
    fn advance(&self);

    /// The run is over (all units examined, or stopped early)
    fn finish(&self);
}

/// Discards all progress events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn start(&self, _label: &str, _total: u64) {}
    fn advance(&self) {}
    fn finish(&self) {}
}

/// Logs progress through `tracing`
#[derive(Debug, Default)]
pub struct TracingProgress {
    total: AtomicU64,
    done: AtomicU64,
}

impl TracingProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressSink for TracingProgress {
    fn start(&self, label: &str, total: u64) {
        self.total.store(total, Ordering::Relaxed);
        self.done.store(0, Ordering::Relaxed);
        tracing::info!("{}: {} units submitted", label, total);
    }

    fn advance(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(
            "Progress: {}/{} units completed",
            done,
            self.total.load(Ordering::Relaxed)
        );
    }

    fn finish(&self) {
        tracing::info!(
            "Finished: {}/{} units completed",
            self.done.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed)
        );
    }
}

/// Terminal progress bar
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::hidden();
        if let Ok(style) =
            ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} ({elapsed})")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        Self { bar }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for BarProgress {
    fn start(&self, label: &str, total: u64) {
        self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        self.bar.reset();
        self.bar.set_length(total);
        self.bar.set_message(label.to_string());
    }

    fn advance(&self) {
        self.bar.inc(1);
    }

    fn finish(&self) {
        self.bar.finish();
    }
}
