//! Rate-limited progress reporting
//!
//! A [`ProgressReporter`] belongs to a single download job. It decides when
//! the status message is due for another edit (at most once per
//! [`config::progress::UPDATE_INTERVAL_SECS`]) and renders the text.

use std::time::{Duration, Instant};

use crate::core::config;
use crate::core::utils::{format_size, format_speed};
use crate::telegram::notifications::{Notifier, StatusMessage};

/// Creates a text progress bar, e.g. `█████░░░░░` at 50%.
///
/// Partially filled slots are rounded down.
pub fn create_progress_bar(fraction: f64) -> String {
    let width = config::progress::BAR_WIDTH;
    let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
    let filled = ((fraction * width as f64).floor() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Point-in-time view of a transfer, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub file_name: String,
    pub current: u64,
    pub total: u64,
    /// Completed share in `0.0..=1.0`
    pub fraction: f64,
    pub elapsed: Duration,
    /// Bytes per second since the job started
    pub speed: f64,
    /// `None` while nothing has been transferred yet
    pub eta: Option<Duration>,
}

impl ProgressSnapshot {
    /// Renders the status message text.
    pub fn render(&self) -> String {
        let eta = match self.eta {
            Some(eta) => format!("{}s", eta.as_secs()),
            None => "unknown".to_string(),
        };

        format!(
            "📥 Downloading: {}\nProgress: {} {:.1}%\nSize: {}/{}\nSpeed: {}/s\nETA: {}",
            self.file_name,
            create_progress_bar(self.fraction),
            self.fraction * 100.0,
            format_size(self.current),
            format_size(self.total),
            format_speed(self.speed),
            eta
        )
    }
}

/// Per-job progress state.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    file_name: String,
    started_at: Instant,
    last_emit: Option<Instant>,
    interval: Duration,
}

impl ProgressReporter {
    pub fn new(file_name: impl Into<String>, started_at: Instant) -> Self {
        Self {
            file_name: file_name.into(),
            started_at,
            last_emit: None,
            interval: config::progress::update_interval(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns a snapshot if one is due at `now`, recording the emission.
    ///
    /// The first call with a known total always emits. After that, calls
    /// closer than the interval to the previous emission return `None`.
    pub fn poll(&mut self, now: Instant, current: u64, total: u64) -> Option<ProgressSnapshot> {
        if total == 0 {
            return None;
        }
        if let Some(last) = self.last_emit {
            if now.saturating_duration_since(last) < self.interval {
                return None;
            }
        }
        self.last_emit = Some(now);

        let fraction = (current as f64 / total as f64).clamp(0.0, 1.0);
        let elapsed = now.saturating_duration_since(self.started_at);
        let secs = elapsed.as_secs_f64();
        let speed = if secs > 0.0 { current as f64 / secs } else { 0.0 };
        let eta = if speed > 0.0 {
            Some(Duration::from_secs_f64(total.saturating_sub(current) as f64 / speed))
        } else {
            None
        };

        Some(ProgressSnapshot {
            file_name: self.file_name.clone(),
            current,
            total,
            fraction,
            elapsed,
            speed,
            eta,
        })
    }

    /// Edits the status message if an update is due.
    ///
    /// Edit failures are logged and swallowed; a missed progress update
    /// never aborts the download.
    pub async fn report(&mut self, notifier: &dyn Notifier, status: StatusMessage, current: u64, total: u64) {
        let Some(snapshot) = self.poll(Instant::now(), current, total) else {
            return;
        };

        if let Err(e) = notifier.edit(status, &snapshot.render()).await {
            log::warn!("Failed to update progress for {}: {}", self.file_name, e);
        }
    }
}
