//! Fixed-interval refresh timer driven by the host's tick clock.

use std::time::{Duration, Instant};

use toplist_core::config::DisplayConfig;

/// Decides when a time-based refresh is due.
///
/// The first poll arms the timer; each later poll that reaches the due time
/// fires once. Missed periods are skipped rather than replayed, so a long
/// stall yields a single refresh.
#[derive(Debug, Clone)]
pub struct RefreshSchedule {
    interval: Option<Duration>,
    next_due: Option<Instant>,
}

impl RefreshSchedule {
    /// Timer firing every `interval`; `None` never fires.
    #[must_use]
    pub fn new(interval: Option<Duration>) -> Self {
        Self {
            interval: interval.filter(|i| !i.is_zero()),
            next_due: None,
        }
    }

    /// Timer from `[display]`; disabled unless `time_based_refresh` is set.
    #[must_use]
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self::new(
            config
                .time_based_refresh
                .then(|| Duration::from_secs(config.refresh_interval_seconds)),
        )
    }

    /// Whether the timer can fire at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.interval.is_some()
    }

    /// When the next refresh is due, once armed.
    #[must_use]
    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Re-arm the timer so the next refresh is one full interval after `now`.
    pub fn reset(&mut self, now: Instant) {
        self.next_due = self.interval.map(|interval| now + interval);
    }

    /// Check the timer at `now`. Returns `true` when a refresh is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(interval) = self.interval else {
            return false;
        };
        let Some(due) = self.next_due else {
            self.next_due = Some(now + interval);
            return false;
        };
        if now < due {
            return false;
        }

        let mut next = due + interval;
        while next <= now {
            next += interval;
        }
        self.next_due = Some(next);
        true
    }
}
