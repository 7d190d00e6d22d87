use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use serde::Serialize;

/// Observable state for the listener (§4.1: "running/stopped, last-poll
/// timestamp, obitos-detected-today counter, total processed, error
/// counter, start timestamp"). Shared via `Arc` with whatever reports it
/// (a `/health` handler, `health-monitor`'s internal probe).
pub struct ListenerStats {
    running: AtomicBool,
    started_at: DateTime<Utc>,
    last_poll_at: RwLock<Option<DateTime<Utc>>>,
    detected_today: AtomicU64,
    detected_today_date: RwLock<NaiveDate>,
    total_processed: AtomicU64,
    errors: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListenerSnapshot {
    pub running: bool,
    pub started_at: DateTime<Utc>,
    pub last_poll_at: Option<DateTime<Utc>>,
    pub detected_today: u64,
    pub total_processed: u64,
    pub errors: u64,
}

impl ListenerStats {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            running: AtomicBool::new(true),
            started_at: now,
            last_poll_at: RwLock::new(None),
            detected_today: AtomicU64::new(0),
            detected_today_date: RwLock::new(now.date_naive()),
            total_processed: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn mark_stopped(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn record_poll(&self, at: DateTime<Utc>) {
        *self.last_poll_at.write() = Some(at);
    }

    /// Rolls `detected_today` over to zero the first time a detection is
    /// recorded on a new UTC calendar day.
    pub fn record_detection(&self, at: DateTime<Utc>) {
        let today = at.date_naive();
        let mut date = self.detected_today_date.write();
        if *date != today {
            *date = today;
            self.detected_today.store(0, Ordering::Relaxed);
        }
        drop(date);
        self.detected_today.fetch_add(1, Ordering::Relaxed);
        self.total_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ListenerSnapshot {
        ListenerSnapshot {
            running: self.is_running(),
            started_at: self.started_at,
            last_poll_at: *self.last_poll_at.read(),
            detected_today: self.detected_today.load(Ordering::Relaxed),
            total_processed: self.total_processed.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

impl Default for ListenerStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn detections_accumulate_within_the_same_day() {
        let stats = ListenerStats::new();
        let now = Utc::now();
        stats.record_detection(now);
        stats.record_detection(now + Duration::seconds(1));
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.detected_today, 2);
        assert_eq!(snapshot.total_processed, 2);
    }

    #[test]
    fn detected_today_resets_on_a_new_calendar_day_but_total_keeps_accumulating() {
        let stats = ListenerStats::new();
        let day_one = Utc::now();
        stats.record_detection(day_one);
        let day_two = day_one + Duration::days(1);
        stats.record_detection(day_two);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.detected_today, 1);
        assert_eq!(snapshot.total_processed, 2);
    }

    #[test]
    fn mark_stopped_flips_running_to_false() {
        let stats = ListenerStats::new();
        assert!(stats.is_running());
        stats.mark_stopped();
        assert!(!stats.is_running());
    }
}
