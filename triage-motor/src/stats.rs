use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Observable state for the triage motor, mirroring the shape of
/// `death_listener::ListenerStats` for the same reasons: a `/health`
/// handler and any future operator dashboard read this without touching
/// the database.
pub struct TriageStats {
    running: AtomicBool,
    started_at: DateTime<Utc>,
    accepted: AtomicU64,
    rejected: AtomicU64,
    expired: AtomicU64,
    errors: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TriageSnapshot {
    pub running: bool,
    pub started_at: DateTime<Utc>,
    pub accepted: u64,
    pub rejected: u64,
    pub expired: u64,
    pub errors: u64,
}

impl TriageStats {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            started_at: Utc::now(),
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            expired: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn mark_stopped(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn record_materialized(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejection(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expired(&self) {
        self.expired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TriageSnapshot {
        TriageSnapshot {
            running: self.is_running(),
            started_at: self.started_at,
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

impl Default for TriageStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let stats = TriageStats::new();
        stats.record_materialized();
        stats.record_materialized();
        stats.record_rejection();
        stats.record_expired();
        stats.record_error();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.accepted, 2);
        assert_eq!(snapshot.rejected, 1);
        assert_eq!(snapshot.expired, 1);
        assert_eq!(snapshot.errors, 1);
    }

    #[test]
    fn mark_stopped_flips_running_to_false() {
        let stats = TriageStats::new();
        assert!(stats.is_running());
        stats.mark_stopped();
        assert!(!stats.is_running());
    }
}
