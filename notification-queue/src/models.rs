use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery channel a [`QueueItem`] travels on. Distinct `NotificationQueue`
/// instances exist per channel (§4.4: "independent instances"), but the type
/// also tags each item so dedup keys stay channel-scoped even if a future
/// caller shares one Redis database across both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    Email,
    Sms,
}

impl NotificationChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationChannel::Email => "email",
            NotificationChannel::Sms => "sms",
        }
    }
}

impl std::fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single notification awaiting delivery. Lives entirely in the KV store
/// (§3: "owned by the KV store") — never persisted to the primary database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub occurrence_id: Uuid,
    pub user_id: Uuid,
    pub channel: NotificationChannel,
    pub recipient: String,
    pub payload: String,
    pub retries: u32,
    pub created_at: DateTime<Utc>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub next_retry_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Display content shared by both channels' templates (§4.4: "hospital,
/// sector, death time, time-remaining, occurrence id, priority, dashboard
/// URL"). Carried as the JSON-encoded [`QueueItem::payload`] rather than as
/// typed fields on `QueueItem` itself, since the queue crate has no
/// business knowing the shape of what it delivers. Time-remaining is
/// derived from `window_expires_at` at render time rather than stored, so
/// a notification retried an hour later still shows an accurate countdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub occurrence_id: Uuid,
    pub hospital_name: String,
    pub sector: Option<String>,
    pub age_years: i32,
    pub death_at: DateTime<Utc>,
    pub window_expires_at: DateTime<Utc>,
    pub priority_score: i32,
    pub dashboard_url: String,
}

impl NotificationPayload {
    /// Minutes left until the donation window closes, floored at zero once
    /// it has already expired (the sweeper cancels the occurrence shortly
    /// after; a notification can still be in flight in that gap).
    pub fn minutes_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.window_expires_at - now).num_minutes().max(0)
    }

    /// Whole hours left until the donation window closes, floored at zero.
    pub fn hours_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.window_expires_at - now).num_hours().max(0)
    }
}

impl QueueItem {
    pub fn new(
        tenant_id: Uuid,
        occurrence_id: Uuid,
        user_id: Uuid,
        channel: NotificationChannel,
        recipient: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            occurrence_id,
            user_id,
            channel,
            recipient: recipient.into(),
            payload: payload.into(),
            retries: 0,
            created_at: Utc::now(),
            last_attempt_at: None,
            next_retry_at: None,
            last_error: None,
        }
    }

    /// Key used for at-most-one-per-channel deduplication (§4.4). The
    /// channel itself is never part of the key: each channel keeps its own
    /// Redis keyspace, so the pair alone is enough to scope it.
    pub fn dedup_key(occurrence_id: Uuid, user_id: Uuid) -> String {
        format!("{occurrence_id}:{user_id}")
    }
}
