use std::time::Duration;

use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use uuid::Uuid;

use crate::channel::Channel;
use crate::error::{QueueError, Result};
use crate::models::{NotificationChannel, QueueItem};

/// Maximum number of requeue-with-backoff cycles before an item is
/// dead-lettered. §4.4 states both "max retries 5" and a five-entry backoff
/// table (1, 2, 4, 8, 16s) — taken together the fifth backoff must still
/// fire before the item is dropped, so the check is `retries < MAX_RETRIES`
/// evaluated before incrementing, not after.
const MAX_RETRIES: u32 = 5;

fn backoff_secs(retries: u32) -> i64 {
    2i64.saturating_pow(retries)
}

/// Ready/in-flight/dead-letter queue for one channel, backed entirely by
/// Redis (§3: notification queue items are "owned by the KV store"). Each
/// channel (email, SMS) gets its own instance with its own keyspace, so a
/// stuck SMS gateway never backs up email delivery.
pub struct NotificationQueue<C: Channel> {
    conn: ConnectionManager,
    channel_kind: NotificationChannel,
    channel_impl: C,
    visibility_timeout: Duration,
}

impl<C: Channel> NotificationQueue<C> {
    pub fn new(conn: ConnectionManager, channel_kind: NotificationChannel, channel_impl: C, visibility_timeout: Duration) -> Self {
        Self { conn, channel_kind, channel_impl, visibility_timeout }
    }

    fn ready_key(&self) -> String {
        format!("notifications:{}:ready", self.channel_kind)
    }

    fn items_key(&self) -> String {
        format!("notifications:{}:items", self.channel_kind)
    }

    fn inflight_key(&self) -> String {
        format!("notifications:{}:inflight", self.channel_kind)
    }

    fn delayed_key(&self) -> String {
        format!("notifications:{}:delayed", self.channel_kind)
    }

    fn dedup_key(&self) -> String {
        format!("notifications:{}:dedup", self.channel_kind)
    }

    fn dlq_key(&self) -> String {
        format!("notifications:{}:dlq", self.channel_kind)
    }

    /// Enqueues `item`, returning `false` without side effects if an item
    /// for the same `(occurrence_id, user_id)` pair was already enqueued on
    /// this channel (§4.4: "at most one notification per
    /// (occurrence, user, channel)").
    pub async fn enqueue(&self, item: QueueItem) -> Result<bool> {
        let mut conn = self.conn.clone();
        let dedup_key = QueueItem::dedup_key(item.occurrence_id, item.user_id);
        let added: bool = conn.sadd(self.dedup_key(), &dedup_key).await?;
        if !added {
            return Ok(false);
        }

        let payload = serde_json::to_string(&item)?;
        let id = item.id.to_string();
        let _: () = conn.hset(self.items_key(), &id, &payload).await?;
        let _: () = conn.lpush(self.ready_key(), &id).await?;
        Ok(true)
    }

    /// Pops the oldest ready item and moves it into the in-flight set with
    /// a visibility deadline. Returns `None` if the ready list is empty.
    pub async fn dequeue(&self) -> Result<Option<QueueItem>> {
        let mut conn = self.conn.clone();
        let id: Option<String> = conn.rpop(self.ready_key(), None).await?;
        let Some(id) = id else { return Ok(None) };

        let deadline = Utc::now() + chrono::Duration::from_std(self.visibility_timeout).unwrap_or(chrono::Duration::seconds(30));
        let _: () = conn.hset(self.inflight_key(), &id, deadline.timestamp()).await?;

        let payload: Option<String> = conn.hget(self.items_key(), &id).await?;
        let Some(payload) = payload else {
            return Err(QueueError::MissingItem(id));
        };
        Ok(Some(serde_json::from_str(&payload)?))
    }

    /// Marks `item_id` delivered: drops it from in-flight and item storage.
    /// Dedup membership is left in place so a retried send after the fact
    /// can never recreate the same notification.
    async fn ack(&self, item_id: Uuid) -> Result<()> {
        let mut conn = self.conn.clone();
        let id = item_id.to_string();
        let _: () = conn.hdel(self.inflight_key(), &id).await?;
        let _: () = conn.hdel(self.items_key(), &id).await?;
        Ok(())
    }

    /// Requeues `item` after a backoff delay, or dead-letters it once
    /// `MAX_RETRIES` requeue cycles have been spent.
    async fn fail(&self, mut item: QueueItem, error: String) -> Result<()> {
        let mut conn = self.conn.clone();
        let id = item.id.to_string();
        let _: () = conn.hdel(self.inflight_key(), &id).await?;
        item.last_attempt_at = Some(Utc::now());
        item.last_error = Some(error);

        if item.retries < MAX_RETRIES {
            let delay = backoff_secs(item.retries);
            item.retries += 1;
            item.next_retry_at = Some(Utc::now() + chrono::Duration::seconds(delay));
            let payload = serde_json::to_string(&item)?;
            let _: () = conn.hset(self.items_key(), &id, &payload).await?;
            let score = item.next_retry_at.map(|t| t.timestamp()).unwrap_or_default();
            let _: () = conn.zadd(self.delayed_key(), &id, score).await?;
        } else {
            let payload = serde_json::to_string(&item)?;
            let _: () = conn.hset(self.dlq_key(), &id, &payload).await?;
            let _: () = conn.hdel(self.items_key(), &id).await?;
            tracing::warn!(item_id = %item.id, channel = %self.channel_kind, "notification dead-lettered after max retries");
        }
        Ok(())
    }

    /// Moves delayed items whose `next_retry_at` has passed back onto the
    /// ready list. Meant to be ticked on its own short interval by the
    /// worker loop, separate from the dequeue/process cycle.
    pub async fn relocate_due(&self) -> Result<usize> {
        let mut conn = self.conn.clone();
        let now = Utc::now().timestamp();
        let due: Vec<String> = conn.zrangebyscore(self.delayed_key(), i64::MIN, now).await?;
        for id in &due {
            let _: () = conn.zrem(self.delayed_key(), id).await?;
            let _: () = conn.lpush(self.ready_key(), id).await?;
        }
        Ok(due.len())
    }

    /// Dequeues and processes a single item. Returns `true` if an item was
    /// found (whether delivery succeeded or failed), `false` if the ready
    /// list was empty.
    pub async fn process_one(&self) -> Result<bool> {
        let Some(item) = self.dequeue().await? else {
            return Ok(false);
        };
        let item_id = item.id;
        match self.channel_impl.send(&item).await {
            Ok(()) => self.ack(item_id).await?,
            Err(e) => self.fail(item, e.to_string()).await?,
        }
        Ok(true)
    }

    /// All items currently dead-lettered on this channel (§9: dead-letter
    /// visibility, accessor only — no handler here).
    pub async fn list_dead_letters(&self) -> Result<Vec<QueueItem>> {
        let mut conn = self.conn.clone();
        let raw: Vec<String> = conn.hvals(self.dlq_key()).await?;
        raw.iter().map(|p| serde_json::from_str(p).map_err(QueueError::from)).collect()
    }
}
