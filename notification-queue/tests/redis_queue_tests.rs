//! End-to-end queue behavior against a live Redis instance: enqueue dedup,
//! successful delivery, and the requeue-then-dead-letter path.
//!
//! Run with: cargo test -p notification-queue --test redis_queue_tests -- --ignored

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use notification_queue::{Channel, NotificationChannel, NotificationQueue, QueueItem, Result};
use redis::aio::ConnectionManager;
use uuid::Uuid;

async fn setup_conn() -> ConnectionManager {
    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let client = redis::Client::open(redis_url).expect("valid redis url");
    client
        .get_connection_manager()
        .await
        .expect("redis reachable for ignored integration test")
}

#[derive(Clone, Default)]
struct AlwaysFail {
    attempts: Arc<AtomicUsize>,
}

#[async_trait]
impl Channel for AlwaysFail {
    async fn send(&self, _item: &QueueItem) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(notification_queue::QueueError::ChannelSend("gateway down".to_string()))
    }
}

struct AlwaysSucceed;

#[async_trait]
impl Channel for AlwaysSucceed {
    async fn send(&self, _item: &QueueItem) -> Result<()> {
        Ok(())
    }
}

fn test_item(channel: NotificationChannel) -> QueueItem {
    QueueItem::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        Uuid::new_v4(),
        channel,
        "ops@example.org",
        "payload",
    )
}

#[tokio::test]
#[ignore]
async fn enqueue_rejects_duplicate_occurrence_user_pair() {
    let conn = setup_conn().await;
    let queue = NotificationQueue::new(
        conn,
        NotificationChannel::Email,
        AlwaysSucceed,
        Duration::from_secs(30),
    );

    let item = test_item(NotificationChannel::Email);
    let duplicate = QueueItem {
        id: Uuid::new_v4(),
        ..item.clone()
    };

    assert!(queue.enqueue(item).await.unwrap());
    assert!(!queue.enqueue(duplicate).await.unwrap());
}

#[tokio::test]
#[ignore]
async fn process_one_acks_on_successful_delivery() {
    let conn = setup_conn().await;
    let queue = NotificationQueue::new(
        conn,
        NotificationChannel::Email,
        AlwaysSucceed,
        Duration::from_secs(30),
    );

    let item = test_item(NotificationChannel::Email);
    queue.enqueue(item).await.unwrap();

    assert!(queue.process_one().await.unwrap());
    assert!(queue.list_dead_letters().await.unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn failing_item_is_dead_lettered_after_five_retries() {
    let conn = setup_conn().await;
    let channel = AlwaysFail::default();
    let queue = NotificationQueue::new(
        conn,
        NotificationChannel::Sms,
        channel.clone(),
        Duration::from_secs(30),
    );

    let item = test_item(NotificationChannel::Sms);
    queue.enqueue(item.clone()).await.unwrap();

    // Backoff table is 1, 2, 4, 8, 16s (§4.4). Each iteration sleeps past
    // the delay just scheduled, relocates the now-due item, and retries it;
    // the sixth attempt (1 initial + 5 retries) lands it in the DLQ instead
    // of scheduling a further backoff.
    let backoffs_secs = [1, 2, 4, 8, 16];
    assert!(queue.process_one().await.unwrap());
    for backoff in backoffs_secs {
        tokio::time::sleep(Duration::from_secs(backoff + 1)).await;
        assert_eq!(queue.relocate_due().await.unwrap(), 1);
        assert!(queue.process_one().await.unwrap());
    }

    let dead = queue.list_dead_letters().await.unwrap();
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].id, item.id);
    assert_eq!(dead[0].retries, 5);
    assert_eq!(channel.attempts.load(Ordering::SeqCst), 6);
}
