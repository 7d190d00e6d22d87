use async_trait::async_trait;

use crate::error::Result;
use crate::models::QueueItem;

/// A delivery mechanism a [`crate::queue::NotificationQueue`] drives.
/// `email-service` and `sms-service` each provide one implementation;
/// neither the queue nor the worker know anything about SMTP or SMS
/// gateways, only that `send` either succeeds or fails.
#[async_trait]
pub trait Channel: Send + Sync {
    async fn send(&self, item: &QueueItem) -> Result<()>;
}
