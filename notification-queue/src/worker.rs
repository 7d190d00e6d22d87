use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::channel::Channel;
use crate::error::Result;
use crate::queue::NotificationQueue;

/// Drives one channel's [`NotificationQueue`] to completion: relocate any
/// delayed items whose backoff has elapsed, then process one ready item,
/// repeating on `poll_interval` when the ready list is empty. §4.4 calls
/// for a single-threaded worker per channel, so this holds no internal
/// concurrency of its own — callers wanting more throughput run more
/// channel instances, not more workers per instance.
pub struct NotificationWorker<C: Channel> {
    queue: NotificationQueue<C>,
    poll_interval: Duration,
}

impl<C: Channel> NotificationWorker<C> {
    pub fn new(queue: NotificationQueue<C>, poll_interval: Duration) -> Self {
        Self { queue, poll_interval }
    }

    /// Runs until `shutdown` is cancelled. Errors surfaced by a single
    /// item's processing don't stop the loop — they've already been
    /// recorded against that item by [`NotificationQueue::process_one`]
    /// (ack on success, requeue-or-DLQ on failure); only a KV-store-level
    /// error escapes here.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        loop {
            if shutdown.is_cancelled() {
                return Ok(());
            }

            self.queue.relocate_due().await?;

            if !self.queue.process_one().await? {
                tokio::select! {
                    _ = tokio::time::sleep(self.poll_interval) => {}
                    _ = shutdown.cancelled() => return Ok(()),
                }
            }
        }
    }
}
