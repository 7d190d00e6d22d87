use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use database_layer::models::UserRole;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::event::SseEvent;

const DEFAULT_BUFFER: usize = 64;

/// A live dashboard connection registered with the hub. Dropped (and its
/// sender closed) when the client disconnects.
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role: UserRole,
    pub hospital_filter: Option<Uuid>,
    tx: mpsc::Sender<SseEvent>,
}

/// Process-local pub/sub scoped by tenant (§5: "Process-local pub/sub scoped
/// by tenant"). Subscribers register a bounded channel; `publish` never
/// blocks on a slow reader, it evicts them instead and counts the eviction.
#[derive(Clone)]
pub struct SseHub {
    subscriptions: Arc<DashMap<Uuid, Vec<Subscription>>>,
    evictions: Arc<AtomicU64>,
}

impl Default for SseHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SseHub {
    pub fn new() -> Self {
        Self { subscriptions: Arc::new(DashMap::new()), evictions: Arc::new(AtomicU64::new(0)) }
    }

    pub fn eviction_count(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Registers a subscriber and returns the receiving half of its channel.
    /// The caller drives the SSE response body from this receiver; dropping
    /// it (connection closed) lets the next `publish` notice the send fails
    /// and prune the entry.
    pub fn subscribe(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
        role: UserRole,
        hospital_filter: Option<Uuid>,
    ) -> (Uuid, mpsc::Receiver<SseEvent>) {
        let (tx, rx) = mpsc::channel(DEFAULT_BUFFER);
        let id = Uuid::new_v4();
        let subscription = Subscription { id, user_id, tenant_id, role, hospital_filter, tx };
        self.subscriptions.entry(tenant_id).or_default().push(subscription);
        (id, rx)
    }

    pub fn unsubscribe(&self, tenant_id: Uuid, subscription_id: Uuid) {
        if let Some(mut subs) = self.subscriptions.get_mut(&tenant_id) {
            subs.retain(|s| s.id != subscription_id);
        }
    }

    /// Fans `event` out to every subscriber whose tenant and hospital filter
    /// match. A tenant-scoped event only visits that tenant's subscribers;
    /// an engine-wide event (`SystemStatusChange`, whose `tenant_id()` is
    /// `None`) visits every tenant. Never awaits a subscriber: a full buffer
    /// or a closed channel both result in the subscriber being dropped from
    /// the registry rather than the publisher blocking (§5: "the hub
    /// records the eviction but never blocks the publisher").
    pub fn publish(&self, event: SseEvent) {
        match event.tenant_id() {
            Some(tenant_id) => {
                if let Some(mut subs) = self.subscriptions.get_mut(&tenant_id) {
                    Self::fan_out(&self.evictions, &mut subs, &event);
                }
            }
            None => {
                for mut entry in self.subscriptions.iter_mut() {
                    Self::fan_out(&self.evictions, &mut entry, &event);
                }
            }
        }
    }

    /// Delivers to every matching subscriber in `subs`, dropping (not just
    /// logging) any whose buffer is full or whose receiver is gone.
    fn fan_out(evictions: &AtomicU64, subs: &mut Vec<Subscription>, event: &SseEvent) {
        subs.retain(|sub| {
            if !Self::matches(sub, event) {
                return true;
            }
            match sub.tx.try_send(event.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    evictions.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(subscription_id = %sub.id, "SSE subscriber buffer full, evicting");
                    false
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            }
        });
    }

    fn matches(sub: &Subscription, event: &SseEvent) -> bool {
        match (sub.hospital_filter, event.hospital_id()) {
            (Some(filter), Some(hospital_id)) => filter == hospital_id,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_occurrence(tenant_id: Uuid, hospital_id: Uuid) -> SseEvent {
        SseEvent::NewOccurrence {
            occurrence_id: Uuid::new_v4(),
            tenant_id,
            hospital_id,
            priority_score: 70,
            window_expires_at: chrono::Utc::now(),
        }
    }

    fn system_status_change() -> SseEvent {
        SseEvent::SystemStatusChange {
            component: "death-listener".to_string(),
            previous_status: "UP".to_string(),
            new_status: "DOWN".to_string(),
            changed_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn publish_delivers_to_matching_subscriber() {
        let hub = SseHub::new();
        let tenant_id = Uuid::new_v4();
        let hospital_id = Uuid::new_v4();
        let (_id, mut rx) = hub.subscribe(Uuid::new_v4(), tenant_id, UserRole::Operador, None);

        hub.publish(new_occurrence(tenant_id, hospital_id));

        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn publish_skips_subscribers_in_other_tenants() {
        let hub = SseHub::new();
        let (_id, mut rx) = hub.subscribe(Uuid::new_v4(), Uuid::new_v4(), UserRole::Operador, None);

        hub.publish(new_occurrence(Uuid::new_v4(), Uuid::new_v4()));

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn publish_respects_hospital_filter() {
        let hub = SseHub::new();
        let tenant_id = Uuid::new_v4();
        let hospital_a = Uuid::new_v4();
        let hospital_b = Uuid::new_v4();
        let (_id, mut rx) = hub.subscribe(Uuid::new_v4(), tenant_id, UserRole::Operador, Some(hospital_a));

        hub.publish(new_occurrence(tenant_id, hospital_b));
        assert!(rx.try_recv().is_err());

        hub.publish(new_occurrence(tenant_id, hospital_a));
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn publish_broadcasts_tenant_less_events_to_every_tenant() {
        let hub = SseHub::new();
        let (_id_a, mut rx_a) = hub.subscribe(Uuid::new_v4(), Uuid::new_v4(), UserRole::Admin, None);
        let (_id_b, mut rx_b) = hub.subscribe(Uuid::new_v4(), Uuid::new_v4(), UserRole::Admin, None);

        hub.publish(system_status_change());

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
    }

    #[tokio::test]
    async fn publish_evicts_a_subscriber_whose_buffer_is_full() {
        let hub = SseHub::new();
        let tenant_id = Uuid::new_v4();
        let hospital_id = Uuid::new_v4();
        let (_id, rx) = hub.subscribe(Uuid::new_v4(), tenant_id, UserRole::Operador, None);

        for _ in 0..(DEFAULT_BUFFER + 1) {
            hub.publish(new_occurrence(tenant_id, hospital_id));
        }

        assert_eq!(hub.eviction_count(), 1);
        drop(rx);
    }

    #[tokio::test]
    async fn unsubscribe_removes_the_subscription() {
        let hub = SseHub::new();
        let tenant_id = Uuid::new_v4();
        let hospital_id = Uuid::new_v4();
        let (id, _rx) = hub.subscribe(Uuid::new_v4(), tenant_id, UserRole::Operador, None);

        hub.unsubscribe(tenant_id, id);
        hub.publish(new_occurrence(tenant_id, hospital_id));

        assert_eq!(hub.subscriptions.get(&tenant_id).map(|s| s.len()).unwrap_or(0), 0);
    }
}
