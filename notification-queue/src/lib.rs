//! Ready/in-flight/dead-letter notification queue shared by the email and
//! SMS delivery channels (§4.4). Each channel owns an independent
//! [`NotificationQueue`] instance backed by Redis; neither channel nor
//! queue knows anything about SMTP, SMS gateways, or the triage motor that
//! enqueues into it.

pub mod channel;
pub mod error;
pub mod models;
pub mod queue;
pub mod worker;

pub use channel::Channel;
pub use error::{QueueError, Result};
pub use models::{NotificationChannel, NotificationPayload, QueueItem};
pub use queue::NotificationQueue;
pub use worker::NotificationWorker;
