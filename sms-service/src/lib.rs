//! SMS gateway delivery channel for the shared notification queue (§4.4).
//! Mirrors `email-service`'s shape: a `Channel` implementation that
//! deserializes a `notification_queue::NotificationPayload`, renders it, and
//! delivers it, no-op-logging when the gateway is unconfigured.

pub mod error;
pub mod service;

pub use error::{SmsError, SmsResult};
pub use service::{validate_e164, SmsChannel};
