//! Process-local pub/sub fan-out for the live dashboard SSE stream (§5).
//!
//! [`SseHub`] owns one bounded `mpsc` channel per subscriber, keyed by
//! tenant. Publishing never blocks: a subscriber whose buffer is full is
//! evicted rather than back-pressuring the publisher. Heartbeat framing
//! (`HEARTBEAT_FRAME`) and the per-connection SSE response body are built by
//! the HTTP layer, which merges a subscriber's `mpsc::Receiver<SseEvent>`
//! with its own 15s ticker — the hub itself only needs to know about event
//! delivery, not about HTTP framing cadence.

pub mod event;
pub mod hub;

pub use event::{event_name, to_frame, SseEvent, HEARTBEAT_FRAME};
pub use hub::SseHub;
