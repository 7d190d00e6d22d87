//! Redis-Streams-backed event bus for the VitalConnect engine.
//!
//! Every event is a tagged [`DomainEvent`] variant, never a loose JSON bag
//! (§9 redesign flag). The death listener publishes `ObitoDetected` onto
//! `obitos:detectados`; the triage motor consumes it as a named group with
//! explicit acknowledgement.

pub mod error;
pub mod event;
pub mod redis_stream_bus;

pub use error::{EventBusError, Result};
pub use event::DomainEvent;
pub use redis_stream_bus::RedisStreamBus;

/// Canonical stream name for death detections (§4.1).
pub const OBITOS_DETECTADOS_STREAM: &str = "obitos:detectados";
