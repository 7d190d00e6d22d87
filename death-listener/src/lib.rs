//! Hospital death-table poller (§4.1): continuously drains new unprocessed
//! death records per hospital, deduplicates via a row-level idempotency
//! check, and publishes exactly one [`events_bus::DomainEvent::ObitoDetected`]
//! per record onto `obitos:detectados` before flagging the row processed.

pub mod error;
pub mod heartbeat;
pub mod listener;
pub mod stats;

pub use error::{ListenerError, Result};
pub use listener::DeathListener;
pub use stats::{ListenerSnapshot, ListenerStats};
