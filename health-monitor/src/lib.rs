//! Component health probing and alerting (§4.5): probes the database, KV
//! store, death listener heartbeat, triage motor, SSE hub, and the API
//! itself on an interval, composes an overall status, persists the state
//! map in KV for restart-safe transition detection, and raises a
//! cooldown-gated admin email when the listener specifically goes UP ->
//! DOWN.

pub mod error;
pub mod probe;
pub mod status;
pub mod worker;

pub use error::{HealthError, Result};
pub use status::{ComponentState, ComponentStatus};
pub use worker::{HealthMonitor, HealthSnapshot};
