//! Triage rule evaluation and occurrence materialization (§4.2): consumes
//! the death stream as a named consumer group, evaluates each tenant's
//! active rules in priority order, materializes an eligible death into a
//! PENDENTE occurrence, and hands off to shift routing and notification
//! fan-out. A one-minute sweeper cancels occurrences whose donation window
//! has lapsed unattended.

pub mod error;
pub mod fsm;
pub mod rules;
pub mod stats;
pub mod worker;

pub use error::{Result, TriageError};
pub use fsm::validate_transition;
pub use rules::{evaluate, window_hours_for, Decision, ObitoFacts};
pub use stats::{TriageSnapshot, TriageStats};
pub use worker::TriageMotor;
