//! Append-only audit trail for the VitalConnect engine.
//!
//! Every triage-rule rejection, shift-routing fallback, and authentication
//! event files an [`AuditEntry`] through an [`AuditSink`] rather than
//! relying on a log line alone, so operators can query what happened after
//! the fact.

pub mod entry;
pub mod error;
pub mod sink;

pub use entry::{AuditEntry, Severity};
pub use error::{AuditError, Result};
pub use sink::{AuditSink, InMemoryAuditSink, PostgresAuditSink};
