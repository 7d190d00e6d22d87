//! Postgres-backed data access for the VitalConnect engine: connection
//! pooling, tenant-scoped repositories, and entity models for every table
//! in §3 of the data model.

pub mod error;
pub mod models;
pub mod pool;
pub mod repositories;
pub mod tenant_context;
pub mod transaction;

pub use error::{DatabaseError, DatabaseResult};
pub use models::{
    Hospital, Obito, Occurrence, OccurrenceHistoryEntry, OccurrenceStatus, OutcomeKind, RuleAction,
    RuleKind, Shift, Tenant, TriageRule, User, UserRole,
};
pub use pool::DbPool;
pub use repositories::{
    HospitalRepository, NewObito, ObitoRepository, OccurrenceFilter, OccurrenceRepository,
    PostgresHospitalRepository, PostgresObitoRepository, PostgresOccurrenceRepository,
    PostgresShiftRepository, PostgresTenantRepository, PostgresTriageRuleRepository,
    PostgresUserRepository, ShiftRepository, TenantRepository, TriageRuleRepository, UserRepository,
};
pub use tenant_context::TenantContext;
pub use transaction::with_transaction;
