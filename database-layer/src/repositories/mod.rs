pub mod hospital_repository;
pub mod obito_repository;
pub mod occurrence_repository;
pub mod shift_repository;
pub mod tenant_repository;
pub mod triage_rule_repository;
pub mod user_repository;

pub use hospital_repository::{HospitalRepository, PostgresHospitalRepository};
pub use obito_repository::{NewObito, ObitoRepository, PostgresObitoRepository};
pub use occurrence_repository::{OccurrenceFilter, OccurrenceRepository, PostgresOccurrenceRepository};
pub use shift_repository::{PostgresShiftRepository, ShiftRepository};
pub use tenant_repository::{PostgresTenantRepository, TenantRepository};
pub use triage_rule_repository::{PostgresTriageRuleRepository, TriageRuleRepository};
pub use user_repository::{PostgresUserRepository, UserRepository};
