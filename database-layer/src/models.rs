use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Hospital {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub connection_config: Option<JsonValue>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum UserRole {
    Operador,
    Gestor,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub notify_email: bool,
    pub notify_sms: bool,
    pub is_super_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Obito {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub hospital_id: Uuid,
    pub masked_patient_name: String,
    pub unmasked_patient_name: String,
    pub birth_date: NaiveDate,
    pub death_at: DateTime<Utc>,
    pub cause_of_death: Option<String>,
    pub sector: Option<String>,
    pub bed: Option<String>,
    pub is_unidentified: bool,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
}

impl Obito {
    /// Age in whole years at `at`, used by the death listener to populate
    /// `ObitoDetected::age_years` and by `max_age` rule evaluation (§4.2).
    /// Callers are expected to have already rejected a negative or
    /// future-dated `birth_date` at the point of ingestion; this is plain
    /// calendar arithmetic, not validation.
    pub fn age_years_at(&self, at: DateTime<Utc>) -> i32 {
        let today = at.date_naive();
        let mut age = today.year() - self.birth_date.year();
        let had_birthday_this_year = (today.month(), today.day()) >= (self.birth_date.month(), self.birth_date.day());
        if !had_birthday_this_year {
            age -= 1;
        }
        age
    }

    /// Keeps the first letter of each whitespace-separated name segment,
    /// joined by periods (§4.2: "masked display name derived from the full
    /// name by keeping first letters of each name segment separated by
    /// periods"), e.g. `"Maria Clara Souza"` -> `"M.C.S."`.
    pub fn mask_name(full_name: &str) -> String {
        full_name
            .split_whitespace()
            .filter_map(|segment| segment.chars().next())
            .map(|initial| format!("{}.", initial.to_uppercase()))
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
pub enum OccurrenceStatus {
    Pendente,
    EmAndamento,
    Aceita,
    Recusada,
    Cancelada,
    Concluida,
}

impl OccurrenceStatus {
    /// Terminal statuses never transition again (§4.2).
    pub fn is_terminal(self) -> bool {
        matches!(self, OccurrenceStatus::Cancelada | OccurrenceStatus::Concluida)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Occurrence {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub hospital_id: Uuid,
    pub obito_id: Uuid,
    pub status: OccurrenceStatus,
    pub priority_score: i32,
    pub masked_patient_name: String,
    pub clinical_payload: JsonValue,
    pub death_at: DateTime<Utc>,
    pub window_expires_at: DateTime<Utc>,
    pub first_notified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Recorded only when an occurrence reaches CONCLUIDA from ACEITA or
/// RECUSADA (§6); a window expiry moves a PENDENTE occurrence straight to
/// CANCELADA with no outcome at all, so there's no "expired" variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum OutcomeKind {
    Doado,
    Recusado,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OccurrenceHistoryEntry {
    pub id: Uuid,
    pub occurrence_id: Uuid,
    pub actor: Option<Uuid>,
    pub before_status: Option<OccurrenceStatus>,
    pub after_status: OccurrenceStatus,
    pub outcome: Option<OutcomeKind>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum RuleKind {
    MaxAge,
    ExcludedCauses,
    WindowHours,
    UnidentifiedRejected,
    SectorPriority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum RuleAction {
    Reject,
    ScoreAdjust,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TriageRule {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub priority: i32,
    pub is_active: bool,
    pub kind: RuleKind,
    pub action: RuleAction,
    /// Interpretation depends on `kind`: an integer threshold for
    /// `max_age`/`window_hours`, a JSON array of strings for
    /// `excluded_causes`, `true`/absent for `unidentified_rejected`, or a
    /// JSON object of sector -> bonus for `sector_priority`.
    pub parameters: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Shift {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub hospital_id: Uuid,
    pub user_id: Uuid,
    /// Sunday = 0, per spec §3.
    pub weekday: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_active: bool,
}

impl Shift {
    /// A shift is a night shift iff its start is later than its end (§3).
    pub fn is_night_shift(&self) -> bool {
        self.start_time > self.end_time
    }

    /// Whether `t` falls inside this shift's time-of-day interval,
    /// accounting for the night-shift wraparound rule in §3.
    pub fn covers_time_of_day(&self, t: NaiveTime) -> bool {
        if self.is_night_shift() {
            t >= self.start_time || t < self.end_time
        } else {
            t >= self.start_time && t < self.end_time
        }
    }

    /// Whether `t` falls in the `[00:00, end)` prefix this night shift
    /// spills onto the *following* weekday (§4.3: "for night shifts, when
    /// resolving an event near midnight, also query the prior weekday's
    /// night shifts"). Deliberately narrower than [`Self::covers_time_of_day`]:
    /// when this shift is being considered for the weekday *after* the one
    /// it's stored on, only its early-morning spillover counts, not its
    /// `t >= start` evening half — that half belongs to its own weekday.
    pub fn covers_wraparound_prefix(&self, t: NaiveTime) -> bool {
        self.is_night_shift() && t < self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_shift_covers_only_its_interval() {
        let shift = Shift {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            hospital_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            weekday: 1,
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            is_active: true,
        };
        assert!(!shift.is_night_shift());
        assert!(shift.covers_time_of_day(NaiveTime::from_hms_opt(9, 0, 0).unwrap()));
        assert!(!shift.covers_time_of_day(NaiveTime::from_hms_opt(16, 0, 0).unwrap()));
    }

    #[test]
    fn night_shift_wraps_across_midnight() {
        let shift = Shift {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            hospital_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            weekday: 1,
            start_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            is_active: true,
        };
        assert!(shift.is_night_shift());
        assert!(shift.covers_time_of_day(NaiveTime::from_hms_opt(3, 0, 0).unwrap()));
        assert!(shift.covers_time_of_day(NaiveTime::from_hms_opt(23, 0, 0).unwrap()));
        assert!(!shift.covers_time_of_day(NaiveTime::from_hms_opt(12, 0, 0).unwrap()));
    }

    #[test]
    fn wraparound_prefix_excludes_the_evening_half() {
        let shift = Shift {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            hospital_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            weekday: 1,
            start_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(2, 0, 0).unwrap(),
            is_active: true,
        };
        assert!(shift.covers_wraparound_prefix(NaiveTime::from_hms_opt(1, 0, 0).unwrap()));
        assert!(!shift.covers_wraparound_prefix(NaiveTime::from_hms_opt(23, 0, 0).unwrap()));
    }

    #[test]
    fn occurrence_terminal_statuses() {
        assert!(OccurrenceStatus::Cancelada.is_terminal());
        assert!(OccurrenceStatus::Concluida.is_terminal());
        assert!(!OccurrenceStatus::Pendente.is_terminal());
    }

    fn obito_born_on(birth_date: NaiveDate) -> Obito {
        Obito {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            hospital_id: Uuid::new_v4(),
            masked_patient_name: String::new(),
            unmasked_patient_name: String::new(),
            birth_date,
            death_at: Utc::now(),
            cause_of_death: None,
            sector: None,
            bed: None,
            is_unidentified: false,
            processed: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn age_years_at_counts_a_birthday_already_passed_this_year() {
        let obito = obito_born_on(NaiveDate::from_ymd_opt(1950, 3, 1).unwrap());
        let at = chrono::DateTime::parse_from_rfc3339("2024-06-15T00:00:00Z").unwrap().with_timezone(&Utc);
        assert_eq!(obito.age_years_at(at), 74);
    }

    #[test]
    fn age_years_at_has_not_yet_had_this_years_birthday() {
        let obito = obito_born_on(NaiveDate::from_ymd_opt(1950, 12, 25).unwrap());
        let at = chrono::DateTime::parse_from_rfc3339("2024-06-15T00:00:00Z").unwrap().with_timezone(&Utc);
        assert_eq!(obito.age_years_at(at), 73);
    }

    #[test]
    fn mask_name_keeps_one_initial_per_segment() {
        assert_eq!(Obito::mask_name("Maria Clara Souza"), "M.C.S.");
        assert_eq!(Obito::mask_name("  joao   "), "J.");
    }
}
