use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use database_layer::{ShiftRepository, TenantContext, User, UserRepository, UserRole};
use uuid::Uuid;

use crate::cache::ShiftCache;
use crate::error::Result;

/// Outcome of resolving on-duty responders for a hospital at a given time
/// (§4.3 step 4: the mandatory fallback chain).
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Users on a matching shift.
    Scheduled(Vec<User>),
    /// No shift matched; fell back to the hospital's active `gestor`s.
    Fallback(Vec<User>),
    /// Neither a shift nor a fallback `gestor` exists. The caller proceeds
    /// with dashboard-only notification and emits an audit WARN (§4.3).
    NoOperatorsOnDuty,
}

impl Resolution {
    pub fn users(&self) -> &[User] {
        match self {
            Resolution::Scheduled(users) | Resolution::Fallback(users) => users,
            Resolution::NoOperatorsOnDuty => &[],
        }
    }
}

/// Given (hospital, event-time), returns the set of users to notify,
/// following the cache → DB → fallback chain in §4.3.
pub struct ShiftRouter {
    cache: ShiftCache,
    shifts: Arc<dyn ShiftRepository>,
    users: Arc<dyn UserRepository>,
}

impl ShiftRouter {
    pub fn new(cache: ShiftCache, shifts: Arc<dyn ShiftRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { cache, shifts, users }
    }

    pub async fn resolve(&self, ctx: &TenantContext, hospital_id: Uuid, event_time: DateTime<Utc>) -> Result<Resolution> {
        let weekday = event_time.weekday().num_days_from_sunday() as i16;
        let time_of_day = event_time.time();

        let user_ids = match self.cache.get(hospital_id, weekday, time_of_day).await? {
            Some(ids) => ids,
            None => {
                let ids = self.resolve_from_shifts(ctx, hospital_id, weekday, time_of_day).await?;
                self.cache.set(hospital_id, weekday, time_of_day, ids.clone()).await?;
                ids
            }
        };

        if !user_ids.is_empty() {
            let users = self.users.find_active_by_ids(ctx, &user_ids).await?;
            if !users.is_empty() {
                return Ok(Resolution::Scheduled(users));
            }
        }

        let gestors = self.users.find_active_by_hospital_and_role(ctx, hospital_id, UserRole::Gestor).await?;
        if !gestors.is_empty() {
            return Ok(Resolution::Fallback(gestors));
        }

        Ok(Resolution::NoOperatorsOnDuty)
    }

    async fn resolve_from_shifts(
        &self,
        ctx: &TenantContext,
        hospital_id: Uuid,
        weekday: i16,
        time_of_day: chrono::NaiveTime,
    ) -> Result<Vec<Uuid>> {
        let prior_weekday = (weekday + 6) % 7;
        let todays_shifts = self.shifts.find_active_by_hospital_weekday(ctx, hospital_id, weekday).await?;
        let prior_shifts = self.shifts.find_active_by_hospital_weekday(ctx, hospital_id, prior_weekday).await?;
        Ok(on_duty_user_ids(time_of_day, &todays_shifts, &prior_shifts))
    }

    /// Invalidates the cached resolution for `hospital_id`. Callers that
    /// create, update, or delete a shift must call this (§4.3: "Cache
    /// invalidation").
    pub async fn invalidate_cache(&self, hospital_id: Uuid) -> Result<()> {
        self.cache.invalidate(hospital_id).await
    }
}

/// Pure core of the time-of-day resolution step (§4.3 steps 2-3): unions
/// users whose shift on `weekday` covers `time_of_day` with users whose
/// night shift on the *prior* weekday spills its early-morning half onto
/// today. Split out from [`ShiftRouter::resolve_from_shifts`] so the
/// night-shift wraparound logic is testable without a database.
fn on_duty_user_ids(time_of_day: chrono::NaiveTime, todays_shifts: &[database_layer::Shift], prior_shifts: &[database_layer::Shift]) -> Vec<Uuid> {
    let mut user_ids: HashSet<Uuid> = HashSet::new();

    for shift in todays_shifts {
        if shift.covers_time_of_day(time_of_day) {
            user_ids.insert(shift.user_id);
        }
    }
    for shift in prior_shifts {
        if shift.covers_wraparound_prefix(time_of_day) {
            user_ids.insert(shift.user_id);
        }
    }

    user_ids.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use database_layer::Shift;

    use super::*;

    fn shift(weekday: i16, start: (u32, u32), end: (u32, u32), user_id: Uuid) -> Shift {
        Shift {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            hospital_id: Uuid::new_v4(),
            user_id,
            weekday,
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            is_active: true,
        }
    }

    #[test]
    fn resolves_the_user_on_a_matching_daytime_shift() {
        let user_id = Uuid::new_v4();
        let todays = vec![shift(1, (7, 0), (19, 0), user_id)];
        let ids = on_duty_user_ids(NaiveTime::from_hms_opt(10, 0, 0).unwrap(), &todays, &[]);
        assert_eq!(ids, vec![user_id]);
    }

    #[test]
    fn resolves_the_user_from_a_prior_day_night_shift_wraparound() {
        let user_id = Uuid::new_v4();
        // Monday 22:00-02:00 night shift; an event on Tuesday at 01:00
        // should resolve to this user even though the shift row is stored
        // on Monday.
        let prior = vec![shift(1, (22, 0), (2, 0), user_id)];
        let ids = on_duty_user_ids(NaiveTime::from_hms_opt(1, 0, 0).unwrap(), &[], &prior);
        assert_eq!(ids, vec![user_id]);
    }

    #[test]
    fn a_prior_day_night_shift_does_not_match_its_own_evening_half() {
        // The same shift shouldn't match a late-evening time on the
        // following weekday — that time belongs to that weekday's own
        // shift, not yesterday's wraparound.
        let user_id = Uuid::new_v4();
        let prior = vec![shift(1, (22, 0), (2, 0), user_id)];
        let ids = on_duty_user_ids(NaiveTime::from_hms_opt(23, 0, 0).unwrap(), &[], &prior);
        assert!(ids.is_empty());
    }

    #[test]
    fn resolution_users_is_empty_for_no_operators_on_duty() {
        assert!(Resolution::NoOperatorsOnDuty.users().is_empty());
    }
}
