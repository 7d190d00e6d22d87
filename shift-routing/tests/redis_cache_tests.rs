//! End-to-end resolution against a live Redis cache, with stub repositories
//! standing in for the database (mirroring `auth-identity`'s stub-repo test
//! style rather than hitting Postgres).
//!
//! Run with: cargo test -p shift-routing --test redis_cache_tests -- --ignored

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use database_layer::{DatabaseResult, Shift, ShiftRepository, TenantContext, User, UserRepository, UserRole};
use redis::aio::ConnectionManager;
use shift_routing::{Resolution, ShiftCache, ShiftRouter};
use uuid::Uuid;

async fn setup_conn() -> ConnectionManager {
    let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let client = redis::Client::open(redis_url).expect("valid redis url");
    client.get_connection_manager().await.expect("redis reachable for ignored integration test")
}

fn test_user(role: UserRole) -> User {
    User {
        id: Uuid::new_v4(),
        tenant_id: Uuid::new_v4(),
        email: "ops@example.org".to_string(),
        password_hash: String::new(),
        display_name: "Test User".to_string(),
        role,
        phone: None,
        notify_email: true,
        notify_sms: false,
        is_super_admin: false,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

struct StubShiftRepo {
    shift: Option<Shift>,
}

#[async_trait]
impl ShiftRepository for StubShiftRepo {
    async fn find_active_by_hospital_weekday(
        &self,
        _ctx: &TenantContext,
        _hospital_id: Uuid,
        weekday: i16,
    ) -> DatabaseResult<Vec<Shift>> {
        Ok(self.shift.iter().filter(|s| s.weekday == weekday).cloned().collect())
    }

    async fn find_active_by_hospital(&self, _ctx: &TenantContext, _hospital_id: Uuid) -> DatabaseResult<Vec<Shift>> {
        Ok(self.shift.iter().cloned().collect())
    }

    async fn find_active_by_user(&self, _ctx: &TenantContext, user_id: Uuid) -> DatabaseResult<Vec<Shift>> {
        Ok(self.shift.iter().filter(|s| s.user_id == user_id).cloned().collect())
    }

    async fn create(
        &self,
        _ctx: &TenantContext,
        hospital_id: Uuid,
        user_id: Uuid,
        weekday: i16,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> DatabaseResult<Shift> {
        Ok(Shift {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            hospital_id,
            user_id,
            weekday,
            start_time,
            end_time,
            is_active: true,
        })
    }

    async fn update(
        &self,
        _ctx: &TenantContext,
        shift_id: Uuid,
        user_id: Uuid,
        weekday: i16,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> DatabaseResult<Shift> {
        Ok(Shift {
            id: shift_id,
            tenant_id: Uuid::new_v4(),
            hospital_id: Uuid::new_v4(),
            user_id,
            weekday,
            start_time,
            end_time,
            is_active: true,
        })
    }

    async fn delete(&self, _ctx: &TenantContext, shift_id: Uuid) -> DatabaseResult<Shift> {
        Ok(Shift {
            id: shift_id,
            tenant_id: Uuid::new_v4(),
            hospital_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            weekday: 0,
            start_time: NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
            is_active: true,
        })
    }
}

struct StubUserRepo {
    scheduled: Vec<User>,
    gestors: Vec<User>,
}

#[async_trait]
impl UserRepository for StubUserRepo {
    async fn find_by_email(&self, _email: &str) -> DatabaseResult<Option<User>> {
        Ok(None)
    }

    async fn find_by_id(&self, _ctx: &TenantContext, id: Uuid) -> DatabaseResult<User> {
        self.scheduled
            .iter()
            .chain(self.gestors.iter())
            .find(|u| u.id == id)
            .cloned()
            .ok_or(database_layer::DatabaseError::NotFound)
    }

    async fn find_active_by_hospital_and_role(
        &self,
        _ctx: &TenantContext,
        _hospital_id: Uuid,
        _role: UserRole,
    ) -> DatabaseResult<Vec<User>> {
        Ok(self.gestors.clone())
    }

    async fn find_active_by_ids(&self, _ctx: &TenantContext, user_ids: &[Uuid]) -> DatabaseResult<Vec<User>> {
        Ok(self.scheduled.iter().filter(|u| user_ids.contains(&u.id)).cloned().collect())
    }
}

fn ctx() -> TenantContext {
    TenantContext::new(Uuid::new_v4(), Uuid::new_v4(), UserRole::Admin, false)
}

fn monday_at(hour: u32) -> DateTime<Utc> {
    // 2024-01-01 is a Monday.
    Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
}

#[tokio::test]
#[ignore]
async fn resolves_to_the_scheduled_user_and_caches_the_hit() {
    let conn = setup_conn().await;
    let on_duty = test_user(UserRole::Operador);
    let shift = Shift {
        id: Uuid::new_v4(),
        tenant_id: Uuid::new_v4(),
        hospital_id: Uuid::new_v4(),
        user_id: on_duty.id,
        weekday: 1,
        start_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
        is_active: true,
    };
    let router = ShiftRouter::new(
        ShiftCache::new(conn),
        Arc::new(StubShiftRepo { shift: Some(shift) }),
        Arc::new(StubUserRepo { scheduled: vec![on_duty.clone()], gestors: vec![] }),
    );
    let hospital_id = Uuid::new_v4();

    let resolution = router.resolve(&ctx(), hospital_id, monday_at(10)).await.unwrap();
    match resolution {
        Resolution::Scheduled(users) => assert_eq!(users[0].id, on_duty.id),
        other => panic!("expected Scheduled, got {other:?}"),
    }

    // Second call should hit the cache rather than re-querying the shift
    // repository — exercised implicitly since `StubShiftRepo` would return
    // the same result either way; this call mainly proves the cached path
    // doesn't error.
    let resolution = router.resolve(&ctx(), hospital_id, monday_at(10)).await.unwrap();
    assert!(matches!(resolution, Resolution::Scheduled(_)));
}

#[tokio::test]
#[ignore]
async fn falls_back_to_active_gestors_when_no_shift_matches() {
    let conn = setup_conn().await;
    let gestor = test_user(UserRole::Gestor);
    let router = ShiftRouter::new(
        ShiftCache::new(conn),
        Arc::new(StubShiftRepo { shift: None }),
        Arc::new(StubUserRepo { scheduled: vec![], gestors: vec![gestor.clone()] }),
    );

    let resolution = router.resolve(&ctx(), Uuid::new_v4(), monday_at(10)).await.unwrap();
    match resolution {
        Resolution::Fallback(users) => assert_eq!(users[0].id, gestor.id),
        other => panic!("expected Fallback, got {other:?}"),
    }
}

#[tokio::test]
#[ignore]
async fn surfaces_no_operators_on_duty_when_even_the_fallback_is_empty() {
    let conn = setup_conn().await;
    let router = ShiftRouter::new(
        ShiftCache::new(conn),
        Arc::new(StubShiftRepo { shift: None }),
        Arc::new(StubUserRepo { scheduled: vec![], gestors: vec![] }),
    );

    let resolution = router.resolve(&ctx(), Uuid::new_v4(), monday_at(10)).await.unwrap();
    assert!(matches!(resolution, Resolution::NoOperatorsOnDuty));
}
