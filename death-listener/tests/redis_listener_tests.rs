//! End-to-end poll-tick behavior against a live Redis instance (event
//! stream + heartbeat key), with stub repositories standing in for the
//! database.
//!
//! Run with: cargo test -p death-listener --test redis_listener_tests -- --ignored

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use database_layer::{
    DatabaseResult, Hospital, HospitalRepository, NewObito, Obito, ObitoRepository, Tenant, TenantContext,
    TenantRepository,
};
use death_listener::{heartbeat, DeathListener};
use events_bus::RedisStreamBus;
use redis::aio::ConnectionManager;
use uuid::Uuid;

async fn setup_conn() -> ConnectionManager {
    let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let client = redis::Client::open(redis_url).expect("valid redis url");
    client.get_connection_manager().await.expect("redis reachable for ignored integration test")
}

struct StubTenantRepo {
    tenants: Vec<Tenant>,
}

#[async_trait]
impl TenantRepository for StubTenantRepo {
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Tenant> {
        self.tenants.iter().find(|t| t.id == id).cloned().ok_or(database_layer::DatabaseError::NotFound)
    }

    async fn list_all(&self) -> DatabaseResult<Vec<Tenant>> {
        Ok(self.tenants.clone())
    }
}

struct StubHospitalRepo {
    hospitals: Vec<Hospital>,
}

#[async_trait]
impl HospitalRepository for StubHospitalRepo {
    async fn find_by_id(&self, _ctx: &TenantContext, id: Uuid) -> DatabaseResult<Hospital> {
        self.hospitals.iter().find(|h| h.id == id).cloned().ok_or(database_layer::DatabaseError::NotFound)
    }

    async fn list_active_by_tenant(&self, ctx: &TenantContext) -> DatabaseResult<Vec<Hospital>> {
        Ok(self.hospitals.iter().filter(|h| h.tenant_id == ctx.tenant_id && h.is_active).cloned().collect())
    }
}

struct StubObitoRepo {
    obitos: parking_lot::Mutex<Vec<Obito>>,
}

#[async_trait]
impl ObitoRepository for StubObitoRepo {
    async fn find_unprocessed_since(
        &self,
        _ctx: &TenantContext,
        hospital_id: Uuid,
        since: DateTime<Utc>,
    ) -> DatabaseResult<Vec<Obito>> {
        Ok(self
            .obitos
            .lock()
            .iter()
            .filter(|o| o.hospital_id == hospital_id && !o.processed && o.death_at >= since)
            .cloned()
            .collect())
    }

    async fn is_processed(&self, _ctx: &TenantContext, obito_id: Uuid) -> DatabaseResult<bool> {
        Ok(self
            .obitos
            .lock()
            .iter()
            .find(|o| o.id == obito_id)
            .map(|o| o.processed)
            .unwrap_or(true))
    }

    async fn mark_processed(&self, _ctx: &TenantContext, obito_id: Uuid) -> DatabaseResult<()> {
        if let Some(o) = self.obitos.lock().iter_mut().find(|o| o.id == obito_id) {
            o.processed = true;
        }
        Ok(())
    }

    async fn create(&self, new_obito: NewObito) -> DatabaseResult<Obito> {
        let obito = Obito {
            id: Uuid::new_v4(),
            tenant_id: new_obito.tenant_id,
            hospital_id: new_obito.hospital_id,
            masked_patient_name: new_obito.masked_patient_name,
            unmasked_patient_name: new_obito.unmasked_patient_name,
            birth_date: new_obito.birth_date,
            death_at: new_obito.death_at,
            cause_of_death: new_obito.cause_of_death,
            sector: new_obito.sector,
            bed: new_obito.bed,
            is_unidentified: new_obito.is_unidentified,
            processed: false,
            created_at: Utc::now(),
        };
        self.obitos.lock().push(obito.clone());
        Ok(obito)
    }
}

fn sample_obito(tenant_id: Uuid, hospital_id: Uuid) -> Obito {
    Obito {
        id: Uuid::new_v4(),
        tenant_id,
        hospital_id,
        masked_patient_name: "M.C.S.".to_string(),
        unmasked_patient_name: "Maria Clara Souza".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1960, 5, 1).unwrap(),
        death_at: Utc::now(),
        cause_of_death: Some("Infarto".to_string()),
        sector: Some("UTI".to_string()),
        bed: Some("12B".to_string()),
        is_unidentified: false,
        processed: false,
        created_at: Utc::now(),
    }
}

#[tokio::test]
#[ignore]
async fn poll_publishes_an_event_and_flags_the_record_processed() {
    let conn = setup_conn().await;
    let bus = RedisStreamBus::from_connection_manager(conn.clone());

    let tenant_id = Uuid::new_v4();
    let hospital_id = Uuid::new_v4();
    let obito = sample_obito(tenant_id, hospital_id);
    let obito_id = obito.id;

    let tenants = Arc::new(StubTenantRepo { tenants: vec![Tenant { id: tenant_id, name: "Hosp Group".into(), slug: "hosp-group".into(), created_at: Utc::now() }] });
    let hospitals = Arc::new(StubHospitalRepo {
        hospitals: vec![Hospital {
            id: hospital_id,
            tenant_id,
            name: "Hospital Central".into(),
            code: "HC1".into(),
            address: None,
            phone: None,
            latitude: None,
            longitude: None,
            connection_config: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }],
    });
    let obitos = Arc::new(StubObitoRepo { obitos: parking_lot::Mutex::new(vec![obito]) });

    let listener = DeathListener::new(tenants, hospitals, obitos.clone(), bus, conn.clone(), Duration::from_millis(50));

    let shutdown = tokio_util::sync::CancellationToken::new();
    let listener = Arc::new(listener);
    let runner = listener.clone();
    let shutdown_clone = shutdown.clone();
    let handle = tokio::spawn(async move { runner.run(shutdown_clone).await });

    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown.cancel();
    handle.await.unwrap().unwrap();

    let ctx = TenantContext::new(tenant_id, Uuid::nil(), database_layer::UserRole::Admin, true);
    assert!(obitos.is_processed(&ctx, obito_id).await.unwrap());

    let snapshot = listener.stats().snapshot();
    assert_eq!(snapshot.total_processed, 1);
    assert!(!snapshot.running);

    let heartbeat_value = heartbeat::read(&conn).await.unwrap();
    assert!(heartbeat_value.is_some());
}
