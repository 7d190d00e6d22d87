use chrono::{NaiveTime, Timelike};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

const CACHE_TTL_SECS: u64 = 300;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope {
    weekday: i16,
    hour: u32,
    user_ids: Vec<Uuid>,
}

/// Caches the resolved on-duty user set per hospital (§4.3: "Cache hit only
/// when cached weekday and hour match the event-time; else treat as miss").
/// One key per hospital, holding the most recently resolved hour-bucket —
/// not a general-purpose per-(weekday,hour) cache, so a lookup for a
/// different hour on the same hospital is always a miss and re-resolves.
pub struct ShiftCache {
    conn: ConnectionManager,
}

impl ShiftCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn key(hospital_id: Uuid) -> String {
        format!("shift:hospital:{hospital_id}:current")
    }

    pub async fn get(&self, hospital_id: Uuid, weekday: i16, t: NaiveTime) -> Result<Option<Vec<Uuid>>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(Self::key(hospital_id)).await?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        let envelope: CacheEnvelope = serde_json::from_str(&raw)?;
        if envelope.weekday == weekday && envelope.hour == hour_of(t) {
            Ok(Some(envelope.user_ids))
        } else {
            Ok(None)
        }
    }

    pub async fn set(&self, hospital_id: Uuid, weekday: i16, t: NaiveTime, user_ids: Vec<Uuid>) -> Result<()> {
        let envelope = CacheEnvelope { weekday, hour: hour_of(t), user_ids };
        let raw = serde_json::to_string(&envelope)?;
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(Self::key(hospital_id), raw, CACHE_TTL_SECS).await?;
        Ok(())
    }

    /// Invalidated on any create/update/delete of a shift for the hospital
    /// (§4.3: "Cache invalidation").
    pub async fn invalidate(&self, hospital_id: Uuid) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(Self::key(hospital_id)).await?;
        Ok(())
    }
}

fn hour_of(t: NaiveTime) -> u32 {
    t.hour()
}
