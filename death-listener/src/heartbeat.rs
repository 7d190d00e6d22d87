use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::error::Result;

/// KV key the listener refreshes on every heartbeat tick (§6 KV keys:
/// `vitalconnect:listener:heartbeat` TTL 15s).
pub const HEARTBEAT_KEY: &str = "vitalconnect:listener:heartbeat";

/// How often the listener refreshes the key (§4.1: "Every 5s").
pub const HEARTBEAT_INTERVAL_SECS: u64 = 5;

/// Redis TTL on the key itself, three heartbeat periods — a safety margin
/// so the key disappears on its own if the listener process dies, well
/// past the two-period staleness threshold `health-monitor` applies.
pub const HEARTBEAT_TTL_SECS: u64 = 15;

/// The number of missed heartbeat periods after which `health-monitor`
/// considers the listener DOWN (§4.1: "Absence for two heartbeat periods
/// means DOWN").
pub const STALE_AFTER_PERIODS: i64 = 2;

/// Writes the current time as the heartbeat value, refreshing its TTL.
pub async fn write(conn: &ConnectionManager) -> Result<()> {
    let mut conn = conn.clone();
    let now = Utc::now().timestamp();
    let _: () = conn.set_ex(HEARTBEAT_KEY, now, HEARTBEAT_TTL_SECS).await?;
    Ok(())
}

/// Reads the last heartbeat timestamp, if the key is present (absent
/// either because the listener never started or because its TTL expired).
pub async fn read(conn: &ConnectionManager) -> Result<Option<DateTime<Utc>>> {
    let mut conn = conn.clone();
    let raw: Option<i64> = conn.get(HEARTBEAT_KEY).await?;
    Ok(raw.and_then(|ts| DateTime::from_timestamp(ts, 0)))
}

/// Whether a heartbeat read at `last` is still fresh as of `now`, using the
/// two-period staleness threshold `health-monitor` probes with. A `None`
/// heartbeat (key absent) is never fresh.
pub fn is_fresh(last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last {
        Some(last) => (now - last).num_seconds() < STALE_AFTER_PERIODS * HEARTBEAT_INTERVAL_SECS as i64,
        None => false,
    }
}
