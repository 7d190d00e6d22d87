use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::error::{EventBusError, Result};
use crate::event::DomainEvent;

const PAYLOAD_FIELD: &str = "payload";

/// Redis Streams wrapper carrying [`DomainEvent`]s between the death
/// listener and the triage motor (`obitos:detectados`), and from the
/// triage motor to anything else that consumes as a named group.
///
/// Consumer-group creation is idempotent: `XGROUP CREATE ... MKSTREAM`
/// ignores a `BUSYGROUP` reply, which Redis returns when the group already
/// exists.
#[derive(Clone)]
pub struct RedisStreamBus {
    conn: ConnectionManager,
}

impl RedisStreamBus {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self { conn })
    }

    pub fn from_connection_manager(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    pub async fn publish(&self, stream: &str, event: &DomainEvent) -> Result<String> {
        let payload = serde_json::to_string(event)?;
        let mut conn = self.conn.clone();
        let entry_id: String = conn
            .xadd(stream, "*", &[(PAYLOAD_FIELD, payload)])
            .await?;
        Ok(entry_id)
    }

    /// Creates `group` on `stream` (and the stream itself, via `MKSTREAM`)
    /// if it doesn't already exist.
    pub async fn ensure_group(&self, stream: &str, group: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let result: redis::RedisResult<String> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(stream)
            .arg(group)
            .arg("$")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("BUSYGROUP") => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Reads up to `count` new entries for `consumer` in `group`, ack-able
    /// individually via [`Self::ack`]. Blocks up to `block_ms`
    /// milliseconds if the stream is empty.
    pub async fn read_group(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        count: usize,
        block_ms: usize,
    ) -> Result<Vec<(String, DomainEvent)>> {
        let mut conn = self.conn.clone();

        let reply: redis::streams::StreamReadReply = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(group)
            .arg(consumer)
            .arg("COUNT")
            .arg(count)
            .arg("BLOCK")
            .arg(block_ms)
            .arg("STREAMS")
            .arg(stream)
            .arg(">")
            .query_async(&mut conn)
            .await?;

        let mut out = Vec::new();
        for stream_key in reply.keys {
            for stream_id in stream_key.ids {
                let payload: String = stream_id
                    .map
                    .get(PAYLOAD_FIELD)
                    .and_then(|v| match v {
                        redis::Value::BulkString(bytes) => {
                            String::from_utf8(bytes.clone()).ok()
                        }
                        _ => None,
                    })
                    .ok_or_else(|| {
                        EventBusError::MalformedEntry(format!(
                            "entry {} missing payload field",
                            stream_id.id
                        ))
                    })?;

                let event: DomainEvent = serde_json::from_str(&payload)?;
                out.push((stream_id.id, event));
            }
        }

        Ok(out)
    }

    pub async fn ack(&self, stream: &str, group: &str, entry_id: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.xack(stream, group, &[entry_id]).await?;
        Ok(())
    }
}
