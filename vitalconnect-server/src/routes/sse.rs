use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::state::AppState;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    hospital_id: Option<Uuid>,
}

/// Subscribes the caller to their tenant's event stream (§5: "process-local
/// pub/sub scoped by tenant"). `AuthUser` already accepts the SSE-specific
/// `token=` query parameter fallback, so this handler only needs the
/// optional `hospital_id` narrowing filter. Unregistering the subscription
/// eagerly isn't needed: once the client disconnects and this receiver is
/// dropped, the next `SseHub::publish` finds the send failing and prunes
/// the entry itself (`sse_hub::hub` doc comment).
pub async fn stream(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (_subscription_id, rx) = state.sse.subscribe(user.user_id, user.tenant_id, user.role, query.hospital_id);

    let events = ReceiverStream::new(rx).map(|event| {
        let name = sse_hub::event_name(&event);
        let built = Event::default().event(name).json_data(&event).unwrap_or_else(|_| Event::default().event(name));
        Ok(built)
    });

    Sse::new(events).keep_alive(KeepAlive::new().interval(HEARTBEAT_INTERVAL).text("heartbeat"))
}
