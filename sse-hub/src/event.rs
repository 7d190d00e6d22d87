use events_bus::DomainEvent;

/// The hub fans out the same tagged [`DomainEvent`] the event bus carries
/// between workers — there is no separate wire type, just a presentation
/// concern (the SSE `event:` name) layered on top.
pub type SseEvent = DomainEvent;

/// A heartbeat comment frame sent every 15s to keep idle connections alive.
/// SSE comment lines start with `:` and are ignored by clients.
pub const HEARTBEAT_FRAME: &str = ": heartbeat\n\n";

/// The SSE `event:` name for each kind (§5: "new_occurrence|status_update|
/// map_update|system_status_change").
pub fn event_name(event: &SseEvent) -> &'static str {
    match event {
        DomainEvent::ObitoDetected { .. } => "obito_detected",
        DomainEvent::NewOccurrence { .. } => "new_occurrence",
        DomainEvent::StatusUpdate { .. } => "status_update",
        DomainEvent::MapUpdate { .. } => "map_update",
        DomainEvent::SystemStatusChange { .. } => "system_status_change",
    }
}

/// Renders the wire-format SSE frame (`event: <name>\ndata: <json>\n\n`).
pub fn to_frame(event: &SseEvent) -> Result<String, serde_json::Error> {
    let data = serde_json::to_string(event)?;
    Ok(format!("event: {}\ndata: {}\n\n", event_name(event), data))
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn to_frame_uses_the_snake_case_event_name() {
        let event = DomainEvent::NewOccurrence {
            occurrence_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            hospital_id: Uuid::new_v4(),
            priority_score: 80,
            window_expires_at: chrono::Utc::now(),
        };
        let frame = to_frame(&event).unwrap();
        assert!(frame.starts_with("event: new_occurrence\n"));
        assert!(frame.contains("\"kind\":\"NewOccurrence\""));
        assert!(frame.ends_with("\n\n"));
    }
}
