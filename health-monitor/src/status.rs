use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Per-probe timeout (§4.5: "2s timeout" on every probed component).
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(2000);

const DEGRADED_AFTER_MS: u128 = 500;
const DOWN_AFTER_MS: u128 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComponentStatus {
    Up,
    Degraded,
    Down,
}

impl ComponentStatus {
    /// `< 500ms` -> UP, `500-2000ms` -> DEGRADED, `>= 2000ms` -> DOWN (§4.5).
    /// A probe that errors or times out classifies as DOWN regardless of
    /// how little of the 2s budget elapsed before it failed.
    pub fn from_latency(latency: Duration) -> Self {
        let ms = latency.as_millis();
        if ms < DEGRADED_AFTER_MS {
            ComponentStatus::Up
        } else if ms < DOWN_AFTER_MS {
            ComponentStatus::Degraded
        } else {
            ComponentStatus::Down
        }
    }

    /// Worst-of across every probed component (§4.5: "DOWN if any is DOWN,
    /// DEGRADED if any is DEGRADED, else UP").
    pub fn compose(statuses: impl IntoIterator<Item = ComponentStatus>) -> ComponentStatus {
        let mut overall = ComponentStatus::Up;
        for status in statuses {
            match status {
                ComponentStatus::Down => return ComponentStatus::Down,
                ComponentStatus::Degraded => overall = ComponentStatus::Degraded,
                ComponentStatus::Up => {}
            }
        }
        overall
    }
}

impl std::fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ComponentStatus::Up => "UP",
            ComponentStatus::Degraded => "DEGRADED",
            ComponentStatus::Down => "DOWN",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentState {
    pub status: ComponentStatus,
    pub latency_ms: u64,
    pub last_check: chrono::DateTime<chrono::Utc>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latency_under_500ms_is_up() {
        assert_eq!(ComponentStatus::from_latency(Duration::from_millis(120)), ComponentStatus::Up);
    }

    #[test]
    fn latency_between_500_and_2000ms_is_degraded() {
        assert_eq!(ComponentStatus::from_latency(Duration::from_millis(900)), ComponentStatus::Degraded);
    }

    #[test]
    fn latency_at_or_past_2000ms_is_down() {
        assert_eq!(ComponentStatus::from_latency(Duration::from_millis(2000)), ComponentStatus::Down);
        assert_eq!(ComponentStatus::from_latency(Duration::from_millis(5000)), ComponentStatus::Down);
    }

    #[test]
    fn compose_takes_the_worst_status() {
        use ComponentStatus::*;
        assert_eq!(ComponentStatus::compose([Up, Up]), Up);
        assert_eq!(ComponentStatus::compose([Up, Degraded, Up]), Degraded);
        assert_eq!(ComponentStatus::compose([Up, Degraded, Down]), Down);
    }

    #[test]
    fn compose_of_nothing_is_up() {
        assert_eq!(ComponentStatus::compose(std::iter::empty()), ComponentStatus::Up);
    }
}
