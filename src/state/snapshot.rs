//! View-facing state: snapshots and published events

use serde::{Deserialize, Serialize};

use super::{
    countdown::{CountdownController, CountdownEvent, CountdownPhase},
    counter::{Count, CountUpdate, CounterStore},
};

/// Everything the view needs to render the screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub count: Count,
    pub controls_enabled: bool,
    pub countdown_seconds: Option<u64>,
    pub remaining: u64,
    pub running: bool,
    pub phase: CountdownPhase,
    /// Remaining seconds as text, empty when nothing is counting down
    pub remaining_display: String,
}

impl CounterSnapshot {
    pub fn capture(counter: &CounterStore, countdown: &CountdownController) -> Self {
        let state = countdown.state();
        Self {
            count: counter.count(),
            controls_enabled: counter.controls_enabled(),
            countdown_seconds: countdown.config().map(|c| c.seconds()),
            remaining: state.remaining,
            running: state.running,
            phase: countdown.phase(),
            remaining_display: remaining_display(state.remaining),
        }
    }
}

pub fn remaining_display(remaining: u64) -> String {
    if remaining == 0 {
        String::new()
    } else {
        remaining.to_string()
    }
}

/// Events broadcast to subscribed views, in the order they happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CounterEvent {
    Count(CountUpdate),
    CountdownTick { remaining: u64 },
    CountdownCompleted,
}

impl CounterEvent {
    /// Event name used on the SSE stream
    pub fn name(&self) -> &'static str {
        match self {
            CounterEvent::Count(_) => "count",
            CounterEvent::CountdownTick { .. } => "countdown_tick",
            CounterEvent::CountdownCompleted => "countdown_completed",
        }
    }
}

impl From<CountdownEvent> for CounterEvent {
    fn from(event: CountdownEvent) -> Self {
        match event {
            CountdownEvent::Tick { remaining } => CounterEvent::CountdownTick { remaining },
            CountdownEvent::Completed => CounterEvent::CountdownCompleted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_display_is_empty_at_zero() {
        assert_eq!(remaining_display(0), "");
        assert_eq!(remaining_display(42), "42");
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_value(CounterEvent::Count(CountUpdate::new(3))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "count", "count": 3, "controls_enabled": true})
        );

        let json = serde_json::to_value(CounterEvent::CountdownTick { remaining: 2 }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "countdown_tick", "remaining": 2}));
        assert_eq!(CounterEvent::CountdownCompleted.name(), "countdown_completed");
    }
}
