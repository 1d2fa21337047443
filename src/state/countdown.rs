//! Re-arming countdown attached to the counter
//!
//! The controller is a plain state machine: it never touches a clock. Every
//! operation returns a [`Transition`] describing the events to publish and what
//! should happen to the one-second ticker that drives [`CountdownController::on_tick`].

use std::num::NonZeroU64;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Identifies one countdown run; ticks carrying a stale generation are dropped
pub type Generation = u64;

/// Positive countdown length in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownConfig(NonZeroU64);

impl CountdownConfig {
    pub fn from_secs(seconds: u64) -> Option<Self> {
        NonZeroU64::new(seconds).map(Self)
    }

    /// Parse user input from the duration prompt.
    ///
    /// Absent, empty, non-numeric, zero and negative input all yield `None`.
    pub fn parse_input(input: Option<&str>) -> Option<Self> {
        input
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .and_then(|text| text.parse::<u64>().ok())
            .and_then(Self::from_secs)
    }

    pub fn seconds(&self) -> u64 {
        self.0.get()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownState {
    pub remaining: u64,
    pub running: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownPhase {
    Idle,
    /// Duration configured, waiting for the next increment
    Armed,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CountdownEvent {
    /// Remaining seconds to display; 0 clears the display
    Tick { remaining: u64 },
    /// Terminal event of a run, distinct from ticks
    Completed,
}

/// What the owner must do with the ticker after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Keep,
    Cancel,
    /// Cancel any previous ticker and start one tagged with this generation
    Start(Generation),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub events: Vec<CountdownEvent>,
    pub timer: TimerCommand,
}

impl Transition {
    fn none() -> Self {
        Self {
            events: Vec::new(),
            timer: TimerCommand::Keep,
        }
    }

    fn cleared() -> Self {
        Self {
            events: vec![CountdownEvent::Tick { remaining: 0 }],
            timer: TimerCommand::Cancel,
        }
    }

    pub fn completed(&self) -> bool {
        self.events.contains(&CountdownEvent::Completed)
    }
}

#[derive(Debug, Default)]
pub struct CountdownController {
    config: Option<CountdownConfig>,
    state: CountdownState,
    generation: Generation,
}

impl CountdownController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<CountdownConfig> {
        self.config
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn phase(&self) -> CountdownPhase {
        if self.state.running {
            CountdownPhase::Running
        } else if self.config.is_some() {
            CountdownPhase::Armed
        } else {
            CountdownPhase::Idle
        }
    }

    /// Record the duration used from the next increment on
    pub fn set_config(&mut self, config: CountdownConfig) {
        info!("Countdown duration set to {}s", config.seconds());
        self.config = Some(config);
    }

    pub fn on_count_incremented(&mut self) -> Transition {
        self.invalidate();

        let Some(config) = self.config else {
            debug!("Count incremented without a countdown configured");
            return Transition::cleared();
        };

        let remaining = config.seconds();
        self.state = CountdownState {
            remaining,
            running: true,
        };
        debug!(
            "Countdown restarted at {}s (generation {})",
            remaining, self.generation
        );

        Transition {
            events: vec![CountdownEvent::Tick { remaining }],
            timer: TimerCommand::Start(self.generation),
        }
    }

    /// Advance the run tagged `generation` by one second
    pub fn on_tick(&mut self, generation: Generation) -> Transition {
        if generation != self.generation || !self.state.running {
            debug!(
                "Dropping stale tick (generation {}, live {})",
                generation, self.generation
            );
            return Transition::none();
        }

        if self.state.remaining > 1 {
            self.state.remaining -= 1;
            return Transition {
                events: vec![CountdownEvent::Tick {
                    remaining: self.state.remaining,
                }],
                timer: TimerCommand::Keep,
            };
        }

        self.invalidate();
        info!("Countdown completed");
        Transition {
            events: vec![
                CountdownEvent::Completed,
                CountdownEvent::Tick { remaining: 0 },
            ],
            timer: TimerCommand::Cancel,
        }
    }

    /// The count went back to zero: stop and forget the duration
    pub fn on_count_reset(&mut self) -> Transition {
        self.invalidate();
        if self.config.take().is_some() {
            debug!("Countdown duration cleared with the count");
        }
        Transition::cleared()
    }

    /// Stop any run for good; safe to call repeatedly
    pub fn teardown(&mut self) -> Transition {
        self.invalidate();
        Transition {
            events: Vec::new(),
            timer: TimerCommand::Cancel,
        }
    }

    fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.state = CountdownState::default();
    }
}
