//! State management module
//!
//! The counter, its countdown and the hub that serialises every transition
//! between them.

pub mod app_state;
pub mod countdown;
pub mod counter;
pub mod snapshot;

// Re-export main types
pub use app_state::AppState;
pub use countdown::{
    CountdownConfig, CountdownController, CountdownEvent, CountdownPhase, CountdownState,
    Generation, TimerCommand, Transition,
};
pub use counter::{Count, CountUpdate, CounterStore, Mutation, MAX_COUNT};
pub use snapshot::{CounterEvent, CounterSnapshot};
