//! Background tasks module
//!
//! This module contains the tasks that run alongside the HTTP server.

pub mod completion_cue;
pub mod countdown_ticker;

// Re-export main functions
pub use completion_cue::completion_cue_task;
pub use countdown_ticker::{countdown_ticker_task, TICK_INTERVAL};
