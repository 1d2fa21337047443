//! External side effects
//!
//! This module contains the audible cue played when a countdown completes.

pub mod alert;

// Re-export main functions
pub use alert::*;
