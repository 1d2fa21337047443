//! Counter - a persisted tally counter with a re-arming countdown
//!
//! The count survives restarts through a key-value store. An optional
//! countdown restarts on every increment and signals completion when it
//! reaches zero. Views drive the counter over HTTP and follow it through
//! server-sent events.

pub mod api;
pub mod config;
pub mod services;
pub mod state;
pub mod store;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::AppState;
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use utils::signals::shutdown_signal;
