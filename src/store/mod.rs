//! Key-value persistence for the counter
//!
//! The counter only needs a single integer setting, so the port is a tiny
//! `get`/`set` pair over named integers. Writes are best-effort: a backend that
//! cannot persist logs the failure and keeps going.

pub mod file;
pub mod memory;

pub use file::{FileStore, StorageError};
pub use memory::MemoryStore;

/// Key under which the count is persisted
pub const COUNT_VALUE_KEY: &str = "com.monzy.zhang.Counter.countValue";

/// Application-scoped integer settings store
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Read an integer setting, `None` if it was never written
    fn get(&self, key: &str) -> Option<i64>;

    /// Write an integer setting
    fn set(&self, key: &str, value: i64);
}
