//! Persisted, non-negative count

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::store::{KeyValueStore, COUNT_VALUE_KEY};

pub type Count = u64;

/// Largest count the integer settings store can hold
pub const MAX_COUNT: Count = i64::MAX as Count;

/// Published after every successful mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountUpdate {
    pub count: Count,
    /// Decrement and reset controls are enabled whenever the count is non-zero
    pub controls_enabled: bool,
}

impl CountUpdate {
    pub fn new(count: Count) -> Self {
        Self {
            count,
            controls_enabled: count != 0,
        }
    }
}

/// Result of an operation that may be refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Changed(Count),
    /// Nothing was written or published
    Ineligible(Count),
}

impl Mutation {
    pub fn count(&self) -> Count {
        match *self {
            Mutation::Changed(count) | Mutation::Ineligible(count) => count,
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Mutation::Changed(_))
    }
}

/// Owns the count and writes it through to the key-value store
#[derive(Debug)]
pub struct CounterStore {
    store: Arc<dyn KeyValueStore>,
    count: Count,
}

impl CounterStore {
    /// Load the persisted count, defaulting to 0 when absent
    pub fn initialize(store: Arc<dyn KeyValueStore>) -> Self {
        let count = match store.get(COUNT_VALUE_KEY) {
            Some(value) if value < 0 => {
                warn!("Persisted count {} is negative, starting from 0", value);
                0
            }
            Some(value) => value as Count,
            None => 0,
        };
        debug!("Counter initialized at {}", count);

        Self { store, count }
    }

    pub fn count(&self) -> Count {
        self.count
    }

    pub fn controls_enabled(&self) -> bool {
        self.count != 0
    }

    pub fn count_update(&self) -> CountUpdate {
        CountUpdate::new(self.count)
    }

    /// Add one, holding at `MAX_COUNT` so the stored value always matches
    pub fn increment(&mut self) -> Count {
        self.commit(self.count.saturating_add(1).min(MAX_COUNT))
    }

    /// Refused at zero; the store is left untouched in that case
    pub fn decrement(&mut self) -> Mutation {
        match self.count.checked_sub(1) {
            Some(count) => Mutation::Changed(self.commit(count)),
            None => {
                debug!("Decrement ignored, count already 0");
                Mutation::Ineligible(self.count)
            }
        }
    }

    pub fn reset(&mut self) -> Count {
        self.commit(0)
    }

    fn commit(&mut self, count: Count) -> Count {
        self.count = count;
        self.store.set(COUNT_VALUE_KEY, count as i64);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn counter_with(store: &Arc<MemoryStore>) -> CounterStore {
        CounterStore::initialize(Arc::clone(store) as Arc<dyn KeyValueStore>)
    }

    #[test]
    fn test_initialize_defaults_to_zero() {
        let store = Arc::new(MemoryStore::new());
        let counter = counter_with(&store);
        assert_eq!(counter.count(), 0);
        assert!(!counter.controls_enabled());
        assert!(store.writes().is_empty());
    }

    #[test]
    fn test_initialize_reads_persisted_value() {
        let store = Arc::new(MemoryStore::with_value(COUNT_VALUE_KEY, 41));
        let counter = counter_with(&store);
        assert_eq!(counter.count(), 41);
        assert!(counter.controls_enabled());
    }

    #[test]
    fn test_initialize_clamps_negative_value() {
        let store = Arc::new(MemoryStore::with_value(COUNT_VALUE_KEY, -7));
        assert_eq!(counter_with(&store).count(), 0);
    }

    #[test]
    fn test_each_increment_persists_immediately() {
        let store = Arc::new(MemoryStore::new());
        let mut counter = counter_with(&store);

        for n in 1..=25 {
            assert_eq!(counter.increment(), n);
            assert_eq!(store.get(COUNT_VALUE_KEY), Some(n as i64));
        }
        assert_eq!(store.writes().len(), 25);
    }

    #[test]
    fn test_decrement_at_zero_is_ineligible_and_not_persisted() {
        let store = Arc::new(MemoryStore::new());
        let mut counter = counter_with(&store);

        assert_eq!(counter.decrement(), Mutation::Ineligible(0));
        assert_eq!(counter.count(), 0);
        assert!(store.writes().is_empty());
    }

    #[test]
    fn test_decrement_persists_when_changed() {
        let store = Arc::new(MemoryStore::with_value(COUNT_VALUE_KEY, 2));
        let mut counter = counter_with(&store);

        let mutation = counter.decrement();
        assert!(mutation.is_changed());
        assert_eq!(mutation.count(), 1);
        assert_eq!(counter.decrement(), Mutation::Changed(0));
        assert_eq!(counter.decrement(), Mutation::Ineligible(0));
        assert_eq!(store.writes().len(), 2);
    }

    #[test]
    fn test_reset_always_writes_zero() {
        let store = Arc::new(MemoryStore::with_value(COUNT_VALUE_KEY, 9));
        let mut counter = counter_with(&store);

        assert_eq!(counter.reset(), 0);
        assert_eq!(counter.reset(), 0);
        assert_eq!(store.writes().len(), 2);
        assert_eq!(store.get(COUNT_VALUE_KEY), Some(0));
    }

    #[test]
    fn test_count_update_carries_controls_enabled() {
        let store = Arc::new(MemoryStore::new());
        let mut counter = counter_with(&store);

        counter.increment();
        assert_eq!(
            counter.count_update(),
            CountUpdate {
                count: 1,
                controls_enabled: true
            }
        );

        counter.reset();
        assert_eq!(counter.count_update(), CountUpdate::new(0));
        assert!(!counter.count_update().controls_enabled);
    }

    #[test]
    fn test_increment_at_store_limit_matches_persisted_value() {
        let store = Arc::new(MemoryStore::with_value(COUNT_VALUE_KEY, i64::MAX));
        let mut counter = counter_with(&store);
        assert_eq!(counter.count(), MAX_COUNT);

        let count = counter.increment();
        assert_eq!(count, MAX_COUNT);
        assert_eq!(store.get(COUNT_VALUE_KEY), Some(count as i64));

        // A restart picks up exactly what the last increment returned
        assert_eq!(counter_with(&store).count(), count);

        assert_eq!(counter.decrement(), Mutation::Changed(MAX_COUNT - 1));
        assert_eq!(store.get(COUNT_VALUE_KEY), Some(i64::MAX - 1));
    }
}
