//! Item Store Module
//!
//! In-memory mapping of tracked items; the single source of truth for
//! deadline state.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::store::{DeadlineEvent, DeadlineState, Item};

// == Item Store ==
/// Tracked items keyed by identifier.
///
/// Not synchronized on its own; the [`Hub`](crate::hub::Hub) owns it behind
/// its lock.
#[derive(Debug, Default)]
pub struct ItemStore {
    items: HashMap<String, Item>,
}

impl ItemStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Insert ==
    /// Creates and stores a new item, returning a copy of it.
    pub fn insert(&mut self, task: impl Into<String>, deadline: DateTime<Utc>) -> Item {
        let mut item = Item::new(task, deadline);
        // UUIDv7 collisions would need the same millisecond and random bits
        while self.items.contains_key(&item.id) {
            item = Item::new(item.task, item.deadline);
        }
        self.items.insert(item.id.clone(), item.clone());
        item
    }

    // == Get ==
    /// Returns the item with the given identifier, if tracked.
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    // == Complete ==
    /// Marks an item done.
    ///
    /// Returns `true` only when the flag actually flipped; unknown and
    /// already completed items are left untouched.
    pub fn complete(&mut self, id: &str) -> bool {
        match self.items.get_mut(id) {
            Some(item) if !item.done => {
                item.done = true;
                true
            }
            _ => false,
        }
    }

    // == Snapshot ==
    /// Returns a copy of every item, ordered by deadline then identifier.
    pub fn snapshot(&self) -> Vec<Item> {
        let mut items: Vec<Item> = self.items.values().cloned().collect();
        items.sort_by(|a, b| a.deadline.cmp(&b.deadline).then_with(|| a.id.cmp(&b.id)));
        items
    }

    // == Evaluate Deadlines ==
    /// Classifies every open item at `now`.
    ///
    /// Items whose deadline has passed are flipped to done here, so each one
    /// yields exactly one [`DeadlineEvent::Elapsed`] over the store's lifetime.
    /// Approaching items are reported on every call.
    pub fn evaluate_deadlines(&mut self, now: DateTime<Utc>, window: Duration) -> Vec<DeadlineEvent> {
        let mut events = Vec::new();

        for item in self.items.values_mut() {
            match item.deadline_state(now, window) {
                DeadlineState::Elapsed => {
                    item.done = true;
                    events.push(DeadlineEvent::Elapsed { item: item.clone() });
                }
                DeadlineState::Approaching(remaining) => {
                    events.push(DeadlineEvent::Approaching {
                        item: item.clone(),
                        remaining,
                    });
                }
                DeadlineState::Pending | DeadlineState::Done => {}
            }
        }

        events.sort_by(|a, b| a.item().deadline.cmp(&b.item().deadline));
        events
    }

    // == Counters ==
    /// Number of tracked items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items not yet done.
    pub fn pending(&self) -> usize {
        self.items.values().filter(|item| !item.done).count()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Duration {
        Duration::minutes(30)
    }

    #[test]
    fn test_store_new() {
        let store = ItemStore::new();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_insert_and_get() {
        let mut store = ItemStore::new();
        let deadline = Utc::now() + Duration::hours(1);

        let item = store.insert("task one", deadline);
        let stored = store.get(&item.id).unwrap();

        assert_eq!(stored, &item);
        assert_eq!(store.len(), 1);
        assert_eq!(store.pending(), 1);
    }

    #[test]
    fn test_store_complete() {
        let mut store = ItemStore::new();
        let item = store.insert("task", Utc::now());

        assert!(store.complete(&item.id));
        assert!(store.get(&item.id).unwrap().done);
        assert_eq!(store.pending(), 0);
    }

    #[test]
    fn test_store_complete_twice_is_noop() {
        let mut store = ItemStore::new();
        let item = store.insert("task", Utc::now());

        assert!(store.complete(&item.id));
        assert!(!store.complete(&item.id));
        assert!(store.get(&item.id).unwrap().done);
    }

    #[test]
    fn test_store_complete_unknown() {
        let mut store = ItemStore::new();
        assert!(!store.complete("missing"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_ordered_by_deadline() {
        let mut store = ItemStore::new();
        let now = Utc::now();
        store.insert("third", now + Duration::hours(3));
        store.insert("first", now + Duration::hours(1));
        store.insert("second", now + Duration::hours(2));

        let tasks: Vec<String> = store.snapshot().into_iter().map(|i| i.task).collect();
        assert_eq!(tasks, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut store = ItemStore::new();
        let item = store.insert("task", Utc::now() + Duration::hours(1));

        let snapshot = store.snapshot();
        store.complete(&item.id);

        assert!(!snapshot[0].done);
    }

    #[test]
    fn test_evaluate_flips_elapsed_once() {
        let mut store = ItemStore::new();
        let now = Utc::now();
        let item = store.insert("late", now - Duration::minutes(1));

        let first = store.evaluate_deadlines(now, window());
        assert_eq!(first.len(), 1);
        assert!(first[0].is_elapsed());
        assert!(first[0].item().done);
        assert!(store.get(&item.id).unwrap().done);

        let second = store.evaluate_deadlines(now, window());
        assert!(second.is_empty());
    }

    #[test]
    fn test_evaluate_repeats_approaching() {
        let mut store = ItemStore::new();
        let now = Utc::now();
        store.insert("soon", now + Duration::minutes(10));

        for minute in 0..3 {
            let at = now + Duration::minutes(minute);
            let events = store.evaluate_deadlines(at, window());
            assert_eq!(events.len(), 1);
            match &events[0] {
                DeadlineEvent::Approaching { remaining, .. } => {
                    assert_eq!(*remaining, Duration::minutes(10 - minute));
                }
                other => panic!("expected approaching, got {:?}", other),
            }
        }
        assert_eq!(store.pending(), 1);
    }

    #[test]
    fn test_evaluate_skips_pending_and_done() {
        let mut store = ItemStore::new();
        let now = Utc::now();
        store.insert("far away", now + Duration::hours(5));
        let done = store.insert("already done", now - Duration::hours(1));
        store.complete(&done.id);

        assert!(store.evaluate_deadlines(now, window()).is_empty());
    }
}
