//! Item Module
//!
//! Defines a tracked item and how its deadline state is classified.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// == Item ==
/// A tracked task with a deadline and a completion flag.
///
/// The deadline never changes after creation and `done` only ever moves
/// from `false` to `true`; [`ItemStore`](super::ItemStore) is the only
/// place that mutates an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Server-generated identifier
    pub id: String,
    /// Task description
    pub task: String,
    /// When the task is due
    pub deadline: DateTime<Utc>,
    /// Completion flag
    pub done: bool,
}

impl Item {
    // == Constructor ==
    /// Creates a new, not yet completed item with a fresh identifier.
    ///
    /// Identifiers are UUIDv7: ordered by creation time, and unique even when
    /// many items are created within the same millisecond.
    pub fn new(task: impl Into<String>, deadline: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            task: task.into(),
            deadline,
            done: false,
        }
    }

    /// Time left until the deadline; negative once it has passed.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        self.deadline - now
    }

    // == Deadline State ==
    /// Classifies the item at `now` against the approaching `window`.
    ///
    /// Boundary conditions: zero remaining counts as elapsed, and exactly
    /// `window` remaining counts as approaching.
    pub fn deadline_state(&self, now: DateTime<Utc>, window: Duration) -> DeadlineState {
        if self.done {
            return DeadlineState::Done;
        }

        let remaining = self.remaining(now);
        if remaining <= Duration::zero() {
            DeadlineState::Elapsed
        } else if remaining <= window {
            DeadlineState::Approaching(remaining)
        } else {
            DeadlineState::Pending
        }
    }
}

// == Deadline State ==
/// Where an item stands relative to its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineState {
    /// Already completed, ignored by sweeps
    Done,
    /// Deadline is further away than the approaching window
    Pending,
    /// Deadline is within the window; carries the remaining time
    Approaching(Duration),
    /// Deadline has passed
    Elapsed,
}

// == Deadline Event ==
/// What a sweep observed for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeadlineEvent {
    /// The item is inside the approaching window
    Approaching { item: Item, remaining: Duration },
    /// The item's deadline passed and it was flipped to done during this sweep
    Elapsed { item: Item },
}

impl DeadlineEvent {
    /// The item the event is about.
    pub fn item(&self) -> &Item {
        match self {
            DeadlineEvent::Approaching { item, .. } | DeadlineEvent::Elapsed { item } => item,
        }
    }

    pub fn is_elapsed(&self) -> bool {
        matches!(self, DeadlineEvent::Elapsed { .. })
    }
}
