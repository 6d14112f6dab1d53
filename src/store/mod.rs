//! Store Module
//!
//! Provides the in-memory item store and deadline classification.

mod item;
mod item_store;


// Re-export public types
pub use item::{DeadlineEvent, DeadlineState, Item};
pub use item_store::ItemStore;

// == Public Constants ==
/// Maximum allowed task description length in bytes
pub const MAX_TASK_LENGTH: usize = 1024;
