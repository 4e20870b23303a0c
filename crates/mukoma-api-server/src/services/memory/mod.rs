//! Conversation memory module
//!
//! Provides the per-user conversation log persisted to a single JSON file:
//! - Whole-file load/modify/save on every operation
//! - 50-entry cap per user with oldest-first eviction
//! - Corrupt or missing files read as an empty store

mod store;
pub mod types;

pub use store::{ConversationStore, MemoryError, DEFAULT_RECENT_LIMIT, MAX_ENTRIES_PER_USER};
pub use types::{Conversation, Entry, StoreData, UserId, ANONYMOUS_USER};
