use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::types::{Conversation, Entry, StoreData, UserId};
use crate::models::chat::Role;

/// Hard cap on stored entries per user
pub const MAX_ENTRIES_PER_USER: usize = 50;

/// Entries replayed to the provider when the caller does not choose
pub const DEFAULT_RECENT_LIMIT: usize = 8;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// File-backed conversation store.
///
/// Every call loads the whole file, touches one user's conversation and
/// writes the whole file back. Writers inside this process are serialized by
/// `write_lock`; separate processes sharing the file are last-writer-wins.
pub struct ConversationStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ConversationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!("Initializing conversation store at {}", path.display());
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Full history for a user, oldest first. Never fails.
    pub async fn get_conversation(&self, user_id: &str) -> Conversation {
        let user = UserId::from(user_id);
        self.load_all()
            .await
            .remove(user.as_str())
            .unwrap_or_default()
    }

    /// Last `limit` entries for a user, order preserved
    pub async fn get_recent(&self, user_id: &str, limit: usize) -> Conversation {
        let mut conversation = self.get_conversation(user_id).await;
        let start = conversation.len().saturating_sub(limit);
        conversation.split_off(start)
    }

    /// Append an entry, trim to the most recent 50 and persist the store.
    pub async fn add_entry(
        &self,
        user_id: &str,
        role: Role,
        content: impl Into<String>,
    ) -> Result<(), MemoryError> {
        let user = UserId::from(user_id);
        let _guard = self.write_lock.lock().await;

        let mut all = self.load_all().await;
        let conversation = all.entry(user.to_string()).or_default();
        push_capped(conversation, Entry::new(role, content));
        debug!(
            "Appended {} entry for user {} ({} stored)",
            role,
            user,
            conversation.len()
        );

        self.save_all(&all).await
    }

    /// Drop a user's whole conversation. Unknown users are a no-op.
    pub async fn clear_memory(&self, user_id: &str) -> Result<(), MemoryError> {
        let user = UserId::from(user_id);
        let _guard = self.write_lock.lock().await;

        let mut all = self.load_all().await;
        if all.remove(user.as_str()).is_none() {
            debug!("No conversation stored for user {}, nothing to clear", user);
            return Ok(());
        }

        info!("Clearing conversation for user {}", user);
        self.save_all(&all).await
    }

    async fn load_all(&self) -> StoreData {
        match self.read_store().await {
            Ok(data) => data,
            Err(e) => {
                warn!(
                    "Failed to load conversation store {}, treating as empty: {}",
                    self.path.display(),
                    e
                );
                StoreData::new()
            }
        }
    }

    async fn read_store(&self) -> Result<StoreData, MemoryError> {
        self.ensure_parent_dir().await?;

        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoreData::new()),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(StoreData::new());
        }

        decode_store(&raw)
    }

    async fn save_all(&self, data: &StoreData) -> Result<(), MemoryError> {
        self.ensure_parent_dir().await?;

        let json = serde_json::to_string_pretty(data)?;
        let temp_path = self.temp_path();

        fs::write(&temp_path, json).await?;
        fs::rename(&temp_path, &self.path).await?;

        Ok(())
    }

    async fn ensure_parent_dir(&self) -> Result<(), MemoryError> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                fs::create_dir_all(dir).await?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

/// Each user's list is decoded separately: malformed entries and non-list
/// values are dropped with a warning. Only an unparseable file or a
/// non-object root fails as a whole.
fn decode_store(raw: &str) -> Result<StoreData, MemoryError> {
    let users: BTreeMap<String, Value> = serde_json::from_str(raw)?;
    let mut data = StoreData::new();

    for (user, value) in users {
        let items = match value {
            Value::Array(items) => items,
            _ => {
                warn!("Skipping stored history for user {}: not a list", user);
                continue;
            }
        };

        let mut conversation = Conversation::with_capacity(items.len());
        for item in items {
            match serde_json::from_value::<Entry>(item) {
                Ok(entry) => conversation.push(entry),
                Err(e) => warn!("Dropping malformed entry for user {}: {}", user, e),
            }
        }
        data.insert(user, conversation);
    }

    Ok(data)
}

fn push_capped(conversation: &mut Conversation, entry: Entry) {
    conversation.push(entry);
    if conversation.len() > MAX_ENTRIES_PER_USER {
        let overflow = conversation.len() - MAX_ENTRIES_PER_USER;
        conversation.drain(..overflow);
    }
}
