use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::chat::Role;

/// Key used when a request carries no user id
pub const ANONYMOUS_USER: &str = "anonymous";

/// One role-tagged message turn, immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    role: Role,
    content: String,
    #[serde(with = "iso_millis")]
    timestamp: DateTime<Utc>,
}

impl Entry {
    /// Create an entry stamped with the current time
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Ordered history for one user, oldest first
pub type Conversation = Vec<Entry>;

/// Entire persisted state: user id -> conversation
pub type StoreData = BTreeMap<String, Conversation>;

/// Normalized user identifier. Empty or absent ids collapse to `anonymous`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw {
            Some(id) if !id.is_empty() => Self(id.to_string()),
            _ => Self(ANONYMOUS_USER.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(raw: &str) -> Self {
        Self::normalize(Some(raw))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ISO-8601 UTC with millisecond precision (`2026-10-19T08:30:00.123Z`)
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
