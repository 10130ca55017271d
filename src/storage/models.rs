use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ShortCode = String;
pub type UserId = String;

/// A registry entry. Never physically removed; `deleted` marks a tombstone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub long_url: String,
    #[serde(default)]
    pub owner_id: Option<UserId>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl UrlRecord {
    pub fn new(long_url: impl Into<String>, owner_id: Option<UserId>) -> Self {
        Self {
            long_url: long_url.into(),
            owner_id,
            deleted: false,
            created_at: Utc::now(),
        }
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        !self.deleted
    }

    /// True when `user_id` created this record.
    #[inline]
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id.as_deref() == Some(user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_digest: String,
}
