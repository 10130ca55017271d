//! API 类型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{ShortCode, UrlRecord, UserId};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// `longURL` form body for create and update
#[derive(Deserialize, Clone, Debug)]
pub struct UrlForm {
    #[serde(rename = "longURL", default)]
    pub long_url: String,
}

/// Login and registration form body
#[derive(Deserialize, Clone, Debug)]
pub struct CredentialsForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// One record as shown to its owner
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UrlDetail {
    pub short_code: ShortCode,
    pub short_url: String,
    pub long_url: String,
    pub owner_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl UrlDetail {
    pub fn new(short_code: ShortCode, record: UrlRecord) -> Self {
        Self {
            short_url: format!("/u/{}", short_code),
            short_code,
            long_url: record.long_url,
            owner_id: record.owner_id,
            created_at: record.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UrlListResponse {
    pub total: usize,
    pub urls: Vec<UrlDetail>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub records: usize,
    pub live_records: usize,
    pub users: usize,
}
