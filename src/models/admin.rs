use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 管理员账号文档
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Admin {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}
