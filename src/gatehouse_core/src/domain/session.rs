use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-side session record.
///
/// Its presence in the key-value store is the single source of truth for
/// whether tokens carrying this session id are still valid; deleting it
/// revokes every access and refresh token bound to the session at once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: String,
    pub user_id: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}
