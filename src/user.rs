//! User record model

use serde::{Deserialize, Serialize};

/// A stored user record.
///
/// Field names follow the wire contract (`userId`, `createdAt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-generated identifier, immutable once set
    pub user_id: String,

    pub name: String,

    pub email: String,

    /// RFC 3339 creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Never written by this service; kept when present in stored items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Body of a create request after validation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
}
