//! # User Store Client
//!
//! Thin client over a [`Table`]: one storage call per operation, typed
//! results. Built once at startup and shared by every request.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::cursor::Cursor;
use super::errors::{StoreError, StoreResult};
use super::table::{Item, ScanRequest, Table};
use crate::user::User;

/// Page size when the caller gives none
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// One page of users
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    pub users: Vec<User>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
}

/// Record store client for the users table
#[derive(Clone)]
pub struct UserStore {
    table: Arc<dyn Table>,
    table_name: String,
}

impl std::fmt::Debug for UserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStore")
            .field("table_name", &self.table_name)
            .finish_non_exhaustive()
    }
}

fn to_item(user: &User) -> StoreResult<Item> {
    match serde_json::to_value(user)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Corrupt(format!("user encoded as {}", other))),
    }
}

fn from_item(item: Item) -> StoreResult<User> {
    serde_json::from_value(Value::Object(item)).map_err(|e| StoreError::Corrupt(e.to_string()))
}

impl UserStore {
    pub fn new(table: Arc<dyn Table>, table_name: impl Into<String>) -> Self {
        Self {
            table,
            table_name: table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Store a new user under a freshly generated id.
    ///
    /// `name` and `email` are expected to be validated already; they are
    /// stored trimmed.
    pub async fn create(&self, name: &str, email: &str) -> StoreResult<User> {
        let user = User {
            user_id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            created_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            updated_at: None,
        };

        self.table.put_item(&self.table_name, to_item(&user)?).await?;
        Ok(user)
    }

    /// Read up to `limit` users, resuming after `cursor` when given.
    pub async fn list(&self, limit: Option<usize>, cursor: Option<&Cursor>) -> StoreResult<UserPage> {
        let request = ScanRequest {
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE),
            exclusive_start_key: cursor.map(|c| c.start_key().to_string()),
        };

        let output = self.table.scan(&self.table_name, request).await?;
        let users = output
            .items
            .into_iter()
            .map(from_item)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(UserPage {
            users,
            next_cursor: output.last_evaluated_key.map(Cursor::for_key),
        })
    }

    /// Point lookup. A missing user is `Ok(None)`.
    pub async fn get_by_id(&self, user_id: &str) -> StoreResult<Option<User>> {
        self.table
            .get_item(&self.table_name, user_id)
            .await?
            .map(from_item)
            .transpose()
    }

    /// Remove a user. Deleting an unknown id succeeds.
    pub async fn delete_by_id(&self, user_id: &str) -> StoreResult<()> {
        self.table.delete_item(&self.table_name, user_id).await
    }
}
