//! # Table Abstraction
//!
//! The managed key-value table the user store talks to. Backends
//! provide single-key atomicity; nothing here spans two calls.

use std::collections::BTreeMap;
use std::ops::Bound;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::errors::{StoreError, StoreResult};

/// Attribute every item is keyed by
pub const KEY_ATTRIBUTE: &str = "userId";

/// A stored item: a flat attribute map
pub type Item = Map<String, Value>;

/// Parameters for a paginated scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    /// Maximum number of items to return; zero yields an empty page
    pub limit: usize,

    /// Resume strictly after this key
    pub exclusive_start_key: Option<String>,
}

/// One page of scan results
#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
    pub items: Vec<Item>,

    /// Present when more items remain after this page
    pub last_evaluated_key: Option<String>,
}

/// Key-value table operations.
///
/// `table` names the logical table so one backend can serve several.
#[async_trait]
pub trait Table: Send + Sync {
    /// Insert or replace an item by its key attribute
    async fn put_item(&self, table: &str, item: Item) -> StoreResult<()>;

    /// Point lookup
    async fn get_item(&self, table: &str, key: &str) -> StoreResult<Option<Item>>;

    /// Ordered, paginated read of the whole table
    async fn scan(&self, table: &str, request: ScanRequest) -> StoreResult<ScanOutput>;

    /// Remove an item; removing an absent key succeeds
    async fn delete_item(&self, table: &str, key: &str) -> StoreResult<()>;
}

/// Extract the key attribute of an item
pub fn item_key(item: &Item) -> StoreResult<String> {
    item.get(KEY_ATTRIBUTE)
        .and_then(Value::as_str)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .ok_or_else(|| StoreError::MissingKey(KEY_ATTRIBUTE.to_string()))
}

/// Scan an ordered map of items the way both bundled backends do.
pub(crate) fn scan_ordered(items: &BTreeMap<String, Item>, request: &ScanRequest) -> ScanOutput {
    let limit = request.limit;
    let lower = match &request.exclusive_start_key {
        Some(key) => Bound::Excluded(key.clone()),
        None => Bound::Unbounded,
    };

    let mut range = items.range((lower, Bound::Unbounded));
    let page: Vec<(&String, &Item)> = range.by_ref().take(limit).collect();
    let has_more = range.next().is_some();

    let last_evaluated_key = if has_more {
        page.last().map(|(key, _)| (*key).clone())
    } else {
        None
    };

    ScanOutput {
        items: page.into_iter().map(|(_, item)| item.clone()).collect(),
        last_evaluated_key,
    }
}
