//! # In-Memory Table
//!
//! Process-local table backend. Used by the HTTP server when no data
//! directory is configured, and by tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::errors::{StoreError, StoreResult};
use super::table::{item_key, scan_ordered, Item, ScanOutput, ScanRequest, Table};

/// Tables by name, items ordered by key
type Tables = HashMap<String, BTreeMap<String, Item>>;

/// In-memory key-value table backend
#[derive(Debug, Default, Clone)]
pub struct MemoryTable {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items in a table
    pub fn len(&self, table: &str) -> usize {
        self.tables
            .read()
            .map(|tables| tables.get(table).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::backend("Lock poisoned")
}

#[async_trait]
impl Table for MemoryTable {
    async fn put_item(&self, table: &str, item: Item) -> StoreResult<()> {
        let key = item_key(&item)?;
        let mut tables = self.tables.write().map_err(poisoned)?;
        tables.entry(table.to_string()).or_default().insert(key, item);
        Ok(())
    }

    async fn get_item(&self, table: &str, key: &str) -> StoreResult<Option<Item>> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables.get(table).and_then(|items| items.get(key)).cloned())
    }

    async fn scan(&self, table: &str, request: ScanRequest) -> StoreResult<ScanOutput> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables
            .get(table)
            .map(|items| scan_ordered(items, &request))
            .unwrap_or_default())
    }

    async fn delete_item(&self, table: &str, key: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        if let Some(items) = tables.get_mut(table) {
            items.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn item(value: Value) -> Item {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let table = MemoryTable::new();
        table
            .put_item("users", item(json!({"userId": "1", "name": "Ada"})))
            .await
            .unwrap();

        let found = table.get_item("users", "1").await.unwrap().unwrap();
        assert_eq!(found["name"], "Ada");
        assert_eq!(table.len("users"), 1);
    }

    #[tokio::test]
    async fn test_tables_are_isolated() {
        let table = MemoryTable::new();
        table.put_item("a", item(json!({"userId": "1"}))).await.unwrap();

        assert!(table.get_item("b", "1").await.unwrap().is_none());
        assert!(table.is_empty("b"));
    }

    #[tokio::test]
    async fn test_put_requires_key() {
        let table = MemoryTable::new();
        let result = table.put_item("users", item(json!({"name": "Ada"}))).await;
        assert!(matches!(result, Err(StoreError::MissingKey(_))));
        assert!(table.is_empty("users"));
    }

    #[tokio::test]
    async fn test_delete_absent_key_succeeds() {
        let table = MemoryTable::new();
        table.delete_item("users", "missing").await.unwrap();
        table.put_item("users", item(json!({"userId": "1"}))).await.unwrap();
        table.delete_item("users", "1").await.unwrap();
        table.delete_item("users", "1").await.unwrap();
        assert!(table.is_empty("users"));
    }

    #[tokio::test]
    async fn test_scan_unknown_table_is_empty() {
        let table = MemoryTable::new();
        let page = table
            .scan("nothing", ScanRequest { limit: 10, exclusive_start_key: None })
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert!(page.last_evaluated_key.is_none());
    }
}
