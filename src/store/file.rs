//! # File-Backed Table
//!
//! Stores each table as one JSON document, `<data_dir>/<table>.json`,
//! mapping keys to items. Lets separate one-shot invocations see each
//! other's writes.
//!
//! Writes replace the whole file: a uniquely named temp file in the same
//! directory is written, fsynced and renamed over the table, then the
//! directory is fsynced. Readers never observe a half-written table.
//! Read-modify-write cycles hold an exclusive advisory lock on
//! `<table>.lock`, so concurrent processes sharing a data directory do
//! not lose each other's updates.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use tempfile::NamedTempFile;

use super::errors::{StoreError, StoreResult};
use super::table::{item_key, scan_ordered, Item, ScanOutput, ScanRequest, Table};

type Items = BTreeMap<String, Item>;

/// JSON-file table backend
#[derive(Debug, Clone)]
pub struct FileTable {
    data_dir: PathBuf,
}

impl FileTable {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    async fn read(&self, table: &str) -> StoreResult<Items> {
        let path = table_path(&self.data_dir, table)?;
        blocking(move || load(&path)).await
    }

    /// Apply `change` under the table lock; persist only when it reports
    /// a modification.
    async fn update<F>(&self, table: &str, change: F) -> StoreResult<()>
    where
        F: FnOnce(&mut Items) -> bool + Send + 'static,
    {
        let dir = self.data_dir.clone();
        let path = table_path(&dir, table)?;
        let lock_path = dir.join(format!("{}.lock", table));

        blocking(move || {
            fs::create_dir_all(&dir)?;
            let _lock = lock_exclusive(&lock_path)?;

            let mut items = load(&path)?;
            if change(&mut items) {
                persist(&dir, &path, &items)?;
            }
            Ok(())
        })
        .await
    }
}

fn table_path(dir: &Path, table: &str) -> StoreResult<PathBuf> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !table.starts_with('.');
    if !valid {
        return Err(StoreError::backend(format!("Invalid table name: '{}'", table)));
    }
    Ok(dir.join(format!("{}.json", table)))
}

/// Released when the returned handle is dropped
fn lock_exclusive(path: &Path) -> StoreResult<File> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    file.lock_exclusive()?;
    Ok(file)
}

fn load(path: &Path) -> StoreResult<Items> {
    match fs::read(path) {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e.into()),
    }
}

fn persist(dir: &Path, path: &Path, items: &Items) -> StoreResult<()> {
    let content = serde_json::to_vec_pretty(items)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(&content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| StoreError::Io(e.error))?;

    // fsync the directory so the rename is durable
    if let Ok(dir) = File::open(dir) {
        let _ = dir.sync_all();
    }
    Ok(())
}

async fn blocking<T, F>(work: F) -> StoreResult<T>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| StoreError::backend(format!("File task failed: {}", e)))?
}

#[async_trait]
impl Table for FileTable {
    async fn put_item(&self, table: &str, item: Item) -> StoreResult<()> {
        let key = item_key(&item)?;
        self.update(table, move |items| {
            items.insert(key, item);
            true
        })
        .await
    }

    async fn get_item(&self, table: &str, key: &str) -> StoreResult<Option<Item>> {
        let mut items = self.read(table).await?;
        Ok(items.remove(key))
    }

    async fn scan(&self, table: &str, request: ScanRequest) -> StoreResult<ScanOutput> {
        let items = self.read(table).await?;
        Ok(scan_ordered(&items, &request))
    }

    async fn delete_item(&self, table: &str, key: &str) -> StoreResult<()> {
        let key = key.to_string();
        self.update(table, move |items| items.remove(&key).is_some())
            .await
    }
}
