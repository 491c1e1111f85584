//! # User Record Store
//!
//! The data-access side of the service: a key-value [`Table`] seam with
//! two bundled backends, and the [`UserStore`] client the request
//! handler talks to.

pub mod client;
pub mod cursor;
pub mod errors;
pub mod file;
pub mod memory;
pub mod table;

pub use client::{UserPage, UserStore, DEFAULT_PAGE_SIZE};
pub use cursor::{Cursor, InvalidCursor};
pub use errors::{StoreError, StoreResult};
pub use file::FileTable;
pub use memory::MemoryTable;
pub use table::{Item, ScanOutput, ScanRequest, Table, KEY_ATTRIBUTE};
