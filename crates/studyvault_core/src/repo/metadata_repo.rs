//! Metadata store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist the item collection and the study-progress collection as two
//!   independent key-value records.
//!
//! # Invariants
//! - Saves replace the whole record.
//! - Loads never fail: a missing or undecodable record yields an empty
//!   collection so the caller can seed defaults.

use crate::db::{ensure_table, open_db, open_db_in_memory};
use crate::model::item::Item;
use crate::model::now_epoch_ms;
use crate::model::progress::StudyProgress;
use crate::repo::StoreResult;
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Record key of the serialized item collection.
pub const ITEMS_KEY: &str = "items";
/// Record key of the serialized study-progress collection.
pub const PROGRESS_KEY: &str = "study_progress";

/// Whole-collection persistence for vault metadata.
pub trait MetadataStore {
    /// Replaces the persisted item collection.
    fn save_items(&self, items: &[Item]) -> StoreResult<()>;
    /// Loads the item collection; empty on any failure.
    fn load_items(&self) -> Vec<Item>;
    /// Replaces the persisted study-progress collection.
    fn save_progress(&self, records: &[StudyProgress]) -> StoreResult<()>;
    /// Loads the study-progress collection; empty on any failure.
    fn load_progress(&self) -> Vec<StudyProgress>;
}

impl<T: MetadataStore + ?Sized> MetadataStore for &T {
    fn save_items(&self, items: &[Item]) -> StoreResult<()> {
        (**self).save_items(items)
    }

    fn load_items(&self) -> Vec<Item> {
        (**self).load_items()
    }

    fn save_progress(&self, records: &[StudyProgress]) -> StoreResult<()> {
        (**self).save_progress(records)
    }

    fn load_progress(&self) -> Vec<StudyProgress> {
        (**self).load_progress()
    }
}

/// SQLite-backed metadata store over the `kv_records` table.
pub struct SqliteMetadataStore {
    conn: Connection,
}

impl SqliteMetadataStore {
    /// Wraps a migrated connection.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        ensure_table(&conn, "kv_records")?;
        Ok(Self { conn })
    }

    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Returns the stored JSON text for `key`, if any.
    pub fn raw_record(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_records WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save_collection<T: Serialize>(&self, key: &str, records: &[T]) -> StoreResult<()> {
        let encoded = serde_json::to_string(records)?;
        self.conn.execute(
            "INSERT INTO kv_records (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, encoded, now_epoch_ms()],
        )?;
        debug!(
            "event=metadata_save module=repo status=ok key={key} count={}",
            records.len()
        );
        Ok(())
    }

    fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.raw_record(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(
                    "event=metadata_load module=repo status=error key={key} error_code=read_failed error={err}"
                );
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    "event=metadata_load module=repo status=error key={key} error_code=decode_failed error={err}"
                );
                Vec::new()
            }
        }
    }
}

impl MetadataStore for SqliteMetadataStore {
    fn save_items(&self, items: &[Item]) -> StoreResult<()> {
        self.save_collection(ITEMS_KEY, items)
    }

    fn load_items(&self) -> Vec<Item> {
        self.load_collection(ITEMS_KEY)
    }

    fn save_progress(&self, records: &[StudyProgress]) -> StoreResult<()> {
        self.save_collection(PROGRESS_KEY, records)
    }

    fn load_progress(&self) -> Vec<StudyProgress> {
        self.load_collection(PROGRESS_KEY)
    }
}
