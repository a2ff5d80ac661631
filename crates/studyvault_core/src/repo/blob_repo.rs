//! Blob store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist opaque document payloads keyed by `(document id, blob kind)`.
//!
//! # Invariants
//! - Payload bytes are never inspected.
//! - A missing payload is `Ok(None)`, not an error.

use crate::db::{ensure_table, open_db, open_db_in_memory};
use crate::model::item::{BlobKind, ItemId};
use crate::model::now_epoch_ms;
use crate::repo::StoreResult;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Payload persistence for documents.
pub trait BlobStore {
    /// Inserts or replaces one payload.
    fn put_blob(&self, document_id: ItemId, kind: BlobKind, bytes: &[u8]) -> StoreResult<()>;
    /// Loads one payload.
    fn get_blob(&self, document_id: ItemId, kind: BlobKind) -> StoreResult<Option<Vec<u8>>>;
    /// Removes one payload. Returns whether a payload existed.
    fn delete_blob(&self, document_id: ItemId, kind: BlobKind) -> StoreResult<bool>;
}

impl<T: BlobStore + ?Sized> BlobStore for &T {
    fn put_blob(&self, document_id: ItemId, kind: BlobKind, bytes: &[u8]) -> StoreResult<()> {
        (**self).put_blob(document_id, kind, bytes)
    }

    fn get_blob(&self, document_id: ItemId, kind: BlobKind) -> StoreResult<Option<Vec<u8>>> {
        (**self).get_blob(document_id, kind)
    }

    fn delete_blob(&self, document_id: ItemId, kind: BlobKind) -> StoreResult<bool> {
        (**self).delete_blob(document_id, kind)
    }
}

/// SQLite-backed blob store over the `blobs` table.
pub struct SqliteBlobStore {
    conn: Connection,
}

impl SqliteBlobStore {
    /// Wraps a migrated connection.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        ensure_table(&conn, "blobs")?;
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
}

impl BlobStore for SqliteBlobStore {
    fn put_blob(&self, document_id: ItemId, kind: BlobKind, bytes: &[u8]) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO blobs (document_id, kind, bytes, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(document_id, kind) DO UPDATE SET
                bytes = excluded.bytes,
                updated_at = excluded.updated_at;",
            params![document_id.to_string(), kind.as_str(), bytes, now_epoch_ms()],
        )?;
        Ok(())
    }

    fn get_blob(&self, document_id: ItemId, kind: BlobKind) -> StoreResult<Option<Vec<u8>>> {
        let bytes = self
            .conn
            .query_row(
                "SELECT bytes FROM blobs WHERE document_id = ?1 AND kind = ?2;",
                params![document_id.to_string(), kind.as_str()],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(bytes)
    }

    fn delete_blob(&self, document_id: ItemId, kind: BlobKind) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM blobs WHERE document_id = ?1 AND kind = ?2;",
            params![document_id.to_string(), kind.as_str()],
        )?;
        Ok(changed > 0)
    }
}
