//! Persistence contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the metadata store (two whole-collection records) and the blob
//!   store (one payload per document id and kind).
//! - Isolate SQL and serialization details from the vault services.
//!
//! # Invariants
//! - Metadata loads are best effort and never fail.
//! - The two stores are not coupled transactionally.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod blob_repo;
pub mod metadata_repo;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from store writes and blob reads.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Collection could not be encoded or decoded.
    Serialization(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "invalid vault record encoding: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}
