//! Core domain logic for StudyVault.
//! This crate is the single source of truth for the virtual file system
//! invariants: item tree, recency list, study progress and persistence.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;

pub use config::{VaultSettings, DEFAULT_FOLDER_NAMES};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::item::{normalize_item_name, BlobKind, ContentKind, Item, ItemId, ItemKind};
pub use model::progress::StudyProgress;
pub use model::sort::{sort_items, SortOrder};
pub use notify::{LogNotifier, NoopNotifier, Notifier};
pub use repo::blob_repo::{BlobStore, SqliteBlobStore};
pub use repo::metadata_repo::{MetadataStore, SqliteMetadataStore};
pub use repo::{StoreError, StoreResult};
pub use service::progress_service::ProgressTracker;
pub use service::recent_service::{RecentTracker, DEFAULT_RECENT_LIMIT};
pub use service::tree_service::{ItemTree, TreeError, MAX_PATH_DEPTH};
pub use service::vault_service::{OpenedDocument, StudyVault, VaultError};

/// SQLite-backed vault used by the shipped hosts.
pub type SqliteVault<N = LogNotifier> = StudyVault<SqliteMetadataStore, SqliteBlobStore, N>;

/// Opens both stores on the database file at `path` and loads the vault.
pub fn open_sqlite_vault<N: Notifier>(
    path: impl AsRef<std::path::Path>,
    notifier: N,
    settings: VaultSettings,
) -> StoreResult<SqliteVault<N>> {
    let path = path.as_ref();
    let metadata = SqliteMetadataStore::open(path)?;
    let blobs = SqliteBlobStore::open(path)?;
    Ok(StudyVault::open(metadata, blobs, notifier, settings))
}

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
