//! Vault use-case service.
//!
//! # Responsibility
//! - Compose the item tree, recency list and progress tracker with the
//!   metadata and blob stores into the operations a UI calls.
//! - Own the navigation state (current folder, active sort order).
//!
//! # Invariants
//! - Every mutation updates memory first, then writes through to the stores.
//! - Store failures are logged and swallowed; memory stays authoritative.
//! - The current folder is always `None` or a folder reachable from root.
//!
//! # Concurrency
//! - All mutations take `&mut self`. Hosts sharing a vault across threads
//!   must put it behind one exclusive lock.

use crate::config::{VaultSettings, DEFAULT_FOLDER_NAMES};
use crate::model::item::{BlobKind, ContentKind, Item, ItemId, ItemKind};
use crate::model::progress::StudyProgress;
use crate::model::sort::SortOrder;
use crate::notify::Notifier;
use crate::repo::blob_repo::BlobStore;
use crate::repo::metadata_repo::MetadataStore;
use crate::service::progress_service::ProgressTracker;
use crate::service::recent_service::RecentTracker;
use crate::service::tree_service::{ItemTree, TreeError};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors surfaced to the UI as an "unavailable" state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// No item with this id.
    ItemNotFound(ItemId),
    /// Item exists but is not a folder.
    NotAFolder(ItemId),
    /// Item exists but carries no document payload.
    NotADocument(ItemId),
    /// Document item exists but its payload is missing or unreadable.
    ContentNotFound(ItemId),
    /// Tree invariant violation.
    Tree(TreeError),
}

impl Display for VaultError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::NotAFolder(id) => write!(f, "item is not a folder: {id}"),
            Self::NotADocument(id) => write!(f, "item is not a document: {id}"),
            Self::ContentNotFound(id) => write!(f, "document content not found: {id}"),
            Self::Tree(err) => write!(f, "{err}"),
        }
    }
}

impl Error for VaultError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Tree(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TreeError> for VaultError {
    fn from(value: TreeError) -> Self {
        match value {
            TreeError::ItemNotFound(id) => Self::ItemNotFound(id),
            other => Self::Tree(other),
        }
    }
}

/// Document payload handed to an external viewer or editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedDocument {
    pub item: Item,
    pub blob_kind: BlobKind,
    pub bytes: Vec<u8>,
}

/// The single owner of all mutable vault state.
pub struct StudyVault<M: MetadataStore, B: BlobStore, N: Notifier> {
    metadata: M,
    blobs: B,
    notifier: N,
    tree: ItemTree,
    recents: RecentTracker,
    progress: ProgressTracker,
    current_folder: Option<ItemId>,
    sort_order: SortOrder,
}

impl<M: MetadataStore, B: BlobStore, N: Notifier> StudyVault<M, B, N> {
    /// Loads persisted state, seeding default folders into an empty vault.
    pub fn open(metadata: M, blobs: B, notifier: N, settings: VaultSettings) -> Self {
        let (tree, skipped_items) = ItemTree::from_items(metadata.load_items());
        if skipped_items > 0 {
            warn!(
                "event=vault_open module=vault status=degraded duplicate_items={skipped_items}"
            );
        }
        let (progress, dropped_records) = ProgressTracker::from_records(metadata.load_progress());
        if dropped_records > 0 {
            warn!(
                "event=vault_open module=vault status=degraded duplicate_progress={dropped_records}"
            );
        }

        let mut vault = Self {
            metadata,
            blobs,
            notifier,
            tree,
            recents: RecentTracker::with_limit(settings.recent_limit),
            progress,
            current_folder: None,
            sort_order: settings.default_sort,
        };

        if vault.tree.is_empty() && settings.seed_defaults {
            vault.seed_defaults();
        }
        info!(
            "event=vault_open module=vault status=ok items={} progress_records={}",
            vault.tree.len(),
            vault.progress.records().len()
        );
        vault
    }

    fn seed_defaults(&mut self) {
        for name in DEFAULT_FOLDER_NAMES {
            if let Err(err) = self.tree.create_named(ItemKind::Folder, None, name) {
                error!("event=vault_seed module=vault status=error error={err}");
            }
        }
        self.persist_items();
        info!(
            "event=vault_seed module=vault status=ok folders={}",
            DEFAULT_FOLDER_NAMES.len()
        );
    }

    // ---- reads ----

    pub fn tree(&self) -> &ItemTree {
        &self.tree
    }

    pub fn get_item(&self, id: ItemId) -> Option<&Item> {
        self.tree.get(id)
    }

    pub fn current_folder(&self) -> Option<ItemId> {
        self.current_folder
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Children of the current folder in the active sort order.
    pub fn current_items(&self) -> Vec<Item> {
        self.tree.children_of(self.current_folder, self.sort_order)
    }

    /// Children of any folder (or root) in the active sort order.
    pub fn children_of(&self, parent_id: Option<ItemId>) -> Vec<Item> {
        self.tree.children_of(parent_id, self.sort_order)
    }

    /// Breadcrumb names of the current folder; empty at root.
    pub fn breadcrumbs(&self) -> Vec<String> {
        self.current_folder
            .map(|id| self.tree.resolve_path_to(id))
            .unwrap_or_default()
    }

    pub fn recent_items(&self) -> Vec<Item> {
        self.recents.list(&self.tree)
    }

    pub fn search(&self, query: &str) -> Vec<Item> {
        self.tree.search(query, self.sort_order)
    }

    pub fn study_progress(&self, document_id: ItemId) -> Option<&StudyProgress> {
        self.progress.get(document_id)
    }

    pub fn top_recent_progress(&self, limit: usize) -> Vec<(Item, StudyProgress)> {
        self.progress.top_recent(&self.tree, limit)
    }

    // ---- creation ----

    /// Creates "New Folder" in the current folder.
    pub fn create_folder(&mut self) -> Result<Item, VaultError> {
        let folder = self.tree.create(ItemKind::Folder, self.current_folder)?;
        self.persist_items();
        info!("event=item_create module=vault status=ok kind=folder");
        self.notifier
            .notify("Folder created", &format!("\"{}\" was added.", folder.name));
        Ok(folder)
    }

    /// Creates an empty note in the current folder.
    pub fn create_note(&mut self) -> Result<Item, VaultError> {
        self.create_empty_document(ItemKind::NOTE)
    }

    /// Creates an empty whiteboard in the current folder.
    pub fn create_whiteboard(&mut self) -> Result<Item, VaultError> {
        self.create_empty_document(ItemKind::Whiteboard)
    }

    fn create_empty_document(&mut self, kind: ItemKind) -> Result<Item, VaultError> {
        let item = self.tree.create(kind, self.current_folder)?;
        self.write_blob(&item, &[]);
        self.persist_items();
        info!(
            "event=item_create module=vault status=ok kind={}",
            kind.label()
        );
        Ok(item)
    }

    /// Stores `bytes` under a new file item named after `name`.
    ///
    /// The payload is written before the item record so a crash leaves at
    /// worst an unreferenced blob.
    pub fn import_document(
        &mut self,
        name: &str,
        content_kind: ContentKind,
        bytes: &[u8],
    ) -> Result<Item, VaultError> {
        let kind = ItemKind::File { content_kind };
        let item = self.tree.create_named(kind, self.current_folder, name)?;
        self.write_blob(&item, bytes);
        self.persist_items();
        info!(
            "event=document_import module=vault status=ok kind={} bytes={}",
            kind.label(),
            bytes.len()
        );
        self.notifier
            .notify("Document imported", &format!("\"{}\" is ready.", item.name));
        Ok(item)
    }

    // ---- mutation ----

    /// Renames one item.
    ///
    /// Returns `Ok(None)` when the name is blank: the edit is cancelled and
    /// nothing changes.
    pub fn rename_item(&mut self, id: ItemId, new_name: &str) -> Result<Option<Item>, VaultError> {
        match self.tree.rename(id, new_name) {
            Ok(item) => {
                self.persist_items();
                debug!(
                    "event=item_rename module=vault status=ok kind={}",
                    item.kind.label()
                );
                Ok(Some(item))
            }
            Err(TreeError::InvalidName) => {
                debug!("event=item_rename module=vault status=cancelled reason=blank_name");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Moves one item under another folder, or to root with `None`.
    pub fn move_item(
        &mut self,
        id: ItemId,
        new_parent_id: Option<ItemId>,
    ) -> Result<Item, VaultError> {
        let item = self.tree.move_item(id, new_parent_id)?;
        self.reset_navigation_if_unreachable();
        self.persist_items();
        debug!("event=item_move module=vault status=ok");
        Ok(item)
    }

    /// Deletes exactly the listed items and their payloads.
    ///
    /// Children of deleted folders are left in place as orphans.
    pub fn delete_items(&mut self, ids: &HashSet<ItemId>) -> Vec<Item> {
        let removed = self.tree.delete(ids);
        if removed.is_empty() {
            return removed;
        }

        self.recents.forget(ids);
        for item in &removed {
            if let Some(kind) = item.kind.blob_kind() {
                if let Err(err) = self.blobs.delete_blob(item.id, kind) {
                    error!(
                        "event=blob_delete module=vault status=error kind={} error={err}",
                        kind.as_str()
                    );
                }
            }
        }
        self.reset_navigation_if_unreachable();
        self.persist_items();
        info!(
            "event=item_delete module=vault status=ok count={}",
            removed.len()
        );
        self.notifier.notify(
            "Items deleted",
            &format!("{} item(s) removed.", removed.len()),
        );
        removed
    }

    // ---- navigation ----

    pub fn enter_folder(&mut self, id: ItemId) -> Result<(), VaultError> {
        let item = self.tree.get(id).ok_or(VaultError::ItemNotFound(id))?;
        if !item.is_folder() {
            return Err(VaultError::NotAFolder(id));
        }
        // Orphaned folders are gone as far as navigation is concerned.
        if !self.tree.is_reachable_from_root(id) {
            return Err(VaultError::ItemNotFound(id));
        }
        self.current_folder = Some(id);
        Ok(())
    }

    /// Moves to the parent of the current folder. Returns the new folder.
    pub fn navigate_up(&mut self) -> Option<ItemId> {
        self.current_folder = self
            .current_folder
            .and_then(|id| self.tree.get(id))
            .and_then(|folder| folder.parent_id)
            .filter(|parent_id| self.tree.get(*parent_id).is_some());
        self.current_folder
    }

    pub fn navigate_to_root(&mut self) {
        self.current_folder = None;
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.sort_order = order;
    }

    // ---- documents ----

    /// Loads a document payload and records it as recently opened.
    pub fn open_document(&mut self, id: ItemId) -> Result<OpenedDocument, VaultError> {
        let item = self.tree.get(id).ok_or(VaultError::ItemNotFound(id))?.clone();
        let blob_kind = item.kind.blob_kind().ok_or(VaultError::NotADocument(id))?;

        let bytes = match self.blobs.get_blob(id, blob_kind) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                warn!(
                    "event=document_open module=vault status=error kind={} error_code=content_not_found",
                    blob_kind.as_str()
                );
                return Err(VaultError::ContentNotFound(id));
            }
            Err(err) => {
                error!(
                    "event=document_open module=vault status=error kind={} error_code=blob_read_failed error={err}",
                    blob_kind.as_str()
                );
                return Err(VaultError::ContentNotFound(id));
            }
        };

        self.recents.record_open(id);
        Ok(OpenedDocument {
            item,
            blob_kind,
            bytes,
        })
    }

    /// Replaces a document payload pushed back by an editor.
    pub fn save_document(&mut self, id: ItemId, bytes: &[u8]) -> Result<Item, VaultError> {
        let item = self.tree.get(id).ok_or(VaultError::ItemNotFound(id))?;
        if !item.is_document() {
            return Err(VaultError::NotADocument(id));
        }
        let item = self.tree.touch(id)?;
        self.write_blob(&item, bytes);
        self.persist_items();
        Ok(item)
    }

    // ---- progress ----

    /// Adds study minutes to a document and persists all progress records.
    pub fn record_study_time(
        &mut self,
        document_id: ItemId,
        minutes: u64,
    ) -> Result<StudyProgress, VaultError> {
        self.ensure_document(document_id)?;
        let record = self.progress.record_study_time(document_id, minutes);
        self.persist_progress();
        debug!(
            "event=study_time module=vault status=ok minutes={minutes} total={}",
            record.total_time_spent
        );
        Ok(record)
    }

    /// Marks a section as completed. `None` when the document has no record.
    pub fn mark_section_completed(&mut self, document_id: ItemId, section: &str) -> Option<bool> {
        let added = self.progress.mark_section_completed(document_id, section)?;
        if added {
            self.persist_progress();
        }
        Some(added)
    }

    // ---- helpers ----

    fn ensure_document(&self, id: ItemId) -> Result<&Item, VaultError> {
        let item = self.tree.get(id).ok_or(VaultError::ItemNotFound(id))?;
        if !item.is_document() {
            return Err(VaultError::NotADocument(id));
        }
        Ok(item)
    }

    fn reset_navigation_if_unreachable(&mut self) {
        let Some(current) = self.current_folder else {
            return;
        };
        if !self.tree.is_reachable_from_root(current) {
            debug!("event=navigation_reset module=vault status=ok reason=folder_unreachable");
            self.current_folder = None;
        }
    }

    fn write_blob(&self, item: &Item, bytes: &[u8]) {
        let Some(kind) = item.kind.blob_kind() else {
            return;
        };
        if let Err(err) = self.blobs.put_blob(item.id, kind, bytes) {
            error!(
                "event=blob_write module=vault status=error kind={} error={err}",
                kind.as_str()
            );
        }
    }

    fn persist_items(&self) {
        if let Err(err) = self.metadata.save_items(self.tree.items()) {
            error!("event=metadata_save module=vault status=error record=items error={err}");
        }
    }

    fn persist_progress(&self) {
        if let Err(err) = self.metadata.save_progress(self.progress.records()) {
            error!("event=metadata_save module=vault status=error record=progress error={err}");
        }
    }
}
