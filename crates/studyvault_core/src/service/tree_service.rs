//! In-memory item tree.
//!
//! # Responsibility
//! - Own the flat item collection and arrange it into a tree through
//!   `parent_id` links.
//! - Provide create, rename, move, delete, listing and breadcrumb
//!   operations.
//!
//! # Invariants
//! - Item ids are unique within the collection.
//! - A parent, when set by this module, exists and is a folder.
//! - Moves never create parent-child cycles.
//! - Deleting a folder does not touch its children; they become orphans
//!   that stay addressable by id but are never listed as children.

use crate::model::item::{normalize_item_name, Item, ItemId, ItemKind};
use crate::model::sort::{sort_items, SortOrder};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upper bound on parent hops when walking towards the root.
pub const MAX_PATH_DEPTH: usize = 64;

/// Errors from tree operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Name is blank after trim.
    InvalidName,
    /// Target item does not exist.
    ItemNotFound(ItemId),
    /// Parent item does not exist.
    ParentNotFound(ItemId),
    /// Parent exists but is not a folder.
    ParentMustBeFolder(ItemId),
    /// An item with the same id is already present.
    DuplicateId(ItemId),
    /// Move would make an item its own ancestor.
    CycleDetected { item_id: ItemId, parent_id: ItemId },
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "item name must not be blank"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::ParentNotFound(id) => write!(f, "parent not found: {id}"),
            Self::ParentMustBeFolder(id) => write!(f, "parent must be a folder: {id}"),
            Self::DuplicateId(id) => write!(f, "duplicate item id: {id}"),
            Self::CycleDetected { item_id, parent_id } => write!(
                f,
                "move would create cycle: item {item_id} under parent {parent_id}"
            ),
        }
    }
}

impl Error for TreeError {}

/// Flat item collection kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ItemTree {
    items: Vec<Item>,
}

impl ItemTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from persisted items, skipping repeated ids.
    ///
    /// Returns the tree and the number of skipped items.
    pub fn from_items(items: Vec<Item>) -> (Self, usize) {
        let mut tree = Self::new();
        let mut skipped = 0;
        for item in items {
            if tree.insert(item).is_err() {
                skipped += 1;
            }
        }
        (tree, skipped)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in insertion order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Appends an existing item. Parent links are taken as-is.
    pub fn insert(&mut self, item: Item) -> Result<(), TreeError> {
        if self.get(item.id).is_some() {
            return Err(TreeError::DuplicateId(item.id));
        }
        self.items.push(item);
        Ok(())
    }

    /// Creates an item of `kind` with its default name.
    pub fn create(
        &mut self,
        kind: ItemKind,
        parent_id: Option<ItemId>,
    ) -> Result<Item, TreeError> {
        self.create_with_name(kind, parent_id, kind.default_name().to_string())
    }

    /// Creates an item with a user supplied name, normalized for `kind`.
    pub fn create_named(
        &mut self,
        kind: ItemKind,
        parent_id: Option<ItemId>,
        name: &str,
    ) -> Result<Item, TreeError> {
        let name = normalize_item_name(kind, name).ok_or(TreeError::InvalidName)?;
        self.create_with_name(kind, parent_id, name)
    }

    fn create_with_name(
        &mut self,
        kind: ItemKind,
        parent_id: Option<ItemId>,
        name: String,
    ) -> Result<Item, TreeError> {
        if let Some(parent_id) = parent_id {
            self.ensure_parent_is_folder(parent_id)?;
        }
        let item = Item::new(kind, name, parent_id);
        self.insert(item.clone())?;
        Ok(item)
    }

    /// Items whose parent is `parent_id`, ordered by `order`.
    ///
    /// Only folders reachable from root have children; orphans stay
    /// addressable through `get`.
    pub fn children_of(&self, parent_id: Option<ItemId>, order: SortOrder) -> Vec<Item> {
        if let Some(parent_id) = parent_id {
            let is_folder = self.get(parent_id).is_some_and(Item::is_folder);
            if !is_folder || !self.is_reachable_from_root(parent_id) {
                return Vec::new();
            }
        }
        let mut children: Vec<Item> = self
            .items
            .iter()
            .filter(|item| item.parent_id == parent_id)
            .cloned()
            .collect();
        sort_items(&mut children, order);
        children
    }

    /// Renames one item, applying the suffix rule of its kind.
    pub fn rename(&mut self, id: ItemId, new_name: &str) -> Result<Item, TreeError> {
        let item = self.get_mut(id).ok_or(TreeError::ItemNotFound(id))?;
        let name = normalize_item_name(item.kind, new_name).ok_or(TreeError::InvalidName)?;
        item.name = name;
        item.touch();
        Ok(item.clone())
    }

    /// Marks an item as modified after its content was replaced.
    pub fn touch(&mut self, id: ItemId) -> Result<Item, TreeError> {
        let item = self.get_mut(id).ok_or(TreeError::ItemNotFound(id))?;
        item.touch();
        Ok(item.clone())
    }

    /// Moves one item under `new_parent_id` (`None` moves it to root).
    pub fn move_item(
        &mut self,
        id: ItemId,
        new_parent_id: Option<ItemId>,
    ) -> Result<Item, TreeError> {
        if self.get(id).is_none() {
            return Err(TreeError::ItemNotFound(id));
        }
        if let Some(parent_id) = new_parent_id {
            if parent_id == id {
                return Err(TreeError::CycleDetected {
                    item_id: id,
                    parent_id,
                });
            }
            self.ensure_parent_is_folder(parent_id)?;
            if self.is_ancestor_or_cycle(id, parent_id) {
                return Err(TreeError::CycleDetected {
                    item_id: id,
                    parent_id,
                });
            }
        }

        let item = self.get_mut(id).ok_or(TreeError::ItemNotFound(id))?;
        item.parent_id = new_parent_id;
        item.touch();
        Ok(item.clone())
    }

    /// Removes exactly the listed items and returns them.
    ///
    /// Children of removed folders keep their dangling `parent_id`.
    pub fn delete(&mut self, ids: &HashSet<ItemId>) -> Vec<Item> {
        let mut removed = Vec::new();
        self.items.retain(|item| {
            if ids.contains(&item.id) {
                removed.push(item.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Root-to-leaf names ending with the item itself.
    ///
    /// Unknown ids yield an empty path. The walk stops silently at
    /// `MAX_PATH_DEPTH` hops, on a revisited id, or at a missing parent.
    pub fn resolve_path_to(&self, id: ItemId) -> Vec<String> {
        let mut names = Vec::new();
        let mut visited = HashSet::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if names.len() >= MAX_PATH_DEPTH || !visited.insert(current) {
                break;
            }
            let Some(item) = self.get(current) else {
                break;
            };
            names.push(item.name.clone());
            cursor = item.parent_id;
        }
        names.reverse();
        names
    }

    /// Items whose name contains `query`, ignoring case.
    pub fn search(&self, query: &str, order: SortOrder) -> Vec<Item> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        let mut hits: Vec<Item> = self
            .items
            .iter()
            .filter(|item| item.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        sort_items(&mut hits, order);
        hits
    }

    /// Items whose parent id no longer resolves to a folder.
    pub fn orphans(&self) -> Vec<Item> {
        self.items
            .iter()
            .filter(|item| match item.parent_id {
                Some(parent_id) => !self.get(parent_id).is_some_and(Item::is_folder),
                None => false,
            })
            .cloned()
            .collect()
    }

    /// Whether every ancestor of `id` resolves, ending at root.
    pub fn is_reachable_from_root(&self, id: ItemId) -> bool {
        let mut visited = HashSet::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if !visited.insert(current) {
                return false;
            }
            match self.get(current) {
                Some(item) => cursor = item.parent_id,
                None => return false,
            }
        }
        true
    }

    fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    fn ensure_parent_is_folder(&self, parent_id: ItemId) -> Result<(), TreeError> {
        let parent = self
            .get(parent_id)
            .ok_or(TreeError::ParentNotFound(parent_id))?;
        if !parent.is_folder() {
            return Err(TreeError::ParentMustBeFolder(parent_id));
        }
        Ok(())
    }

    fn is_ancestor_or_cycle(&self, id: ItemId, candidate_parent_id: ItemId) -> bool {
        let mut visited = HashSet::new();
        let mut cursor = Some(candidate_parent_id);
        while let Some(current) = cursor {
            if current == id || !visited.insert(current) {
                return true;
            }
            cursor = self.get(current).and_then(|item| item.parent_id);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::{ItemTree, TreeError, MAX_PATH_DEPTH};
    use crate::model::item::{Item, ItemKind};
    use crate::model::sort::SortOrder;
    use std::collections::HashSet;

    #[test]
    fn resolve_path_stops_on_cycle() {
        let mut a = Item::new(ItemKind::Folder, "A", None);
        let mut b = Item::new(ItemKind::Folder, "B", None);
        a.parent_id = Some(b.id);
        b.parent_id = Some(a.id);
        let a_id = a.id;
        let (tree, skipped) = ItemTree::from_items(vec![a, b]);
        assert_eq!(skipped, 0);

        let path = tree.resolve_path_to(a_id);
        assert_eq!(path, vec!["B".to_string(), "A".to_string()]);
    }

    #[test]
    fn resolve_path_is_capped() {
        let mut tree = ItemTree::new();
        let mut parent = None;
        for _ in 0..(MAX_PATH_DEPTH + 10) {
            let folder = tree.create(ItemKind::Folder, parent).expect("create folder");
            parent = Some(folder.id);
        }
        let leaf = parent.expect("leaf folder");
        assert_eq!(tree.resolve_path_to(leaf).len(), MAX_PATH_DEPTH);
    }

    #[test]
    fn children_of_unreachable_folder_is_empty() {
        let mut tree = ItemTree::new();
        let outer = tree.create(ItemKind::Folder, None).expect("outer");
        let inner = tree.create(ItemKind::Folder, Some(outer.id)).expect("inner");
        let note = tree.create(ItemKind::NOTE, Some(inner.id)).expect("note");
        assert_eq!(
            tree.children_of(Some(inner.id), SortOrder::NameAscending),
            vec![note.clone()]
        );
        assert!(tree
            .children_of(Some(note.id), SortOrder::NameAscending)
            .is_empty());

        tree.delete(&HashSet::from([outer.id]));
        assert!(!tree.is_reachable_from_root(inner.id));
        assert!(tree
            .children_of(Some(inner.id), SortOrder::NameAscending)
            .is_empty());
        assert_eq!(tree.get(note.id), Some(&note));
    }

    #[test]
    fn deep_folders_stay_reachable() {
        let mut tree = ItemTree::new();
        let mut parent = None;
        for _ in 0..(MAX_PATH_DEPTH + 10) {
            let folder = tree.create(ItemKind::Folder, parent).expect("create folder");
            parent = Some(folder.id);
        }
        let leaf = parent.expect("leaf folder");
        let note = tree.create(ItemKind::NOTE, Some(leaf)).expect("note");
        assert!(tree.is_reachable_from_root(leaf));
        assert_eq!(tree.children_of(Some(leaf), SortOrder::NameAscending), vec![note]);
    }

    #[test]
    fn from_items_skips_duplicate_ids() {
        let item = Item::new(ItemKind::Folder, "F", None);
        let (tree, skipped) = ItemTree::from_items(vec![item.clone(), item]);
        assert_eq!(tree.len(), 1);
        assert_eq!(skipped, 1);
    }

    #[test]
    fn move_rejects_descendant_parent() {
        let mut tree = ItemTree::new();
        let outer = tree.create(ItemKind::Folder, None).expect("outer");
        let inner = tree.create(ItemKind::Folder, Some(outer.id)).expect("inner");

        let err = tree.move_item(outer.id, Some(inner.id)).unwrap_err();
        assert_eq!(
            err,
            TreeError::CycleDetected {
                item_id: outer.id,
                parent_id: inner.id
            }
        );
        let err = tree.move_item(outer.id, Some(outer.id)).unwrap_err();
        assert!(matches!(err, TreeError::CycleDetected { .. }));
    }

    #[test]
    fn search_matches_case_insensitive_substrings() {
        let mut tree = ItemTree::new();
        tree.create_named(ItemKind::NOTE, None, "Biology").expect("note");
        tree.create_named(ItemKind::PDF, None, "bio paper").expect("pdf");
        tree.create_named(ItemKind::Folder, None, "History").expect("folder");

        let names: Vec<_> = tree
            .search("BIO", SortOrder::NameAscending)
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, vec!["bio paper.pdf", "Biology.notes"]);
        assert!(tree.search("  ", SortOrder::NameAscending).is_empty());
    }
}
