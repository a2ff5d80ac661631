//! Item domain model for the virtual file system.
//!
//! # Responsibility
//! - Define the folder/file/whiteboard node record.
//! - Own the naming convention for each item kind.
//!
//! # Invariants
//! - `id` is stable and never reused for another item.
//! - A content kind exists only for `ItemKind::File`.
//! - Document names carry their type suffix exactly once.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::now_epoch_ms;

/// Stable identifier for every vault item.
pub type ItemId = Uuid;

/// Payload type of a file item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Imported PDF document.
    Pdf,
    /// Plain-text study note.
    Note,
}

impl ContentKind {
    /// Name suffix required on files of this content kind.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Note => ".notes",
        }
    }
}

/// Node variant. The content kind only exists for files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    Folder,
    File { content_kind: ContentKind },
    Whiteboard,
}

impl ItemKind {
    pub const PDF: Self = Self::File {
        content_kind: ContentKind::Pdf,
    };
    pub const NOTE: Self = Self::File {
        content_kind: ContentKind::Note,
    };

    /// Suffix that must terminate the item name, `None` for folders.
    pub fn required_suffix(self) -> Option<&'static str> {
        match self {
            Self::Folder => None,
            Self::File { content_kind } => Some(content_kind.suffix()),
            Self::Whiteboard => Some(".whiteboard"),
        }
    }

    /// Blob slot holding this item's payload, `None` for folders.
    pub fn blob_kind(self) -> Option<BlobKind> {
        match self {
            Self::Folder => None,
            Self::File {
                content_kind: ContentKind::Pdf,
            } => Some(BlobKind::Pdf),
            Self::File {
                content_kind: ContentKind::Note,
            } => Some(BlobKind::NoteText),
            Self::Whiteboard => Some(BlobKind::Drawing),
        }
    }

    /// Name given to freshly created items of this kind.
    pub fn default_name(self) -> &'static str {
        match self {
            Self::Folder => "New Folder",
            Self::File {
                content_kind: ContentKind::Pdf,
            } => "New Document.pdf",
            Self::File {
                content_kind: ContentKind::Note,
            } => "New Note.notes",
            Self::Whiteboard => "New Whiteboard.whiteboard",
        }
    }

    pub fn is_folder(self) -> bool {
        matches!(self, Self::Folder)
    }

    /// Short label for logs and host-facing envelopes.
    pub fn label(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::File {
                content_kind: ContentKind::Pdf,
            } => "pdf",
            Self::File {
                content_kind: ContentKind::Note,
            } => "note",
            Self::Whiteboard => "whiteboard",
        }
    }
}

/// Storage slot for an opaque document payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlobKind {
    Pdf,
    NoteText,
    Drawing,
}

impl BlobKind {
    /// Stable storage label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::NoteText => "note_text",
            Self::Drawing => "drawing",
        }
    }
}

/// One node of the virtual file system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Display name, suffixed for documents.
    pub name: String,
    pub kind: ItemKind,
    /// `None` means root level. Must point at a folder when set.
    pub parent_id: Option<ItemId>,
    /// Epoch ms, immutable after construction.
    pub date_created: i64,
    /// Epoch ms, bumped on rename, move and content replacement.
    pub date_modified: i64,
}

impl Item {
    /// Creates an item with a generated id and both timestamps set to now.
    ///
    /// `name` is stored as given; callers normalize it first.
    pub fn new(kind: ItemKind, name: impl Into<String>, parent_id: Option<ItemId>) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            parent_id,
            date_created: now,
            date_modified: now,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind.is_folder()
    }

    /// Whether the item carries a payload in the blob store.
    pub fn is_document(&self) -> bool {
        self.kind.blob_kind().is_some()
    }

    pub(crate) fn touch(&mut self) {
        // Keep `date_modified` monotonic even when two touches share a millisecond.
        self.date_modified = now_epoch_ms().max(self.date_modified);
    }
}

/// Applies the naming convention of `kind` to a user supplied name.
///
/// Returns `None` when the name is blank after trimming. Folder names are
/// kept verbatim. A document name made only of its suffix stays the bare
/// suffix.
/// Document names are trimmed and end with their suffix exactly once; a
/// suffix typed in another letter case is replaced by the canonical one.
pub fn normalize_item_name(kind: ItemKind, raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let Some(suffix) = kind.required_suffix() else {
        return Some(raw.to_string());
    };

    let mut stem = trimmed;
    while let Some(rest) = strip_suffix_ignore_case(stem, suffix) {
        stem = rest;
    }
    let stem = stem.trim_end();
    Some(format!("{stem}{suffix}"))
}

fn strip_suffix_ignore_case<'a>(value: &'a str, suffix: &str) -> Option<&'a str> {
    let split = value.len().checked_sub(suffix.len())?;
    if !value.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = value.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}
