//! Sort orders for child listings.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::item::Item;

/// Total order applied to every listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    NameAscending,
    NameDescending,
    DateCreatedNewest,
    DateCreatedOldest,
    DateModifiedNewest,
    DateModifiedOldest,
}

impl SortOrder {
    pub const ALL: [SortOrder; 6] = [
        SortOrder::NameAscending,
        SortOrder::NameDescending,
        SortOrder::DateCreatedNewest,
        SortOrder::DateCreatedOldest,
        SortOrder::DateModifiedNewest,
        SortOrder::DateModifiedOldest,
    ];

    /// Stable label used across the FFI boundary.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NameAscending => "name_asc",
            Self::NameDescending => "name_desc",
            Self::DateCreatedNewest => "created_newest",
            Self::DateCreatedOldest => "created_oldest",
            Self::DateModifiedNewest => "modified_newest",
            Self::DateModifiedOldest => "modified_oldest",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|order| order.as_str() == normalized)
    }

    fn compare(self, a: &Item, b: &Item) -> Ordering {
        match self {
            Self::NameAscending => compare_names(a, b),
            Self::NameDescending => compare_names(b, a),
            Self::DateCreatedNewest => b.date_created.cmp(&a.date_created),
            Self::DateCreatedOldest => a.date_created.cmp(&b.date_created),
            Self::DateModifiedNewest => b.date_modified.cmp(&a.date_modified),
            Self::DateModifiedOldest => a.date_modified.cmp(&b.date_modified),
        }
    }
}

/// Sorts in place. Equal keys keep their incoming relative order.
pub fn sort_items(items: &mut [Item], order: SortOrder) {
    // `sort_by` is stable; equal keys never swap.
    items.sort_by(|a, b| order.compare(a, b));
}

fn compare_names(a: &Item, b: &Item) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}
