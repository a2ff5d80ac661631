//! Vault runtime settings.

use crate::model::sort::SortOrder;
use crate::service::recent_service::DEFAULT_RECENT_LIMIT;

/// Folder names seeded into an empty vault.
pub const DEFAULT_FOLDER_NAMES: [&str; 3] = ["Notes", "Documents", "Whiteboards"];

/// Tunables applied when a vault is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultSettings {
    /// Bound of the recently-opened list.
    pub recent_limit: usize,
    /// Seed `DEFAULT_FOLDER_NAMES` when the persisted item list is empty.
    pub seed_defaults: bool,
    /// Sort order active right after opening.
    pub default_sort: SortOrder,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            recent_limit: DEFAULT_RECENT_LIMIT,
            seed_defaults: true,
            default_sort: SortOrder::default(),
        }
    }
}
