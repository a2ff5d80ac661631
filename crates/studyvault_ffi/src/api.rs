//! FFI use-case API for host UI calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level vault functions to the host via FRB.
//! - Own the single process-wide vault behind one mutex so every intent runs
//!   to completion before the next one starts.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Item ids cross the boundary as UUID strings.
//! - Failures are reported inside response envelopes, never thrown.

use log::{error, warn};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use studyvault_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_sqlite_vault,
    ping as ping_inner, ContentKind, Item, ItemId, ItemKind, LogNotifier, SortOrder,
    SqliteVault, StudyProgress, VaultError, VaultSettings,
};
use uuid::Uuid;

const VAULT_DB_FILE_NAME: &str = "studyvault.sqlite3";
const VAULT_DB_PATH_ENV: &str = "STUDYVAULT_DB_PATH";
const PROGRESS_DEFAULT_LIMIT: u32 = 5;
const PROGRESS_LIMIT_MAX: u32 = 50;

static VAULT_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static VAULT: Mutex<Option<SqliteVault>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Pins the vault database path before the first vault call.
///
/// # FFI contract
/// - Idempotent for the same path.
/// - Returns empty string on success and error message when a different
///   path is already active or the path is blank.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_vault(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = VAULT_DB_PATH.get_or_init(|| requested.clone());
    if *active != requested {
        return format!(
            "vault already configured at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        );
    }
    String::new()
}

/// Item projection for list rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultItemView {
    pub item_id: String,
    pub name: String,
    /// `folder|pdf|note|whiteboard`.
    pub kind: String,
    pub parent_id: Option<String>,
    pub date_created_ms: i64,
    pub date_modified_ms: i64,
}

/// Snapshot of the folder the user is looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultListing {
    pub folder_id: Option<String>,
    pub breadcrumbs: Vec<String>,
    pub sort_order: String,
    pub items: Vec<VaultItemView>,
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultActionResponse {
    pub ok: bool,
    /// Affected item, when the action targets one.
    pub item: Option<VaultItemView>,
    pub message: String,
}

impl VaultActionResponse {
    fn success(message: impl Into<String>, item: Option<&Item>) -> Self {
        Self {
            ok: true,
            item: item.map(to_item_view),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            item: None,
            message: message.into(),
        }
    }
}

/// Document payload handed to a viewer or editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultDocumentResponse {
    pub ok: bool,
    pub item: Option<VaultItemView>,
    pub bytes: Vec<u8>,
    pub message: String,
}

/// Study progress projection.
#[derive(Debug, Clone, PartialEq)]
pub struct VaultProgressView {
    pub document_id: String,
    pub name: String,
    pub progress: f64,
    pub total_minutes: u64,
    pub last_studied_ms: i64,
}

/// Lists the current folder in the active sort order.
#[flutter_rust_bridge::frb(sync)]
pub fn vault_list_current() -> VaultListing {
    let listing = with_vault(|vault| VaultListing {
        folder_id: vault.current_folder().map(|id| id.to_string()),
        breadcrumbs: vault.breadcrumbs(),
        sort_order: vault.sort_order().as_str().to_string(),
        items: vault.current_items().iter().map(to_item_view).collect(),
        message: String::new(),
    });
    listing.unwrap_or_else(|err| VaultListing {
        folder_id: None,
        breadcrumbs: Vec::new(),
        sort_order: SortOrder::default().as_str().to_string(),
        items: Vec::new(),
        message: format!("vault_list_current failed: {err}"),
    })
}

/// Lists children of `parent_id` (root when `None`).
#[flutter_rust_bridge::frb(sync)]
pub fn vault_children(parent_id: Option<String>) -> Vec<VaultItemView> {
    let parent = match parent_id.as_deref().map(parse_item_id).transpose() {
        Ok(parent) => parent,
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error call=vault_children error={err}");
            return Vec::new();
        }
    };
    with_vault(|vault| vault.children_of(parent).iter().map(to_item_view).collect())
        .unwrap_or_default()
}

/// Creates a `folder|note|whiteboard` in the current folder.
#[flutter_rust_bridge::frb(sync)]
pub fn vault_create(kind: String) -> VaultActionResponse {
    let kind = match kind.trim().to_ascii_lowercase().as_str() {
        "folder" => ItemKind::Folder,
        "note" => ItemKind::NOTE,
        "whiteboard" => ItemKind::Whiteboard,
        other => {
            return VaultActionResponse::failure(format!(
                "vault_create failed: unsupported kind `{other}`"
            ))
        }
    };
    action(
        "vault_create",
        "Item created.",
        with_vault(|vault| match kind {
            ItemKind::Folder => vault.create_folder(),
            ItemKind::Whiteboard => vault.create_whiteboard(),
            ItemKind::File { .. } => vault.create_note(),
        }),
    )
}

/// Imports document bytes as a new `pdf|note` file in the current folder.
#[flutter_rust_bridge::frb(sync)]
pub fn vault_import_document(
    name: String,
    content_kind: String,
    bytes: Vec<u8>,
) -> VaultActionResponse {
    let Some(content_kind) = parse_content_kind(&content_kind) else {
        return VaultActionResponse::failure(format!(
            "vault_import_document failed: unsupported content kind `{}`",
            content_kind.trim()
        ));
    };
    action(
        "vault_import_document",
        "Document imported.",
        with_vault(|vault| vault.import_document(&name, content_kind, &bytes)),
    )
}

/// Renames an item; a blank name leaves it unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn vault_rename(item_id: String, name: String) -> VaultActionResponse {
    let id = match parse_item_id(&item_id) {
        Ok(id) => id,
        Err(err) => return VaultActionResponse::failure(format!("vault_rename failed: {err}")),
    };
    match with_vault(|vault| vault.rename_item(id, &name)) {
        Ok(Ok(Some(item))) => VaultActionResponse::success("Item renamed.", Some(&item)),
        Ok(Ok(None)) => VaultActionResponse::success("Rename cancelled.", None),
        Ok(Err(err)) => VaultActionResponse::failure(format!("vault_rename failed: {err}")),
        Err(err) => VaultActionResponse::failure(format!("vault_rename failed: {err}")),
    }
}

/// Deletes exactly the listed items.
#[flutter_rust_bridge::frb(sync)]
pub fn vault_delete(item_ids: Vec<String>) -> VaultActionResponse {
    let ids = match item_ids
        .iter()
        .map(|raw| parse_item_id(raw))
        .collect::<Result<HashSet<_>, _>>()
    {
        Ok(ids) => ids,
        Err(err) => return VaultActionResponse::failure(format!("vault_delete failed: {err}")),
    };
    match with_vault(|vault| vault.delete_items(&ids).len()) {
        Ok(count) => VaultActionResponse::success(format!("Deleted {count} item(s)."), None),
        Err(err) => VaultActionResponse::failure(format!("vault_delete failed: {err}")),
    }
}

/// Moves an item under `parent_id` (root when `None`).
#[flutter_rust_bridge::frb(sync)]
pub fn vault_move(item_id: String, parent_id: Option<String>) -> VaultActionResponse {
    let ids = parse_item_id(&item_id)
        .and_then(|id| Ok((id, parent_id.as_deref().map(parse_item_id).transpose()?)));
    let (id, parent) = match ids {
        Ok(ids) => ids,
        Err(err) => return VaultActionResponse::failure(format!("vault_move failed: {err}")),
    };
    action(
        "vault_move",
        "Item moved.",
        with_vault(|vault| vault.move_item(id, parent)),
    )
}

/// Enters a folder. Returns empty string on success.
#[flutter_rust_bridge::frb(sync)]
pub fn vault_enter_folder(folder_id: String) -> String {
    let id = match parse_item_id(&folder_id) {
        Ok(id) => id,
        Err(err) => return err,
    };
    match with_vault(|vault| vault.enter_folder(id)) {
        Ok(Ok(())) => String::new(),
        Ok(Err(err)) => err.to_string(),
        Err(err) => err,
    }
}

/// Leaves the current folder. Returns the new folder id, `None` at root.
#[flutter_rust_bridge::frb(sync)]
pub fn vault_navigate_up() -> Option<String> {
    with_vault(|vault| vault.navigate_up())
        .ok()
        .flatten()
        .map(|id| id.to_string())
}

/// Returns to the root listing.
#[flutter_rust_bridge::frb(sync)]
pub fn vault_navigate_to_root() {
    if let Err(err) = with_vault(|vault| vault.navigate_to_root()) {
        warn!("event=ffi_call module=ffi status=error call=vault_navigate_to_root error={err}");
    }
}

/// Applies a sort order label such as `name_asc` or `modified_newest`.
#[flutter_rust_bridge::frb(sync)]
pub fn vault_set_sort_order(order: String) -> String {
    let Some(order) = SortOrder::parse(&order) else {
        return format!("unsupported sort order `{}`", order.trim());
    };
    match with_vault(|vault| vault.set_sort_order(order)) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Items matching `query` by name.
#[flutter_rust_bridge::frb(sync)]
pub fn vault_search(query: String) -> Vec<VaultItemView> {
    with_vault(|vault| vault.search(&query).iter().map(to_item_view).collect())
        .unwrap_or_default()
}

/// Recently opened documents, most recent first.
#[flutter_rust_bridge::frb(sync)]
pub fn vault_recent_items() -> Vec<VaultItemView> {
    with_vault(|vault| vault.recent_items().iter().map(to_item_view).collect())
        .unwrap_or_default()
}

/// Loads a document payload for a viewer or editor.
#[flutter_rust_bridge::frb(sync)]
pub fn vault_open_document(item_id: String) -> VaultDocumentResponse {
    let failure = |message: String| VaultDocumentResponse {
        ok: false,
        item: None,
        bytes: Vec::new(),
        message,
    };
    let id = match parse_item_id(&item_id) {
        Ok(id) => id,
        Err(err) => return failure(format!("vault_open_document failed: {err}")),
    };
    match with_vault(|vault| vault.open_document(id)) {
        Ok(Ok(document)) => VaultDocumentResponse {
            ok: true,
            item: Some(to_item_view(&document.item)),
            bytes: document.bytes,
            message: String::new(),
        },
        Ok(Err(err)) => failure(format!("vault_open_document failed: {err}")),
        Err(err) => failure(format!("vault_open_document failed: {err}")),
    }
}

/// Replaces a document payload pushed back by an editor.
#[flutter_rust_bridge::frb(sync)]
pub fn vault_save_document(item_id: String, bytes: Vec<u8>) -> VaultActionResponse {
    let id = match parse_item_id(&item_id) {
        Ok(id) => id,
        Err(err) => {
            return VaultActionResponse::failure(format!("vault_save_document failed: {err}"))
        }
    };
    action(
        "vault_save_document",
        "Document saved.",
        with_vault(|vault| vault.save_document(id, &bytes)),
    )
}

/// Adds study minutes to a document.
#[flutter_rust_bridge::frb(sync)]
pub fn vault_record_study_time(item_id: String, minutes: u32) -> Option<VaultProgressView> {
    let id = parse_item_id(&item_id).ok()?;
    let result = with_vault(|vault| {
        let record = vault.record_study_time(id, u64::from(minutes))?;
        let name = vault
            .get_item(id)
            .map(|item| item.name.clone())
            .unwrap_or_default();
        Ok::<_, VaultError>(to_progress_view(name, &record))
    });
    match result {
        Ok(Ok(view)) => Some(view),
        Ok(Err(err)) => {
            warn!("event=ffi_call module=ffi status=error call=vault_record_study_time error={err}");
            None
        }
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error call=vault_record_study_time error={err}");
            None
        }
    }
}

/// Most recently studied documents, newest first.
#[flutter_rust_bridge::frb(sync)]
pub fn vault_recent_progress(limit: Option<u32>) -> Vec<VaultProgressView> {
    let limit = normalize_progress_limit(limit) as usize;
    with_vault(|vault| {
        vault
            .top_recent_progress(limit)
            .iter()
            .map(|(item, record)| to_progress_view(item.name.clone(), record))
            .collect()
    })
    .unwrap_or_default()
}

fn action(
    call: &str,
    message: &str,
    result: Result<Result<Item, VaultError>, String>,
) -> VaultActionResponse {
    match result {
        Ok(Ok(item)) => VaultActionResponse::success(message, Some(&item)),
        Ok(Err(err)) => VaultActionResponse::failure(format!("{call} failed: {err}")),
        Err(err) => VaultActionResponse::failure(format!("{call} failed: {err}")),
    }
}

fn normalize_progress_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => PROGRESS_DEFAULT_LIMIT,
        Some(value) => value.min(PROGRESS_LIMIT_MAX),
    }
}

fn resolve_vault_db_path() -> PathBuf {
    VAULT_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(VAULT_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(VAULT_DB_FILE_NAME)
        })
        .clone()
}

/// Runs `f` against the process-wide vault, opening it on first use.
fn with_vault<T>(f: impl FnOnce(&mut SqliteVault) -> T) -> Result<T, String> {
    let mut guard = VAULT.lock().map_err(|_| "vault lock poisoned".to_string())?;
    if guard.is_none() {
        let path = resolve_vault_db_path();
        let vault = open_sqlite_vault(&path, LogNotifier, VaultSettings::default()).map_err(
            |err| {
                error!("event=vault_open module=ffi status=error error={err}");
                format!("vault open failed: {err}")
            },
        )?;
        *guard = Some(vault);
    }
    let vault = guard
        .as_mut()
        .ok_or_else(|| "vault unavailable".to_string())?;
    Ok(f(vault))
}

fn parse_item_id(raw: &str) -> Result<ItemId, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid item id `{}`", raw.trim()))
}

fn parse_content_kind(raw: &str) -> Option<ContentKind> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pdf" => Some(ContentKind::Pdf),
        "note" | "notes" => Some(ContentKind::Note),
        _ => None,
    }
}

fn to_item_view(item: &Item) -> VaultItemView {
    VaultItemView {
        item_id: item.id.to_string(),
        name: item.name.clone(),
        kind: item.kind.label().to_string(),
        parent_id: item.parent_id.map(|id| id.to_string()),
        date_created_ms: item.date_created,
        date_modified_ms: item.date_modified,
    }
}

fn to_progress_view(name: String, record: &StudyProgress) -> VaultProgressView {
    VaultProgressView {
        document_id: record.document_id.to_string(),
        name,
        progress: record.progress,
        total_minutes: record.total_time_spent,
        last_studied_ms: record.last_studied,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        configure_vault, core_version, init_logging, normalize_progress_limit, ping,
        vault_create, vault_delete, vault_import_document, vault_open_document,
        vault_recent_progress, vault_record_study_time, vault_rename, vault_save_document,
        vault_search, vault_set_sort_order,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    // SQLite opens `:memory:` as a private in-memory database, so test runs
    // leave no files behind. On-disk reopening is covered in the core crate.
    const TEST_DB_PATH: &str = ":memory:";

    fn use_test_vault() {
        let message = configure_vault(TEST_DB_PATH.to_string());
        assert!(message.is_empty(), "{message}");
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}{nanos}")
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn configure_vault_rejects_blank_and_conflicting_paths() {
        use_test_vault();
        assert!(!configure_vault("  ".to_string()).is_empty());
        let conflict = configure_vault("/definitely/another/vault.sqlite3".to_string());
        assert!(conflict.contains("refusing to switch"));
    }

    #[test]
    fn created_item_can_be_renamed_and_found() {
        use_test_vault();
        let created = vault_create("whiteboard".to_string());
        assert!(created.ok, "{}", created.message);
        let item = created.item.expect("created item");
        assert_eq!(item.kind, "whiteboard");

        let token = unique_token("board");
        let renamed = vault_rename(item.item_id.clone(), token.clone());
        assert!(renamed.ok, "{}", renamed.message);
        assert_eq!(
            renamed.item.expect("renamed item").name,
            format!("{token}.whiteboard")
        );

        let cancelled = vault_rename(item.item_id.clone(), "   ".to_string());
        assert!(cancelled.ok);
        assert!(cancelled.item.is_none());

        let hits = vault_search(token);
        assert!(hits.iter().any(|hit| hit.item_id == item.item_id));
    }

    #[test]
    fn imported_document_round_trips_bytes() {
        use_test_vault();
        let imported = vault_import_document(
            unique_token("paper"),
            "pdf".to_string(),
            b"%PDF-1.4".to_vec(),
        );
        assert!(imported.ok, "{}", imported.message);
        let item_id = imported.item.expect("imported item").item_id;

        let opened = vault_open_document(item_id.clone());
        assert!(opened.ok, "{}", opened.message);
        assert_eq!(opened.bytes, b"%PDF-1.4".to_vec());

        let saved = vault_save_document(item_id.clone(), b"%PDF-1.7".to_vec());
        assert!(saved.ok, "{}", saved.message);
        assert_eq!(vault_open_document(item_id.clone()).bytes, b"%PDF-1.7".to_vec());

        let deleted = vault_delete(vec![item_id.clone()]);
        assert!(deleted.ok, "{}", deleted.message);
        let missing = vault_open_document(item_id);
        assert!(!missing.ok);
        assert!(missing.message.contains("not found"));
    }

    #[test]
    fn study_time_is_reported_in_recent_progress() {
        use_test_vault();
        let note = vault_create("note".to_string()).item.expect("note");
        let view = vault_record_study_time(note.item_id.clone(), 1000).expect("progress");
        assert_eq!(view.progress, 0.1);
        let view = vault_record_study_time(note.item_id.clone(), 1000).expect("progress");
        assert_eq!(view.progress, 1.0);

        let recent = vault_recent_progress(Some(50));
        assert!(recent.iter().any(|entry| entry.document_id == note.item_id));
    }

    #[test]
    fn test_vault_lives_in_memory() {
        use_test_vault();
        let created = vault_create("folder".to_string());
        assert!(created.ok, "{}", created.message);
        assert!(!std::path::Path::new(TEST_DB_PATH).exists());
    }

    #[test]
    fn invalid_inputs_fail_without_panicking() {
        use_test_vault();
        assert!(!vault_create("spreadsheet".to_string()).ok);
        assert!(!vault_import_document("x".to_string(), "docx".to_string(), Vec::new()).ok);
        assert!(!vault_rename("not-a-uuid".to_string(), "x".to_string()).ok);
        assert!(!vault_delete(vec!["nope".to_string()]).ok);
        assert!(vault_record_study_time("nope".to_string(), 1).is_none());
        assert!(!vault_set_sort_order("size".to_string()).is_empty());
    }

    #[test]
    fn progress_limit_is_normalized() {
        assert_eq!(normalize_progress_limit(None), 5);
        assert_eq!(normalize_progress_limit(Some(0)), 5);
        assert_eq!(normalize_progress_limit(Some(500)), 50);
        assert_eq!(normalize_progress_limit(Some(7)), 7);
    }
}
