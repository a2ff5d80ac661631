use studyvault_core::{
    open_sqlite_vault, BlobKind, BlobStore, ContentKind, ItemKind, NoopNotifier, Notifier,
    SortOrder, SqliteBlobStore, SqliteMetadataStore, StudyVault, VaultError, VaultSettings,
    DEFAULT_FOLDER_NAMES,
};
use std::cell::RefCell;
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Default)]
struct RecordingNotifier {
    events: RefCell<Vec<(String, String)>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) {
        self.events
            .borrow_mut()
            .push((title.to_string(), message.to_string()));
    }
}

fn bare_settings() -> VaultSettings {
    VaultSettings {
        seed_defaults: false,
        ..VaultSettings::default()
    }
}

fn empty_vault() -> StudyVault<SqliteMetadataStore, SqliteBlobStore, NoopNotifier> {
    StudyVault::open(
        SqliteMetadataStore::open_in_memory().unwrap(),
        SqliteBlobStore::open_in_memory().unwrap(),
        NoopNotifier,
        bare_settings(),
    )
}

fn current_names(
    vault: &StudyVault<SqliteMetadataStore, SqliteBlobStore, NoopNotifier>,
) -> Vec<String> {
    vault
        .current_items()
        .into_iter()
        .map(|item| item.name)
        .collect()
}

#[test]
fn empty_vault_is_seeded_with_default_folders() {
    let vault = StudyVault::open(
        SqliteMetadataStore::open_in_memory().unwrap(),
        SqliteBlobStore::open_in_memory().unwrap(),
        NoopNotifier,
        VaultSettings::default(),
    );
    let names: Vec<_> = vault.current_items().into_iter().map(|item| item.name).collect();
    let mut expected: Vec<_> = DEFAULT_FOLDER_NAMES.iter().map(|name| name.to_string()).collect();
    expected.sort();
    assert_eq!(names, expected);
}

#[test]
fn navigation_scenario_orphans_children_of_deleted_folder() {
    let mut vault = empty_vault();
    let f1 = vault.create_folder().unwrap();
    vault.rename_item(f1.id, "F1").unwrap();

    vault.enter_folder(f1.id).unwrap();
    let doc = vault
        .import_document("doc.pdf", ContentKind::Pdf, b"%PDF")
        .unwrap();
    assert_eq!(doc.parent_id, Some(f1.id));
    assert_eq!(vault.current_items(), vec![doc.clone()]);
    assert_eq!(vault.breadcrumbs(), vec!["F1".to_string()]);

    let removed = vault.delete_items(&HashSet::from([f1.id]));
    assert_eq!(removed.len(), 1);
    assert_eq!(vault.current_folder(), None);
    assert!(vault.children_of(None).iter().all(|item| item.id != doc.id));
    assert!(vault.children_of(Some(f1.id)).iter().all(|item| item.id != doc.id));
    assert_eq!(vault.get_item(doc.id), Some(&doc));
}

#[test]
fn blank_rename_is_silently_cancelled() {
    let mut vault = empty_vault();
    let note = vault.create_note().unwrap();

    assert_eq!(vault.rename_item(note.id, "  ").unwrap(), None);
    assert_eq!(vault.get_item(note.id), Some(&note));

    let renamed = vault.rename_item(note.id, "Lecture 3").unwrap().unwrap();
    assert_eq!(renamed.name, "Lecture 3.notes");

    let unknown = Uuid::new_v4();
    assert_eq!(
        vault.rename_item(unknown, "x").unwrap_err(),
        VaultError::ItemNotFound(unknown)
    );
}

#[test]
fn open_document_reports_missing_content_and_tracks_recents() {
    let blobs = SqliteBlobStore::open_in_memory().unwrap();
    let mut vault = StudyVault::open(
        SqliteMetadataStore::open_in_memory().unwrap(),
        &blobs,
        NoopNotifier,
        bare_settings(),
    );
    let board = vault.create_whiteboard().unwrap();
    let pdf = vault
        .import_document("Paper", ContentKind::Pdf, b"bytes")
        .unwrap();
    let folder = vault.create_folder().unwrap();

    let opened = vault.open_document(pdf.id).unwrap();
    assert_eq!(opened.blob_kind, BlobKind::Pdf);
    assert_eq!(opened.bytes, b"bytes".to_vec());
    assert_eq!(opened.item.name, "Paper.pdf");

    let opened = vault.open_document(board.id).unwrap();
    assert!(opened.bytes.is_empty());
    assert_eq!(
        vault.recent_items().iter().map(|item| item.id).collect::<Vec<_>>(),
        vec![board.id, pdf.id]
    );

    blobs.delete_blob(pdf.id, BlobKind::Pdf).unwrap();
    assert_eq!(
        vault.open_document(pdf.id).unwrap_err(),
        VaultError::ContentNotFound(pdf.id)
    );
    assert_eq!(vault.recent_items()[0].id, board.id);

    assert_eq!(
        vault.open_document(folder.id).unwrap_err(),
        VaultError::NotADocument(folder.id)
    );
    let unknown = Uuid::new_v4();
    assert_eq!(
        vault.open_document(unknown).unwrap_err(),
        VaultError::ItemNotFound(unknown)
    );
}

#[test]
fn save_document_replaces_payload_and_bumps_modified() {
    let mut vault = empty_vault();
    let note = vault.create_note().unwrap();

    let saved = vault.save_document(note.id, b"photosynthesis").unwrap();
    assert!(saved.date_modified >= note.date_modified);
    assert_eq!(
        vault.open_document(note.id).unwrap().bytes,
        b"photosynthesis".to_vec()
    );

    let folder = vault.create_folder().unwrap();
    assert_eq!(
        vault.save_document(folder.id, b"x").unwrap_err(),
        VaultError::NotADocument(folder.id)
    );
}

#[test]
fn sort_order_applies_to_current_listing() {
    let mut vault = empty_vault();
    for name in ["beta", "Alpha", "gamma"] {
        let folder = vault.create_folder().unwrap();
        vault.rename_item(folder.id, name).unwrap();
    }

    assert_eq!(current_names(&vault), vec!["Alpha", "beta", "gamma"]);

    vault.set_sort_order(SortOrder::NameDescending);
    assert_eq!(vault.sort_order(), SortOrder::NameDescending);
    assert_eq!(current_names(&vault), vec!["gamma", "beta", "Alpha"]);
}

#[test]
fn navigate_up_walks_to_root() {
    let mut vault = empty_vault();
    let outer = vault.create_folder().unwrap();
    vault.enter_folder(outer.id).unwrap();
    let inner = vault.create_folder().unwrap();
    vault.enter_folder(inner.id).unwrap();
    assert_eq!(vault.breadcrumbs().len(), 2);

    assert_eq!(vault.navigate_up(), Some(outer.id));
    assert_eq!(vault.navigate_up(), None);
    assert_eq!(vault.navigate_up(), None);

    let note = vault.create_note().unwrap();
    assert_eq!(
        vault.enter_folder(note.id).unwrap_err(),
        VaultError::NotAFolder(note.id)
    );
    vault.enter_folder(inner.id).unwrap();
    vault.navigate_to_root();
    assert!(vault.breadcrumbs().is_empty());
}

#[test]
fn deleting_an_ancestor_resets_navigation() {
    let mut vault = empty_vault();
    let outer = vault.create_folder().unwrap();
    vault.enter_folder(outer.id).unwrap();
    let inner = vault.create_folder().unwrap();
    vault.enter_folder(inner.id).unwrap();

    vault.delete_items(&HashSet::from([outer.id]));
    assert_eq!(vault.current_folder(), None);
}

#[test]
fn orphaned_folder_cannot_be_entered() {
    let mut vault = empty_vault();
    let outer = vault.create_folder().unwrap();
    vault.enter_folder(outer.id).unwrap();
    let inner = vault.create_folder().unwrap();
    vault.enter_folder(inner.id).unwrap();
    let doc = vault
        .import_document("lecture", ContentKind::Pdf, b"%PDF")
        .unwrap();
    vault.navigate_to_root();

    vault.delete_items(&HashSet::from([outer.id]));
    assert_eq!(
        vault.enter_folder(inner.id).unwrap_err(),
        VaultError::ItemNotFound(inner.id)
    );
    assert_eq!(vault.current_folder(), None);
    assert!(vault.children_of(Some(inner.id)).is_empty());
    assert_eq!(vault.get_item(doc.id), Some(&doc));

    let note = vault.create_note().unwrap();
    assert_eq!(note.parent_id, None);
    assert!(vault.current_items().contains(&note));
}

#[test]
fn study_time_requires_document_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vault.sqlite3");

    let note_id = {
        let mut vault = open_sqlite_vault(&path, NoopNotifier, bare_settings()).unwrap();
        let note = vault.create_note().unwrap();
        let record = vault.record_study_time(note.id, 30).unwrap();
        assert_eq!(record.progress, 0.1);
        assert_eq!(vault.mark_section_completed(note.id, "intro"), Some(true));

        let folder = vault.create_folder().unwrap();
        assert_eq!(
            vault.record_study_time(folder.id, 5).unwrap_err(),
            VaultError::NotADocument(folder.id)
        );
        note.id
    };

    let vault = open_sqlite_vault(&path, NoopNotifier, VaultSettings::default()).unwrap();
    assert_eq!(vault.tree().len(), 2);
    let record = vault.study_progress(note_id).unwrap();
    assert_eq!(record.total_time_spent, 30);
    assert!(record.completed_sections.contains("intro"));
    assert_eq!(vault.top_recent_progress(5).len(), 1);
    assert!(vault.recent_items().is_empty());
}

#[test]
fn notifier_receives_user_facing_events() {
    let notifier = RecordingNotifier::default();
    let mut vault = StudyVault::open(
        SqliteMetadataStore::open_in_memory().unwrap(),
        SqliteBlobStore::open_in_memory().unwrap(),
        &notifier,
        bare_settings(),
    );

    let folder = vault.create_folder().unwrap();
    vault
        .import_document("Reading", ContentKind::Note, b"text")
        .unwrap();
    vault.delete_items(&HashSet::from([folder.id]));
    vault.delete_items(&HashSet::from([Uuid::new_v4()]));

    let titles: Vec<_> = notifier
        .events
        .borrow()
        .iter()
        .map(|(title, _)| title.clone())
        .collect();
    assert_eq!(
        titles,
        vec!["Folder created", "Document imported", "Items deleted"]
    );
}

#[test]
fn deleting_documents_drops_payloads_and_recents() {
    let blobs = SqliteBlobStore::open_in_memory().unwrap();
    let mut vault = StudyVault::open(
        SqliteMetadataStore::open_in_memory().unwrap(),
        &blobs,
        NoopNotifier,
        bare_settings(),
    );
    let note = vault.create_note().unwrap();
    vault.open_document(note.id).unwrap();
    assert_eq!(vault.recent_items().len(), 1);

    vault.delete_items(&HashSet::from([note.id]));
    assert!(vault.recent_items().is_empty());
    assert_eq!(blobs.get_blob(note.id, BlobKind::NoteText).unwrap(), None);
}

#[test]
fn move_and_search_use_vault_state() {
    let mut vault = empty_vault();
    let folder = vault.create_folder().unwrap();
    let board = vault.create_whiteboard().unwrap();
    vault.rename_item(board.id, "Mind map").unwrap();

    let moved = vault.move_item(board.id, Some(folder.id)).unwrap();
    assert_eq!(moved.parent_id, Some(folder.id));
    assert_eq!(vault.children_of(Some(folder.id)).len(), 1);

    let hits = vault.search("mind");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].kind, ItemKind::Whiteboard);
}
