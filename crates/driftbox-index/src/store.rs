//! The tree store: in-memory folder/file forest with serialized mutations
//! and write-through persistence.
//!
//! All mutating operations take the write half of one `RwLock`, stage the
//! change on a clone of the document, persist the clone, and only then
//! commit it to memory. A failed durable write therefore leaves the
//! in-memory state untouched, and in-memory vs. durable state never
//! silently diverge. Reloads triggered by external file changes go through
//! the same lock and cannot interleave with an in-flight mutation.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::SystemTime;

use tokio::sync::RwLock;
use tracing::info;

use driftbox_core::error::AppError;
use driftbox_core::result::AppResult;
use driftbox_core::types::ListQuery;
use driftbox_entity::{DriveDocument, File, Folder, ROOT_FOLDER_ID, User};

use crate::{persist, query};

/// The drive index: folders, files, and users behind a single
/// reader-writer lock.
#[derive(Debug)]
pub struct DriveStore {
    /// Path of the persisted JSON document.
    path: PathBuf,
    /// Guarded in-memory state.
    state: RwLock<IndexState>,
}

/// In-memory state guarded by the store lock.
#[derive(Debug)]
struct IndexState {
    /// Current document.
    doc: DriveDocument,
    /// Next folder id to allocate. Never moves backwards.
    next_folder_id: u64,
    /// Next file id to allocate. Never moves backwards.
    next_file_id: u64,
    /// Modification time of the index file as of our last load or save.
    /// The watcher compares against it to detect external edits.
    last_synced: Option<SystemTime>,
}

/// A staged mutation: document clone plus allocator positions. Committed
/// to the live state only after the durable write succeeds.
struct Draft {
    doc: DriveDocument,
    next_folder_id: u64,
    next_file_id: u64,
}

impl DriveStore {
    /// Open the store, loading the document at `path` (an absent file
    /// starts an empty drive) and seeding the id allocators.
    pub async fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let doc = persist::load(&path).await?;
        let last_synced = persist::modified(&path).await?;

        let state = IndexState {
            next_folder_id: doc.max_folder_id() + 1,
            next_file_id: doc.max_file_id() + 1,
            doc,
            last_synced,
        };

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Run a staged mutation: clone, mutate, persist, then commit.
    async fn commit<T>(&self, mutate: impl FnOnce(&mut Draft) -> AppResult<T>) -> AppResult<T> {
        let mut state = self.state.write().await;

        let mut draft = Draft {
            doc: state.doc.clone(),
            next_folder_id: state.next_folder_id,
            next_file_id: state.next_file_id,
        };
        let out = mutate(&mut draft)?;

        let synced = persist::save(&self.path, &draft.doc).await?;

        state.doc = draft.doc;
        state.next_folder_id = draft.next_folder_id;
        state.next_file_id = draft.next_file_id;
        state.last_synced = Some(synced);

        Ok(out)
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Fetch a folder by id.
    pub async fn get_folder(&self, id: u64) -> AppResult<Folder> {
        let state = self.state.read().await;
        state
            .doc
            .folders
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Folder not found"))
    }

    /// Fetch a file by id.
    pub async fn get_file(&self, id: u64) -> AppResult<File> {
        let state = self.state.read().await;
        state
            .doc
            .files
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("File not found"))
    }

    /// List folders matching a query.
    pub async fn list_folders(&self, q: &ListQuery) -> Vec<Folder> {
        let state = self.state.read().await;
        query::apply(state.doc.folders.clone(), q)
    }

    /// List files matching a query.
    pub async fn list_files(&self, q: &ListQuery) -> Vec<File> {
        let state = self.state.read().await;
        query::apply(state.doc.files.clone(), q)
    }

    /// Clone of the current document.
    pub async fn snapshot(&self) -> DriveDocument {
        self.state.read().await.doc.clone()
    }

    /// Blob keys referenced by any live file record.
    pub async fn live_storage_refs(&self) -> HashSet<String> {
        let state = self.state.read().await;
        state
            .doc
            .files
            .iter()
            .map(|f| f.storage_ref.clone())
            .collect()
    }

    // ── Folder mutations ─────────────────────────────────────────────

    /// Create a folder under `parent_id` (0 for root).
    pub async fn create_folder(&self, name: &str, parent_id: u64) -> AppResult<Folder> {
        let name = required_name(name)?;
        self.commit(|draft| {
            ensure_parent_exists(&draft.doc, parent_id)?;

            let folder = Folder {
                id: draft.next_folder_id,
                name,
                parent_id,
                starred: false,
            };
            draft.next_folder_id += 1;
            draft.doc.folders.push(folder.clone());
            Ok(folder)
        })
        .await
    }

    /// Rename a folder.
    pub async fn rename_folder(&self, id: u64, name: &str) -> AppResult<Folder> {
        let name = required_name(name)?;
        self.commit(|draft| {
            let folder = draft
                .doc
                .folders
                .iter_mut()
                .find(|f| f.id == id)
                .ok_or_else(|| AppError::not_found("Folder not found"))?;
            folder.name = name;
            Ok(folder.clone())
        })
        .await
    }

    /// Move a folder under a new parent.
    ///
    /// The hierarchy must stay an acyclic forest: moving a folder into
    /// itself or any of its descendants is rejected.
    pub async fn move_folder(&self, id: u64, new_parent_id: u64) -> AppResult<Folder> {
        self.commit(|draft| {
            let idx = draft
                .doc
                .folders
                .iter()
                .position(|f| f.id == id)
                .ok_or_else(|| AppError::not_found("Folder not found"))?;
            if new_parent_id == id {
                return Err(AppError::validation("Cannot move a folder into itself"));
            }
            ensure_parent_exists(&draft.doc, new_parent_id)?;
            ensure_not_descendant(&draft.doc, id, new_parent_id)?;

            let folder = &mut draft.doc.folders[idx];
            folder.parent_id = new_parent_id;
            Ok(folder.clone())
        })
        .await
    }

    /// Recursively delete a folder, all descendant folders, and every file
    /// transitively contained, as one logical operation.
    ///
    /// Returns the removed file records so the caller can release their
    /// blobs. `NotFound` for an absent id leaves the store untouched.
    pub async fn delete_folder_recursive(&self, id: u64) -> AppResult<Vec<File>> {
        self.commit(|draft| {
            if !draft.doc.folder_exists(id) {
                return Err(AppError::not_found("Folder not found"));
            }

            let mut doomed: HashSet<u64> = HashSet::from([id]);
            let mut frontier = vec![id];
            while let Some(current) = frontier.pop() {
                for folder in &draft.doc.folders {
                    if folder.parent_id == current && doomed.insert(folder.id) {
                        frontier.push(folder.id);
                    }
                }
            }

            draft.doc.folders.retain(|f| !doomed.contains(&f.id));

            let mut removed_files = Vec::new();
            draft.doc.files.retain(|f| {
                if doomed.contains(&f.parent_id) {
                    removed_files.push(f.clone());
                    false
                } else {
                    true
                }
            });

            Ok(removed_files)
        })
        .await
    }

    /// Set the starred flag on a folder. Idempotent: setting the current
    /// value again is a no-op success.
    pub async fn set_folder_starred(&self, id: u64, value: bool) -> AppResult<Folder> {
        {
            let state = self.state.read().await;
            match state.doc.folders.iter().find(|f| f.id == id) {
                Some(folder) if folder.starred == value => return Ok(folder.clone()),
                Some(_) => {}
                None => return Err(AppError::not_found("Folder not found")),
            }
        }

        self.commit(|draft| {
            let folder = draft
                .doc
                .folders
                .iter_mut()
                .find(|f| f.id == id)
                .ok_or_else(|| AppError::not_found("Folder not found"))?;
            folder.starred = value;
            Ok(folder.clone())
        })
        .await
    }

    // ── File mutations ───────────────────────────────────────────────

    /// Reserve the next file id.
    ///
    /// Upload ingestion writes the blob (keyed by this id) before the
    /// record exists; reserving under the write lock means no two uploads
    /// can observe the same id. Ids reserved by uploads that later fail
    /// are simply skipped.
    pub async fn reserve_file_id(&self) -> u64 {
        let mut state = self.state.write().await;
        let id = state.next_file_id;
        state.next_file_id += 1;
        id
    }

    /// Insert a fully-built file record (id from [`Self::reserve_file_id`]).
    pub async fn insert_file(&self, file: File) -> AppResult<File> {
        self.commit(move |draft| {
            ensure_parent_exists(&draft.doc, file.parent_id)?;
            if draft.doc.files.iter().any(|f| f.id == file.id) {
                return Err(AppError::conflict(format!(
                    "File id {} is already taken",
                    file.id
                )));
            }
            draft.next_file_id = draft.next_file_id.max(file.id + 1);
            draft.doc.files.push(file.clone());
            Ok(file)
        })
        .await
    }

    /// Rename a file.
    pub async fn rename_file(&self, id: u64, name: &str) -> AppResult<File> {
        let name = required_name(name)?;
        self.commit(|draft| {
            let file = draft
                .doc
                .files
                .iter_mut()
                .find(|f| f.id == id)
                .ok_or_else(|| AppError::not_found("File not found"))?;
            file.name = name;
            Ok(file.clone())
        })
        .await
    }

    /// Move a file into another folder.
    pub async fn move_file(&self, id: u64, new_parent_id: u64) -> AppResult<File> {
        self.commit(|draft| {
            ensure_parent_exists(&draft.doc, new_parent_id)?;
            let file = draft
                .doc
                .files
                .iter_mut()
                .find(|f| f.id == id)
                .ok_or_else(|| AppError::not_found("File not found"))?;
            file.parent_id = new_parent_id;
            Ok(file.clone())
        })
        .await
    }

    /// Remove a file record, returning it. The caller owns the lifecycle
    /// of the backing blob.
    pub async fn remove_file(&self, id: u64) -> AppResult<File> {
        self.commit(|draft| {
            let idx = draft
                .doc
                .files
                .iter()
                .position(|f| f.id == id)
                .ok_or_else(|| AppError::not_found("File not found"))?;
            Ok(draft.doc.files.remove(idx))
        })
        .await
    }

    /// Set the starred flag on a file. Idempotent like the folder variant.
    pub async fn set_file_starred(&self, id: u64, value: bool) -> AppResult<File> {
        {
            let state = self.state.read().await;
            match state.doc.files.iter().find(|f| f.id == id) {
                Some(file) if file.starred == value => return Ok(file.clone()),
                Some(_) => {}
                None => return Err(AppError::not_found("File not found")),
            }
        }

        self.commit(|draft| {
            let file = draft
                .doc
                .files
                .iter_mut()
                .find(|f| f.id == id)
                .ok_or_else(|| AppError::not_found("File not found"))?;
            file.starred = value;
            Ok(file.clone())
        })
        .await
    }

    // ── Users (opaque to the drive engine, same document) ────────────

    /// Look up a user by email, case-insensitively.
    pub async fn find_user_by_email(&self, email: &str) -> Option<User> {
        let state = self.state.read().await;
        state
            .doc
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    /// Fetch a user by id.
    pub async fn get_user(&self, id: u64) -> AppResult<User> {
        let state = self.state.read().await;
        state
            .doc
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Insert a new user account; the email must be unused.
    pub async fn insert_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> AppResult<User> {
        let name = required_name(name)?;
        let email = email.trim().to_string();
        let password_hash = password_hash.to_string();
        self.commit(move |draft| {
            if draft
                .doc
                .users
                .iter()
                .any(|u| u.email.eq_ignore_ascii_case(&email))
            {
                return Err(AppError::conflict("Email already registered"));
            }
            let user = User {
                id: draft.doc.max_user_id() + 1,
                name,
                email,
                password_hash,
            };
            draft.doc.users.push(user.clone());
            Ok(user)
        })
        .await
    }

    // ── Reload ───────────────────────────────────────────────────────

    /// Replace the in-memory state from disk. Takes the write lock, so a
    /// reload never interleaves with an in-flight mutation.
    ///
    /// Allocators are re-seeded but never lowered: ids handed out in this
    /// process stay unique even if the external edit removed the records
    /// holding the current maxima.
    pub async fn reload(&self) -> AppResult<()> {
        let mut state = self.state.write().await;
        let doc = persist::load(&self.path).await?;
        let disk = persist::modified(&self.path).await?;

        state.next_folder_id = state.next_folder_id.max(doc.max_folder_id() + 1);
        state.next_file_id = state.next_file_id.max(doc.max_file_id() + 1);
        state.doc = doc;
        state.last_synced = disk;

        info!(path = %self.path.display(), "Reloaded drive index from disk");
        Ok(())
    }

    /// Reload if the file on disk changed behind our back. Returns whether
    /// a reload happened.
    pub async fn sync_external(&self) -> AppResult<bool> {
        let disk = persist::modified(&self.path).await?;
        {
            let state = self.state.read().await;
            if disk == state.last_synced {
                return Ok(false);
            }
        }
        self.reload().await?;
        Ok(true)
    }
}

/// Validate a user-supplied name: non-empty after trimming.
fn required_name(name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Name is required"));
    }
    Ok(trimmed.to_string())
}

/// A parent must be the root or an existing folder.
fn ensure_parent_exists(doc: &DriveDocument, parent_id: u64) -> AppResult<()> {
    if parent_id == ROOT_FOLDER_ID || doc.folder_exists(parent_id) {
        Ok(())
    } else {
        Err(AppError::not_found(format!(
            "Parent folder {parent_id} not found"
        )))
    }
}

/// Reject a move that would place `folder_id` under one of its own
/// descendants. Walks the ancestor chain of the proposed parent; the hop
/// bound guards against corrupt parent chains from external edits.
fn ensure_not_descendant(doc: &DriveDocument, folder_id: u64, new_parent_id: u64) -> AppResult<()> {
    let mut current = new_parent_id;
    let mut hops = 0;
    while current != ROOT_FOLDER_ID {
        if current == folder_id {
            return Err(AppError::validation(
                "Cannot move a folder into one of its descendants",
            ));
        }
        current = doc
            .folders
            .iter()
            .find(|f| f.id == current)
            .map(|f| f.parent_id)
            .unwrap_or(ROOT_FOLDER_ID);
        hops += 1;
        if hops > doc.folders.len() {
            return Err(AppError::validation("Folder hierarchy contains a cycle"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use driftbox_core::error::ErrorKind;

    async fn open_store(dir: &tempfile::TempDir) -> DriveStore {
        DriveStore::open(dir.path().join("drive.json")).await.unwrap()
    }

    fn new_file(id: u64, name: &str, parent_id: u64) -> File {
        File {
            id,
            name: name.to_string(),
            mime_type: Some("text/plain".to_string()),
            storage_ref: format!("{id}-{name}"),
            parent_id,
            starred: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_unique_and_increasing() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        let a = store.create_folder("a", 0).await.unwrap();
        let b = store.create_folder("b", 0).await.unwrap();
        let c = store.create_folder("c", a.id).await.unwrap();

        assert_eq!((a.id, b.id, c.id), (1, 2, 3));

        let id1 = store.reserve_file_id().await;
        let id2 = store.reserve_file_id().await;
        assert!(id2 > id1);

        // File ids live in their own namespace.
        assert_eq!(id1, 1);
    }

    #[tokio::test]
    async fn test_ids_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = open_store(&dir).await;
            store.create_folder("a", 0).await.unwrap();
            store.create_folder("b", 0).await.unwrap();
        }

        let store = open_store(&dir).await;
        let c = store.create_folder("c", 0).await.unwrap();
        assert_eq!(c.id, 3);
    }

    #[tokio::test]
    async fn test_create_folder_validations() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        let err = store.create_folder("   ", 0).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = store.create_folder("ok", 42).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rename_missing_leaves_store_unmodified() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;
        store.create_folder("docs", 0).await.unwrap();

        let before = store.snapshot().await;
        let err = store.rename_folder(99, "new").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(store.snapshot().await, before);

        let err = store.rename_file(99, "new").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(store.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_move_folder_rejects_cycles() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        let a = store.create_folder("a", 0).await.unwrap();
        let b = store.create_folder("b", a.id).await.unwrap();
        let c = store.create_folder("c", b.id).await.unwrap();

        let err = store.move_folder(a.id, a.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = store.move_folder(a.id, c.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        // A legal move still works.
        let moved = store.move_folder(c.id, 0).await.unwrap();
        assert_eq!(moved.parent_id, 0);
    }

    #[tokio::test]
    async fn test_cascade_delete_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        let docs = store.create_folder("Docs", 0).await.unwrap();
        let year = store.create_folder("2024", docs.id).await.unwrap();
        assert_eq!((docs.id, year.id), (1, 2));

        let id = store.reserve_file_id().await;
        assert_eq!(id, 1);
        store
            .insert_file(new_file(id, "a.txt", year.id))
            .await
            .unwrap();

        let removed = store.delete_folder_recursive(docs.id).await.unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].name, "a.txt");

        assert_eq!(
            store.get_folder(docs.id).await.unwrap_err().kind,
            ErrorKind::NotFound
        );
        assert_eq!(
            store.get_folder(year.id).await.unwrap_err().kind,
            ErrorKind::NotFound
        );
        assert_eq!(
            store.get_file(id).await.unwrap_err().kind,
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_cascade_delete_missing_id_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;
        store.create_folder("keep", 0).await.unwrap();

        let before = store.snapshot().await;
        let err = store.delete_folder_recursive(99).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(store.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_cascade_delete_spares_unrelated_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        let doomed = store.create_folder("doomed", 0).await.unwrap();
        let kept = store.create_folder("kept", 0).await.unwrap();
        let id = store.reserve_file_id().await;
        store
            .insert_file(new_file(id, "keep.txt", kept.id))
            .await
            .unwrap();

        store.delete_folder_recursive(doomed.id).await.unwrap();

        assert!(store.get_folder(kept.id).await.is_ok());
        assert!(store.get_file(id).await.is_ok());
    }

    #[tokio::test]
    async fn test_star_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        let folder = store.create_folder("docs", 0).await.unwrap();
        let once = store.set_folder_starred(folder.id, true).await.unwrap();
        let twice = store.set_folder_starred(folder.id, true).await.unwrap();
        assert_eq!(once, twice);
        assert!(store.get_folder(folder.id).await.unwrap().starred);

        let err = store.set_file_starred(99, true).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_insert_file_rejects_duplicate_id_and_bad_parent() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        let id = store.reserve_file_id().await;
        store.insert_file(new_file(id, "a", 0)).await.unwrap();

        let err = store.insert_file(new_file(id, "b", 0)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let err = store.insert_file(new_file(id + 1, "c", 42)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_remove_file_returns_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        let id = store.reserve_file_id().await;
        store.insert_file(new_file(id, "a.txt", 0)).await.unwrap();

        let removed = store.remove_file(id).await.unwrap();
        assert_eq!(removed.storage_ref, format!("{id}-a.txt"));

        let err = store.remove_file(id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_sync_external_picks_up_outside_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drive.json");
        let store = DriveStore::open(&path).await.unwrap();
        store.create_folder("mine", 0).await.unwrap();

        // Nothing changed on disk since our own save.
        assert!(!store.sync_external().await.unwrap());

        // Simulate another process rewriting the document.
        let mut doc = store.snapshot().await;
        doc.folders.push(Folder {
            id: 50,
            name: "theirs".to_string(),
            parent_id: 0,
            starred: false,
        });
        // Filesystem mtime granularity can swallow rapid rewrites.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        persist::save(&path, &doc).await.unwrap();

        assert!(store.sync_external().await.unwrap());
        assert!(store.get_folder(50).await.is_ok());

        // Allocation stays above the externally introduced maximum.
        let next = store.create_folder("after", 0).await.unwrap();
        assert!(next.id > 50);
    }

    #[tokio::test]
    async fn test_users_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        let user = store
            .insert_user("Ada", "ada@example.com", "hash")
            .await
            .unwrap();
        assert_eq!(user.id, 1);

        let err = store
            .insert_user("Ada2", "ADA@example.com", "hash2")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        assert!(store.find_user_by_email("Ada@Example.Com").await.is_some());
        assert!(store.find_user_by_email("nobody@example.com").await.is_none());
    }
}
