//! In-memory fakes for every port, shared by the unit tests of this crate.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use parcel_domain::{
    Collection, DirectoryTree, FileSystemEntry, HttpResponse, RequestDocument, TreeSnapshot,
    WorkspaceState,
};

use crate::ports::{
    Clock, ExecutionRequest, FolderPicker, HttpExecutionError, HttpExecutor, RequestRepository,
    StateStoreError, Storage, StorageError, WorkspaceStateRepository,
};

#[derive(Debug, Default)]
struct MemoryFs {
    dirs: BTreeSet<PathBuf>,
    files: BTreeMap<PathBuf, String>,
    failing_deletes: usize,
    failing_copy: Option<PathBuf>,
    mutations: usize,
}

impl MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.dirs.contains(path) || self.files.contains_key(path)
    }

    fn require_parent(&self, path: &Path) -> Result<(), StorageError> {
        match path.parent() {
            Some(parent) if self.dirs.contains(parent) => Ok(()),
            Some(parent) => Err(StorageError::NotFound(parent.to_path_buf())),
            None => Err(StorageError::NotFound(path.to_path_buf())),
        }
    }

    fn take_delete_failure(&mut self, path: &Path) -> Result<(), StorageError> {
        if self.failing_deletes > 0 {
            self.failing_deletes -= 1;
            return Err(StorageError::PermissionDenied(path.to_path_buf()));
        }
        Ok(())
    }

    fn tree(&self, path: &Path) -> DirectoryTree {
        let mut children: Vec<DirectoryTree> = self
            .dirs
            .iter()
            .filter(|d| d.parent() == Some(path))
            .map(|d| self.tree(d))
            .collect();
        children.extend(
            self.files
                .iter()
                .filter(|(f, _)| f.parent() == Some(path))
                .map(|(f, content)| {
                    DirectoryTree::leaf(FileSystemEntry::file(f, content.len() as u64, 0))
                }),
        );
        DirectoryTree::directory(FileSystemEntry::directory(path, 0), children)
    }
}

/// Storage kept in memory; clones share the same file system.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryFs>>,
}

impl MemoryStorage {
    /// Creates storage holding the given directories.
    pub fn with_dirs(dirs: &[&str]) -> Self {
        let storage = Self::default();
        for dir in dirs {
            storage.add_dir(dir);
        }
        storage
    }

    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        self.inner.lock().unwrap().dirs.insert(path.into());
    }

    pub fn add_file(&self, path: impl Into<PathBuf>, content: &str) {
        self.inner
            .lock()
            .unwrap()
            .files
            .insert(path.into(), content.to_string());
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        self.inner.lock().unwrap().files.get(path.as_ref()).cloned()
    }

    pub fn has_dir(&self, path: impl AsRef<Path>) -> bool {
        self.inner.lock().unwrap().dirs.contains(path.as_ref())
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.inner.lock().unwrap().exists(path.as_ref())
    }

    /// Files under `dir` (recursively), sorted.
    pub fn files_under(&self, dir: impl AsRef<Path>) -> Vec<PathBuf> {
        let dir = dir.as_ref();
        self.inner
            .lock()
            .unwrap()
            .files
            .keys()
            .filter(|p| p.starts_with(dir))
            .cloned()
            .collect()
    }

    /// Makes the next `count` delete calls fail without removing anything.
    pub fn fail_next_deletes(&self, count: usize) {
        self.inner.lock().unwrap().failing_deletes = count;
    }

    /// Makes every copy whose source is `path` fail.
    pub fn fail_copies_from(&self, path: impl Into<PathBuf>) {
        self.inner.lock().unwrap().failing_copy = Some(path.into());
    }

    /// Number of successful mutating calls so far.
    pub fn mutation_count(&self) -> usize {
        self.inner.lock().unwrap().mutations
    }

    pub fn snapshot(&self, root: &str) -> TreeSnapshot {
        TreeSnapshot::new(self.inner.lock().unwrap().tree(Path::new(root)))
    }
}

impl Storage for MemoryStorage {
    async fn get_directory_tree(&self, root: &Path) -> Result<DirectoryTree, StorageError> {
        let fs = self.inner.lock().unwrap();
        if !fs.dirs.contains(root) {
            return Err(StorageError::NotFound(root.to_path_buf()));
        }
        Ok(fs.tree(root))
    }

    async fn create_directory(&self, path: &Path) -> Result<(), StorageError> {
        let mut fs = self.inner.lock().unwrap();
        if fs.exists(path) {
            return Err(StorageError::AlreadyExists(path.to_path_buf()));
        }
        fs.require_parent(path)?;
        fs.dirs.insert(path.to_path_buf());
        fs.mutations += 1;
        Ok(())
    }

    async fn create_file(&self, path: &Path, content: &str) -> Result<(), StorageError> {
        let mut fs = self.inner.lock().unwrap();
        if fs.dirs.contains(path) {
            return Err(StorageError::AlreadyExists(path.to_path_buf()));
        }
        fs.require_parent(path)?;
        fs.files.insert(path.to_path_buf(), content.to_string());
        fs.mutations += 1;
        Ok(())
    }

    async fn read_file(&self, path: &Path) -> Result<String, StorageError> {
        self.inner
            .lock()
            .unwrap()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_path_buf()))
    }

    async fn copy_file(&self, from: &Path, to: &Path) -> Result<(), StorageError> {
        let mut fs = self.inner.lock().unwrap();
        if fs.failing_copy.as_deref() == Some(from) {
            return Err(StorageError::Io(std::io::Error::other("unreadable source")));
        }
        let content = fs
            .files
            .get(from)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(from.to_path_buf()))?;
        if fs.dirs.contains(to) {
            return Err(StorageError::AlreadyExists(to.to_path_buf()));
        }
        fs.require_parent(to)?;
        fs.files.insert(to.to_path_buf(), content);
        fs.mutations += 1;
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> Result<(), StorageError> {
        let mut fs = self.inner.lock().unwrap();
        fs.take_delete_failure(path)?;
        fs.files
            .remove(path)
            .ok_or_else(|| StorageError::NotFound(path.to_path_buf()))?;
        fs.mutations += 1;
        Ok(())
    }

    async fn delete_directory(&self, path: &Path) -> Result<(), StorageError> {
        let mut fs = self.inner.lock().unwrap();
        fs.take_delete_failure(path)?;
        if !fs.dirs.contains(path) {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }
        fs.dirs.retain(|d| !d.starts_with(path));
        fs.files.retain(|f, _| !f.starts_with(path));
        fs.mutations += 1;
        Ok(())
    }

    async fn exists(&self, path: &Path) -> bool {
        self.inner.lock().unwrap().exists(path)
    }
}

/// JSON request files on top of [`MemoryStorage`].
#[derive(Debug, Clone)]
pub struct MemoryRequests {
    storage: MemoryStorage,
}

impl MemoryRequests {
    pub const fn new(storage: MemoryStorage) -> Self {
        Self { storage }
    }
}

impl RequestRepository for MemoryRequests {
    async fn load(&self, path: &Path) -> Result<RequestDocument, StorageError> {
        let content = self.storage.read_file(path).await?;
        serde_json::from_str(&content).map_err(|e| StorageError::InvalidContent {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    async fn save(&self, path: &Path, document: &RequestDocument) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(document).unwrap();
        self.storage.create_file(path, &content).await
    }
}

#[derive(Debug, Default)]
struct StateSlot {
    state: Option<WorkspaceState>,
    saves: usize,
    fail: bool,
}

/// Workspace state held in memory; clones share the slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateRepository {
    inner: Arc<Mutex<StateSlot>>,
}

impl MemoryStateRepository {
    pub fn seed(&self, state: WorkspaceState) {
        self.inner.lock().unwrap().state = Some(state);
    }

    pub fn saved(&self) -> Option<WorkspaceState> {
        self.inner.lock().unwrap().state.clone()
    }

    pub fn save_count(&self) -> usize {
        self.inner.lock().unwrap().saves
    }

    pub fn fail_saves(&self, fail: bool) {
        self.inner.lock().unwrap().fail = fail;
    }
}

impl WorkspaceStateRepository for MemoryStateRepository {
    async fn load(&self) -> Result<WorkspaceState, StateStoreError> {
        Ok(self.saved().unwrap_or_default())
    }

    async fn save(&self, state: &WorkspaceState) -> Result<(), StateStoreError> {
        let mut slot = self.inner.lock().unwrap();
        if slot.fail {
            return Err(StateStoreError::Io(std::io::Error::other("disk full")));
        }
        slot.state = Some(state.clone());
        slot.saves += 1;
        Ok(())
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-03-01T10:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

pub fn clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(fixed_now()))
}

#[derive(Debug, Default)]
struct ExecutorLog {
    queued: VecDeque<Result<HttpResponse, HttpExecutionError>>,
    seen: Vec<ExecutionRequest>,
}

/// Executor answering from a queue; `200 OK` with an empty body when empty.
#[derive(Debug, Clone, Default)]
pub struct StubExecutor {
    inner: Arc<Mutex<ExecutorLog>>,
}

impl StubExecutor {
    pub fn respond_with(&self, outcome: Result<HttpResponse, HttpExecutionError>) {
        self.inner.lock().unwrap().queued.push_back(outcome);
    }

    pub fn requests(&self) -> Vec<ExecutionRequest> {
        self.inner.lock().unwrap().seen.clone()
    }
}

pub fn ok_response(body: &str) -> HttpResponse {
    HttpResponse {
        body: body.to_string(),
        size: body.len() as u64,
        status: "200 OK".to_string(),
        status_code: 200,
        duration: 1_000,
        ..HttpResponse::default()
    }
}

impl HttpExecutor for StubExecutor {
    async fn execute(&self, request: &ExecutionRequest) -> Result<HttpResponse, HttpExecutionError> {
        let mut log = self.inner.lock().unwrap();
        log.seen.push(request.clone());
        log.queued.pop_front().unwrap_or_else(|| Ok(ok_response("")))
    }
}

/// Picker returning a fixed answer.
#[derive(Debug, Clone)]
pub struct StaticPicker(pub Option<PathBuf>);

impl FolderPicker for StaticPicker {
    async fn pick_folder(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}

/// An open collection with an empty root directory.
pub fn collection_at(id: &str, root: &str) -> Collection {
    let tree = DirectoryTree::directory(FileSystemEntry::directory(root, 0), Vec::new());
    Collection::new(id, TreeSnapshot::new(tree))
}
