//! End-to-end workspace flows against the real adapters.
//!
//! Every test works in its own temporary directory: collections are real
//! folders and the workspace state is a real JSON file.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parcel_application::ports::Clock;
use parcel_application::use_cases::{DeleteOutcome, RenameOutcome};
use parcel_application::{ApplicationError, RequestDocumentController, SelectionResolution, Workspace};
use parcel_domain::{BodyType, HttpMethod, NodeKind, RequestDocument};
use parcel_infrastructure::{
    AppConfig, FileRequestRepository, FileWorkspaceStateRepository, LocalStorage,
    ReqwestExecutor, SystemClock,
};
use pretty_assertions::assert_eq;
use tempfile::{TempDir, tempdir};

type TestWorkspace =
    Workspace<LocalStorage, FileRequestRepository<LocalStorage>, FileWorkspaceStateRepository>;

struct Env {
    temp: TempDir,
}

impl Env {
    fn new(collections: &[&str]) -> Self {
        let temp = tempdir().expect("Failed to create temp directory");
        for name in collections {
            std::fs::create_dir_all(temp.path().join("ws").join(name)).unwrap();
        }
        Self { temp }
    }

    fn ws(&self, rest: &str) -> PathBuf {
        self.temp.path().join("ws").join(rest)
    }

    fn state_file(&self) -> PathBuf {
        self.temp.path().join("config").join("workspace.json")
    }

    fn clock() -> Arc<dyn Clock> {
        Arc::new(SystemClock::new())
    }

    async fn workspace(&self) -> TestWorkspace {
        let storage = LocalStorage::new();
        let (workspace, _report, _reconciliation) = Workspace::open(
            storage,
            FileRequestRepository::new(storage),
            FileWorkspaceStateRepository::new(self.state_file()),
            Self::clock(),
        )
        .await;
        workspace
    }

    fn controller(
        &self,
    ) -> RequestDocumentController<FileRequestRepository<LocalStorage>, ReqwestExecutor> {
        let config = AppConfig {
            state_file: self.state_file(),
            request_timeout: Duration::from_secs(5),
            user_agent: "parcel-test".to_string(),
        };
        RequestDocumentController::new(
            FileRequestRepository::new(LocalStorage::new()),
            ReqwestExecutor::new(&config).unwrap(),
            Self::clock(),
        )
    }
}

fn request_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_create_folder_then_request_then_conflict() {
    let env = Env::new(&["api"]);
    let mut workspace = env.workspace().await;
    let api = env.ws("api");
    workspace.open_collection_at(&api).await.unwrap();

    let users = workspace
        .create_node(&api, NodeKind::Directory, "users")
        .await
        .unwrap();
    assert_eq!(users, env.ws("api/users"));
    assert!(users.is_dir());

    let list = workspace
        .create_node(&users, NodeKind::File, "list")
        .await
        .unwrap();
    assert_eq!(list, env.ws("api/users/list.parcel"));

    let raw = std::fs::read_to_string(&list).unwrap();
    let doc: RequestDocument = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc.method, HttpMethod::Get);
    assert_eq!(doc.url, "");
    assert_eq!(doc.body, "");
    assert_eq!(doc.body_type, BodyType::None);

    let again = workspace.create_node(&users, NodeKind::File, "list").await;
    assert!(matches!(again, Err(ApplicationError::NameConflict { .. })));
    assert_eq!(request_files(&users), vec!["list.parcel"]);

    let collection = workspace.store().collections()[0].snapshot();
    assert!(collection.contains(&list));
    assert!(workspace.store().is_expanded(&users));
}

#[tokio::test]
async fn test_dirty_tracks_content_across_save() {
    let env = Env::new(&["api"]);
    let mut workspace = env.workspace().await;
    let api = env.ws("api");
    workspace.open_collection_at(&api).await.unwrap();
    let file = workspace
        .create_node(&api, NodeKind::File, "health")
        .await
        .unwrap();

    let mut controller = env.controller();
    controller.mount(workspace.events_mut());
    workspace.click_file(&file).await.unwrap();
    assert_eq!(controller.process_events().await.unwrap(), 1);
    assert_eq!(controller.attached_path(), Some(file.as_path()));
    assert!(!controller.is_dirty());

    controller.set_method(HttpMethod::Post);
    assert!(controller.is_dirty());
    controller.set_method(HttpMethod::Get);
    assert!(!controller.is_dirty());

    controller.set_method(HttpMethod::Post);
    controller.save(workspace.store_mut()).await.unwrap();
    assert!(!controller.is_dirty());
    let saved: RequestDocument =
        serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(saved.method, HttpMethod::Post);

    controller.set_method(HttpMethod::Get);
    assert!(controller.is_dirty());
    controller.set_method(HttpMethod::Post);
    assert!(!controller.is_dirty());
}

#[tokio::test]
async fn test_external_edit_is_seen_after_refresh() {
    let env = Env::new(&["api"]);
    let mut workspace = env.workspace().await;
    let api = env.ws("api");
    workspace.open_collection_at(&api).await.unwrap();
    let file = workspace
        .create_node(&api, NodeKind::File, "health")
        .await
        .unwrap();

    let mut controller = env.controller();
    controller.load(&file).await.unwrap();

    let mut edited: RequestDocument =
        serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
    edited.url = "https://example.com/health".to_string();
    std::fs::write(&file, serde_json::to_string(&edited).unwrap()).unwrap();

    assert!(!controller.is_dirty());
    assert!(controller.refresh_from_storage().await.unwrap());
}

#[tokio::test]
async fn test_rename_directory_moves_subtree_and_state() {
    let env = Env::new(&["api"]);
    let mut workspace = env.workspace().await;
    let api = env.ws("api");
    workspace.open_collection_at(&api).await.unwrap();
    let users = workspace
        .create_node(&api, NodeKind::Directory, "users")
        .await
        .unwrap();
    let list = workspace
        .create_node(&users, NodeKind::File, "list")
        .await
        .unwrap();
    let original = std::fs::read_to_string(&list).unwrap();
    workspace.click_file(&list).await.unwrap();

    let mut controller = env.controller();
    controller.mount(workspace.events_mut());
    controller.load(&list).await.unwrap();

    let outcome = workspace.rename_node(&users, "people").await.unwrap();
    let people = env.ws("api/people");
    assert_eq!(
        outcome,
        RenameOutcome::Renamed {
            from: users.clone(),
            to: people.clone(),
        }
    );
    assert!(!users.exists());
    assert_eq!(
        std::fs::read_to_string(people.join("list.parcel")).unwrap(),
        original
    );

    let moved = people.join("list.parcel");
    assert_eq!(workspace.store().active_file(), Some(moved.as_path()));
    assert!(workspace.store().is_expanded(&people));
    assert!(!workspace.store().is_expanded(&users));

    controller.process_events().await.unwrap();
    assert_eq!(controller.attached_path(), Some(moved.as_path()));
    assert!(!controller.is_dirty());
}

#[tokio::test]
async fn test_rename_directory_with_binary_file() {
    let env = Env::new(&["api"]);
    let mut workspace = env.workspace().await;
    let api = env.ws("api");
    workspace.open_collection_at(&api).await.unwrap();
    let users = workspace
        .create_node(&api, NodeKind::Directory, "users")
        .await
        .unwrap();
    workspace.create_node(&users, NodeKind::File, "a").await.unwrap();
    std::fs::write(users.join("logo.png"), [0xff, 0xfe, 0x00]).unwrap();
    workspace.refresh_all().await;

    let outcome = workspace.rename_node(&users, "people").await.unwrap();

    let people = env.ws("api/people");
    assert!(matches!(outcome, RenameOutcome::Renamed { .. }));
    assert!(!users.exists());
    assert_eq!(request_files(&api), vec!["people"]);
    assert_eq!(request_files(&people), vec!["a.parcel", "logo.png"]);
    assert_eq!(std::fs::read(people.join("logo.png")).unwrap(), vec![0xff, 0xfe, 0x00]);
}

#[tokio::test]
async fn test_click_on_non_request_file_keeps_editor() {
    let env = Env::new(&["api"]);
    let mut workspace = env.workspace().await;
    let api = env.ws("api");
    workspace.open_collection_at(&api).await.unwrap();
    let notes = api.join("notes.txt");
    std::fs::write(&notes, "remember the token").unwrap();
    workspace.refresh_all().await;

    let mut controller = env.controller();
    controller.mount(workspace.events_mut());
    workspace.click_file(&notes).await.unwrap();

    assert_eq!(controller.process_events().await.unwrap(), 0);
    assert_eq!(controller.attached_path(), None);
    assert_eq!(workspace.store().active_file(), None);
}

#[tokio::test]
async fn test_rename_onto_sibling_conflicts_without_touching_disk() {
    let env = Env::new(&["api"]);
    let mut workspace = env.workspace().await;
    let api = env.ws("api");
    workspace.open_collection_at(&api).await.unwrap();
    let a = workspace.create_node(&api, NodeKind::File, "a").await.unwrap();
    workspace.create_node(&api, NodeKind::File, "b").await.unwrap();

    let result = workspace.rename_node(&a, "b").await;

    assert!(matches!(result, Err(ApplicationError::NameConflict { .. })));
    assert_eq!(request_files(&api), vec!["a.parcel", "b.parcel"]);
}

#[tokio::test]
async fn test_delete_non_empty_directory_needs_confirmation() {
    let env = Env::new(&["api"]);
    let mut workspace = env.workspace().await;
    let api = env.ws("api");
    workspace.open_collection_at(&api).await.unwrap();
    let users = workspace
        .create_node(&api, NodeKind::Directory, "users")
        .await
        .unwrap();
    let list = workspace
        .create_node(&users, NodeKind::File, "list")
        .await
        .unwrap();
    workspace.click_file(&list).await.unwrap();

    let DeleteOutcome::ConfirmationRequired(pending) = workspace.delete_node(&users).await.unwrap()
    else {
        panic!("non-empty directory must ask first");
    };
    assert!(users.exists());

    workspace.confirm_delete(pending).await.unwrap();
    assert!(!users.exists());
    assert_eq!(workspace.store().active_file(), None);

    let empty = workspace
        .create_node(&api, NodeKind::Directory, "empty")
        .await
        .unwrap();
    assert_eq!(
        workspace.delete_node(&empty).await.unwrap(),
        DeleteOutcome::Deleted(empty.clone())
    );
}

#[tokio::test]
async fn test_close_collection_and_restart_restores_the_rest() {
    let env = Env::new(&["api", "web"]);
    let api = env.ws("api");
    let web = env.ws("web");

    let web_id = {
        let mut workspace = env.workspace().await;
        let api_ref = workspace.open_collection_at(&api).await.unwrap();
        let web_ref = workspace.open_collection_at(&web).await.unwrap();
        let users = workspace
            .create_node(&api, NodeKind::Directory, "users")
            .await
            .unwrap();
        let list = workspace
            .create_node(&users, NodeKind::File, "list")
            .await
            .unwrap();
        workspace.click_file(&list).await.unwrap();

        let summary = workspace.close_collection(&api_ref.id).await.unwrap();
        assert_eq!(summary.collapsed, 2);
        assert!(summary.cleared_active_file);
        assert_eq!(
            summary.selection,
            SelectionResolution::AutoSelected(web_ref.id.clone())
        );
        web_ref.id
    };

    let workspace = env.workspace().await;
    let store = workspace.store();
    assert_eq!(store.collections().len(), 1);
    assert_eq!(store.collections()[0].path, web);
    assert_eq!(store.selected_collection_id(), Some(web_id.as_str()));
    assert!(store.is_expanded(&web));
    assert!(!store.is_expanded(&api));
    assert_eq!(store.active_file(), None);
}

#[tokio::test]
async fn test_missing_collection_is_reported_at_startup() {
    let env = Env::new(&["api", "gone"]);
    {
        let mut workspace = env.workspace().await;
        workspace.open_collection_at(&env.ws("api")).await.unwrap();
        workspace.open_collection_at(&env.ws("gone")).await.unwrap();
    }
    std::fs::remove_dir_all(env.ws("gone")).unwrap();

    let storage = LocalStorage::new();
    let (workspace, report, _) = Workspace::open(
        storage,
        FileRequestRepository::new(storage),
        FileWorkspaceStateRepository::new(env.state_file()),
        Env::clock(),
    )
    .await;

    assert_eq!(
        report.notice().as_deref(),
        Some("The following collections could not be loaded and were removed: gone")
    );
    assert_eq!(workspace.store().collections().len(), 1);
}
