//! Parcel - Main Entry Point
//!
//! Restores the workspace from the state file, runs one command against it
//! and flushes the state before exiting.

mod cli;
mod picker;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use parcel_application::ports::Clock;
use parcel_application::use_cases::{DeleteOutcome, RenameOutcome};
use parcel_application::{
    ApplicationError, ApplicationResult, OpenOutcome, Reconciliation, RequestDocumentController,
    SelectionResolution, SendOutcome, Workspace,
};
use parcel_domain::{HttpResponse, NodeKind, RequestState};
use parcel_infrastructure::{
    AppConfig, FileRequestRepository, FileWorkspaceStateRepository, LocalStorage,
    ReqwestExecutor, SystemClock,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Command, USAGE};
use crate::picker::DialogFolderPicker;
use crate::render::render_workspace;

type LocalRequests = FileRequestRepository<LocalStorage>;
type LocalWorkspace = Workspace<LocalStorage, LocalRequests, FileWorkspaceStateRepository>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let command = match Command::parse(std::env::args().skip(1)) {
        Ok(Command::Help) => {
            println!("{USAGE}");
            return Ok(());
        }
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            return Err(e.into());
        }
    };

    let config = AppConfig::from_env()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let storage = LocalStorage::new();
    let requests = FileRequestRepository::new(storage);

    let (mut workspace, report, reconciliation) = Workspace::open(
        storage,
        requests.clone(),
        FileWorkspaceStateRepository::new(&config.state_file),
        Arc::clone(&clock),
    )
    .await;
    if let Some(notice) = report.notice() {
        eprintln!("{notice}");
    }
    print_reconciliation(&reconciliation);

    let result = run(command, &mut workspace, &config, requests, clock).await;
    workspace.flush().await;

    if let Err(e) = result {
        eprintln!("error: {e}");
        return Err(e.into());
    }
    Ok(())
}

async fn run(
    command: Command,
    workspace: &mut LocalWorkspace,
    config: &AppConfig,
    requests: LocalRequests,
    clock: Arc<dyn Clock>,
) -> ApplicationResult<()> {
    match command {
        Command::Tree | Command::Help => print!("{}", render_workspace(workspace.store())),
        Command::Open(Some(path)) => {
            let opened = workspace.open_collection_at(&absolute(path)).await?;
            println!("opened {} [{}]", opened.name, opened.id);
        }
        Command::Open(None) => match workspace.open_collection(&DialogFolderPicker).await? {
            OpenOutcome::Opened(opened) => println!("opened {} [{}]", opened.name, opened.id),
            OpenOutcome::Cancelled => println!("cancelled"),
        },
        Command::Close(id) => {
            let summary = workspace.close_collection(&id).await?;
            println!("closed {} [{}]", summary.collection.name, summary.collection.id);
            print_selection(&summary.selection);
        }
        Command::Select(id) => {
            workspace.select_collection(&id).await?;
            println!("selected {id}");
        }
        Command::NewFolder { parent, name } => {
            let path = workspace
                .create_node(&absolute(parent), NodeKind::Directory, &name)
                .await?;
            println!("created {}", path.display());
        }
        Command::NewRequest { parent, name } => {
            let path = workspace
                .create_node(&absolute(parent), NodeKind::File, &name)
                .await?;
            println!("created {}", path.display());
        }
        Command::Rename { path, name } => match workspace.rename_node(&absolute(path), &name).await? {
            RenameOutcome::Renamed { from, to } => {
                println!("renamed {} -> {}", from.display(), to.display());
            }
            RenameOutcome::Unchanged(path) => println!("unchanged {}", path.display()),
        },
        Command::Delete { path, confirmed } => match workspace.delete_node(&absolute(path)).await? {
            DeleteOutcome::Deleted(path) => println!("deleted {}", path.display()),
            DeleteOutcome::ConfirmationRequired(pending) if confirmed => {
                let path = workspace.confirm_delete(pending).await?;
                println!("deleted {}", path.display());
            }
            DeleteOutcome::ConfirmationRequired(pending) => println!(
                "{} contains {} entries; run again with --yes to delete it",
                pending.path.display(),
                pending.children
            ),
        },
        Command::Send(file) => send(workspace, config, requests, clock, absolute(file)).await?,
        Command::Autosave(enabled) => {
            workspace.set_autosave(enabled).await;
            println!("autosave {}", if enabled { "on" } else { "off" });
        }
    }
    Ok(())
}

/// Opens `file` in a document controller the way a tree click does, sends
/// it and prints the response.
async fn send(
    workspace: &mut LocalWorkspace,
    config: &AppConfig,
    requests: LocalRequests,
    clock: Arc<dyn Clock>,
    file: PathBuf,
) -> ApplicationResult<()> {
    let executor = ReqwestExecutor::new(config)?;
    let mut controller = RequestDocumentController::new(requests, executor, clock);
    controller.mount(workspace.events_mut());

    workspace.click_file(&file).await?;
    controller.process_events().await?;
    if controller.attached_path().is_none() {
        controller.unmount(workspace.events_mut());
        return Err(ApplicationError::NoActiveFile);
    }
    let outcome = controller.send(workspace.store_mut()).await;
    controller.unmount(workspace.events_mut());

    match controller.request_state() {
        RequestState::Success { response } => print_response(response),
        RequestState::Error { kind, message } => eprintln!("{}: {message}", kind.title()),
        RequestState::Idle | RequestState::Loading { .. } => {}
    }

    match outcome? {
        SendOutcome::Saved(path) => println!("saved {}", path.display()),
        SendOutcome::Unsaved if controller.is_dirty() => {
            println!("response kept in memory only (autosave is off)");
        }
        SendOutcome::Unsaved => {}
    }
    Ok(())
}

fn print_response(response: &HttpResponse) {
    println!(
        "{} ({} ms, {} bytes)",
        response.status,
        response.elapsed().as_millis(),
        response.size
    );
    for (name, values) in &response.headers {
        for value in values {
            println!("{name}: {value}");
        }
    }
    println!();
    println!("{}", response.pretty_body());
}

fn print_reconciliation(reconciliation: &Reconciliation) {
    if let Some(path) = &reconciliation.cleared_active_file {
        tracing::info!(path = %path.display(), "active file no longer belongs to an open collection");
    }
    print_selection(&reconciliation.selection);
}

fn print_selection(selection: &SelectionResolution) {
    match selection {
        SelectionResolution::NeedsUserChoice(open) => {
            eprintln!("Several collections are open; choose one with `parcel select <ID>`:");
            for collection in open {
                eprintln!("  {} [{}] {}", collection.name, collection.id, collection.path.display());
            }
        }
        SelectionResolution::AutoSelected(id) => tracing::info!(id, "collection selected"),
        SelectionResolution::Unchanged | SelectionResolution::Empty => {}
    }
}

/// Makes a user-supplied path absolute so it matches tree paths.
fn absolute(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}
