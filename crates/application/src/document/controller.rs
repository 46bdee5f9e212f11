//! Request document controller.
//!
//! Owns the fields of the request being edited and tracks whether they
//! diverge from the attached file. The baseline for that comparison is the
//! document last loaded or saved; [`RequestDocumentController::refresh_from_storage`]
//! re-reads it when the file may have changed underneath.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parcel_domain::request::ensure_request_extension;
use parcel_domain::tree::{relocate, validate_node_name};
use parcel_domain::{BodyType, HttpMethod, KeyValue, RequestDocument, RequestState};
use tracing::{debug, error, info};

use super::{EditableRequest, LoadState, RowList, is_dirty};
use crate::error::{ApplicationError, ApplicationResult};
use crate::events::{EventCoordinator, Subscription, WorkspaceEvent};
use crate::ports::{Clock, HttpExecutor, RequestRepository, WorkspaceStateRepository};
use crate::store::WorkspaceStore;
use crate::use_cases::ExecuteRequest;

/// What happened to the document after a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Autosave wrote the document, response included, to this path.
    Saved(PathBuf),
    /// The response is only in memory; the editor is dirty if attached.
    Unsaved,
}

/// Controller behind the request editor.
pub struct RequestDocumentController<Q, H> {
    requests: Q,
    execute: ExecuteRequest<H>,
    clock: Arc<dyn Clock>,
    subscription: Option<Subscription>,
    editor: EditableRequest,
    load_state: LoadState,
    persisted: Option<RequestDocument>,
    request_state: RequestState,
    dirty: bool,
}

impl<Q: RequestRepository, H: HttpExecutor> RequestDocumentController<Q, H> {
    /// Creates an unattached controller.
    #[must_use]
    pub fn new(requests: Q, executor: H, clock: Arc<dyn Clock>) -> Self {
        Self {
            requests,
            execute: ExecuteRequest::new(executor),
            clock,
            subscription: None,
            editor: EditableRequest::default(),
            load_state: LoadState::Unattached,
            persisted: None,
            request_state: RequestState::Idle,
            dirty: false,
        }
    }

    /// Subscribes to workspace events. Calling it twice keeps one subscription.
    pub fn mount(&mut self, events: &mut EventCoordinator) {
        if self.subscription.is_none() {
            self.subscription = Some(events.subscribe());
        }
    }

    /// Unsubscribes from workspace events.
    pub fn unmount(&mut self, events: &mut EventCoordinator) {
        if let Some(subscription) = self.subscription.take() {
            events.unsubscribe(subscription.id());
        }
    }

    /// Handles every queued event and returns how many were handled.
    ///
    /// # Errors
    ///
    /// Stops at the first event that fails to apply.
    pub async fn process_events(&mut self) -> ApplicationResult<usize> {
        let mut handled = 0;
        loop {
            let Some(event) = self.subscription.as_mut().and_then(Subscription::try_next) else {
                return Ok(handled);
            };
            self.handle_event(event).await?;
            handled += 1;
        }
    }

    /// Applies one workspace event.
    ///
    /// # Errors
    ///
    /// Returns the load error for [`WorkspaceEvent::LoadFile`]; the editor is
    /// left unattached in that case.
    pub async fn handle_event(&mut self, event: WorkspaceEvent) -> ApplicationResult<()> {
        match event {
            WorkspaceEvent::LoadFile(path) => {
                if let Err(err) = self.load(&path).await {
                    error!(path = %path.display(), error = %err, "request file could not be loaded");
                    self.clear();
                    return Err(err);
                }
            }
            WorkspaceEvent::ClearActive => self.clear(),
            WorkspaceEvent::Relocated { from, to } => {
                let moved = self
                    .load_state
                    .path()
                    .and_then(|path| relocate(path, &from, &to));
                if let Some(path) = moved {
                    debug!(path = %path.display(), "attached file relocated");
                    self.load_state = LoadState::Attached(path);
                }
            }
        }
        Ok(())
    }

    /// Loads the file at `path` and attaches to it; the editor is clean after.
    ///
    /// # Errors
    ///
    /// Returns the repository error; the current state is kept in that case.
    pub async fn load(&mut self, path: &Path) -> ApplicationResult<()> {
        let document = self.requests.load(path).await?.normalized();
        self.editor = EditableRequest::from_document(&document);
        self.persisted = Some(document);
        self.load_state = LoadState::Attached(path.to_path_buf());
        self.request_state = RequestState::Idle;
        self.dirty = false;
        debug!(path = %path.display(), "request file loaded");
        Ok(())
    }

    /// Resets every field and detaches.
    pub fn clear(&mut self) {
        self.editor = EditableRequest::default();
        self.persisted = None;
        self.load_state = LoadState::Unattached;
        self.request_state = RequestState::Idle;
        self.dirty = false;
    }

    /// Re-reads the attached file and recomputes dirty against it.
    ///
    /// Returns the new dirty flag; always false when unattached.
    ///
    /// # Errors
    ///
    /// Returns the repository error.
    pub async fn refresh_from_storage(&mut self) -> ApplicationResult<bool> {
        if let Some(path) = self.load_state.path() {
            let document = self.requests.load(path).await?.normalized();
            self.persisted = Some(document);
            self.recompute_dirty();
        }
        Ok(self.dirty)
    }

    /// Returns the editable fields.
    #[must_use]
    pub const fn editor(&self) -> &EditableRequest {
        &self.editor
    }

    /// Returns the load state.
    #[must_use]
    pub const fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    /// Returns the attached path.
    #[must_use]
    pub fn attached_path(&self) -> Option<&Path> {
        self.load_state.path()
    }

    /// Returns the execution state behind the loading indicator.
    #[must_use]
    pub const fn request_state(&self) -> &RequestState {
        &self.request_state
    }

    /// Returns true if the fields differ from the attached file.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Sets the method.
    pub fn set_method(&mut self, method: HttpMethod) {
        self.editor.method = method;
        self.recompute_dirty();
    }

    /// Sets the URL.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.editor.url = url.into();
        self.recompute_dirty();
    }

    /// Sets the body buffer.
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.editor.body = body.into();
        self.recompute_dirty();
    }

    /// Sets the body type.
    ///
    /// A body type other than none owns the `Content-Type` header: the
    /// inferred value overrides any header row, so editing that row alone is
    /// not a change.
    pub fn set_body_type(&mut self, body_type: BodyType) {
        self.editor.body_type = body_type;
        self.recompute_dirty();
    }

    /// Replaces a whole row list.
    pub fn set_rows(&mut self, list: RowList, rows: Vec<KeyValue>) {
        *self.editor.rows_mut(list) = rows;
        self.recompute_dirty();
    }

    /// Appends an empty row.
    pub fn add_row(&mut self, list: RowList) {
        self.editor.rows_mut(list).push(KeyValue::default());
        self.recompute_dirty();
    }

    /// Replaces the row at `index`. Returns false if out of range.
    ///
    /// See [`set_body_type`](Self::set_body_type) for `Content-Type` rows.
    pub fn update_row(&mut self, list: RowList, index: usize, row: KeyValue) -> bool {
        let Some(slot) = self.editor.rows_mut(list).get_mut(index) else {
            return false;
        };
        *slot = row;
        self.recompute_dirty();
        true
    }

    /// Removes the row at `index`. Returns false if out of range.
    pub fn remove_row(&mut self, list: RowList, index: usize) -> bool {
        let rows = self.editor.rows_mut(list);
        if index >= rows.len() {
            return false;
        }
        rows.remove(index);
        self.recompute_dirty();
        true
    }

    /// Builds the document a save would write right now.
    #[must_use]
    pub fn current_document(&self) -> RequestDocument {
        self.editor
            .to_document(self.persisted.as_ref(), self.clock.now())
    }

    /// Saves to the attached file.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::NoActiveFile`] when unattached, or the
    /// repository error.
    pub async fn save<W: WorkspaceStateRepository>(
        &mut self,
        store: &mut WorkspaceStore<W>,
    ) -> ApplicationResult<PathBuf> {
        let path = self
            .load_state
            .path()
            .map(Path::to_path_buf)
            .ok_or(ApplicationError::NoActiveFile)?;
        self.write(path, store).await
    }

    /// Saves into the root of the selected collection under `file_name`,
    /// adding the request extension if missing, and attaches to it.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::NoCollectionSelected`] without writing if
    /// no collection is selected.
    pub async fn save_as<W: WorkspaceStateRepository>(
        &mut self,
        store: &mut WorkspaceStore<W>,
        file_name: &str,
    ) -> ApplicationResult<PathBuf> {
        let root = store
            .selected_collection()
            .map(|c| c.path.clone())
            .ok_or(ApplicationError::NoCollectionSelected)?;
        let name = ensure_request_extension(validate_node_name(file_name)?);
        self.write(root.join(name), store).await
    }

    /// Sends the request and folds the response into the editor.
    ///
    /// Any previous response is dropped when the send starts. With autosave on and a file attached, the document is saved right
    /// after the response arrives.
    ///
    /// # Errors
    /// - [`ApplicationError::RequestExecutionFailure`] if the send fails; the
    ///   editor holds no response and nothing is written
    /// - [`ApplicationError::NoCollectionSelected`] if autosave applies but no
    ///   collection is selected; the response stays in memory
    pub async fn send<W: WorkspaceStateRepository>(
        &mut self,
        store: &mut WorkspaceStore<W>,
    ) -> ApplicationResult<SendOutcome> {
        self.request_state = RequestState::loading();
        self.editor.response = None;
        self.recompute_dirty();
        let document = self.current_document();

        let response = match self.execute.execute(&document).await {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, "request execution failed");
                self.request_state = RequestState::error(err.kind(), err.to_string());
                return Err(err.into());
            }
        };

        self.editor.response = Some(response.clone());
        self.request_state = RequestState::success(response);
        self.recompute_dirty();

        if !store.autosave() || self.load_state.path().is_none() {
            return Ok(SendOutcome::Unsaved);
        }
        if store.selected_collection().is_none() {
            return Err(ApplicationError::NoCollectionSelected);
        }
        let path = self.save(store).await?;
        Ok(SendOutcome::Saved(path))
    }

    async fn write<W: WorkspaceStateRepository>(
        &mut self,
        path: PathBuf,
        store: &mut WorkspaceStore<W>,
    ) -> ApplicationResult<PathBuf> {
        let document = self.current_document();
        self.requests.save(&path, &document).await?;
        info!(path = %path.display(), "request saved");

        self.persisted = Some(document);
        self.load_state = LoadState::Attached(path.clone());
        self.dirty = false;
        store.set_active_file(Some(path.clone()));
        Ok(path)
    }

    fn recompute_dirty(&mut self) {
        self.dirty = match (&self.load_state, &self.persisted) {
            (LoadState::Attached(_), Some(persisted)) => {
                is_dirty(persisted, &self.current_document())
            }
            _ => false,
        };
    }
}
