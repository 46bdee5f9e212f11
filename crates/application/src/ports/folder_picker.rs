//! Folder picker port.

use std::future::Future;
use std::path::PathBuf;

/// Native "choose a folder" dialog.
pub trait FolderPicker: Send + Sync {
    /// Asks the user for a folder. Cancelling yields `None`, not an error.
    fn pick_folder(&self) -> impl Future<Output = Option<PathBuf>> + Send;
}
