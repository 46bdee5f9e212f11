//! Folder picker backed by the native dialog.

use std::path::PathBuf;

use parcel_application::ports::FolderPicker;

/// Shows the platform "choose folder" dialog through `rfd`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogFolderPicker;

impl FolderPicker for DialogFolderPicker {
    async fn pick_folder(&self) -> Option<PathBuf> {
        // The dialog blocks, keep it off the runtime threads.
        let picked = tokio::task::spawn_blocking(|| {
            rfd::FileDialog::new()
                .set_title("Open Collection")
                .pick_folder()
        })
        .await;

        match picked {
            Ok(path) => path,
            Err(e) => {
                tracing::error!(error = %e, "folder dialog failed");
                None
            }
        }
    }
}
