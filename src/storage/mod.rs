//! Filesystem side of the pipeline: folder checks, folder creation, writes.
//!
//! All operations are async (tokio) and map IO failures to [`PageError`]
//! variants that name the offending path.

use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, instrument};

use crate::error::{FolderErrorKind, PageError};

/// Confirms that `path` is an existing, readable directory.
///
/// # Errors
///
/// Returns [`PageError::Folder`] with [`FolderErrorKind::NotFound`],
/// [`FolderErrorKind::NoAccess`] or [`FolderErrorKind::NotADirectory`].
#[instrument(level = "debug", fields(path = %path.display()))]
pub async fn check_output_folder(path: &Path) -> Result<(), PageError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| PageError::folder(path, folder_error_kind(&e)))?;

    if !metadata.is_dir() {
        return Err(PageError::folder(path, FolderErrorKind::NotADirectory));
    }

    // metadata() succeeds on unreadable directories; listing proves access.
    let _listing = tokio::fs::read_dir(path)
        .await
        .map_err(|e| PageError::folder(path, folder_error_kind(&e)))?;

    Ok(())
}

/// Creates the directory at `path` if it does not exist yet.
///
/// An existing directory is not an error, so re-running against a populated
/// output folder succeeds.
///
/// # Errors
///
/// Returns [`PageError::Access`] on permission failure, [`PageError::NotFound`]
/// if the parent is missing, and [`PageError::Io`] otherwise (including when
/// a non-directory already occupies `path`).
#[instrument(level = "debug", fields(path = %path.display()))]
pub async fn ensure_folder(path: &Path) -> Result<(), PageError> {
    match tokio::fs::create_dir(path).await {
        Ok(()) => {
            debug!("created folder");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            let is_dir = tokio::fs::metadata(path)
                .await
                .map_err(|meta_err| PageError::from_io(path, meta_err))?
                .is_dir();
            if is_dir {
                debug!("folder already exists");
                Ok(())
            } else {
                Err(PageError::from_io(path, e))
            }
        }
        Err(e) => Err(PageError::from_io(path, e)),
    }
}

/// Writes `payload` to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`PageError::Access`], [`PageError::NotFound`] (parent directory
/// missing) or [`PageError::Io`] mapped from the underlying error.
pub async fn write_file(path: &Path, payload: &[u8]) -> Result<(), PageError> {
    tokio::fs::write(path, payload)
        .await
        .map_err(|e| PageError::from_io(path, e))?;
    debug!(path = %path.display(), bytes = payload.len(), "wrote file");
    Ok(())
}

fn folder_error_kind(error: &std::io::Error) -> FolderErrorKind {
    match error.kind() {
        ErrorKind::NotFound => FolderErrorKind::NotFound,
        ErrorKind::NotADirectory => FolderErrorKind::NotADirectory,
        _ => FolderErrorKind::NoAccess,
    }
}
