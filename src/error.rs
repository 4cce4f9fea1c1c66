//! Error types for the page loading pipeline.
//!
//! Every failure that can abort a run is one variant of [`PageError`], and
//! each variant carries the URL or path a user needs to act on it.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Why the output folder was rejected before any network traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderErrorKind {
    /// The folder does not exist.
    NotFound,
    /// The folder exists but cannot be read.
    NoAccess,
    /// The path exists but is not a directory.
    NotADirectory,
}

impl fmt::Display for FolderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotFound => "does not exist",
            Self::NoAccess => "is not accessible",
            Self::NotADirectory => "is not a directory",
        };
        f.write_str(text)
    }
}

/// Errors that can abort a page download.
#[derive(Debug, Error)]
pub enum PageError {
    /// The page URL is malformed or not an absolute http(s) URL.
    #[error("invalid URL '{url}'")]
    InvalidUrl {
        /// The rejected input.
        url: String,
    },

    /// The output folder is missing, unreadable, or not a directory.
    #[error("output folder '{}' {kind}", path.display())]
    Folder {
        /// The output folder that was checked.
        path: PathBuf,
        /// What was wrong with it.
        kind: FolderErrorKind,
    },

    /// The server answered with a non-2xx status.
    #[error("{} (HTTP {status}) '{url}'", status_reason(.status))]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// DNS, connection, TLS, timeout or body read failure.
    #[error("could not reach '{url}': {source}")]
    Unreachable {
        /// The URL that could not be fetched.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Permission denied while creating a folder or writing a file.
    #[error("no access to '{}'", path.display())]
    Access {
        /// The path that could not be created or written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The parent directory of a file being written does not exist.
    #[error("parent directory missing for '{}'", path.display())]
    NotFound {
        /// The path that could not be written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Any other filesystem failure (disk full, read-only filesystem, ...).
    #[error("IO error writing to '{}': {source}", path.display())]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl PageError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an output folder error.
    pub fn folder(path: impl Into<PathBuf>, kind: FolderErrorKind) -> Self {
        Self::Folder {
            path: path.into(),
            kind,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an unreachable-host error from a reqwest error.
    pub fn unreachable(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Unreachable {
            url: url.into(),
            source,
        }
    }

    /// Maps a filesystem error on `path` to the matching variant.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::Access { path, source },
            std::io::ErrorKind::NotFound => Self::NotFound { path, source },
            _ => Self::Io { path, source },
        }
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the
// URL or path, which the source errors don't carry.

/// Human-readable reason for an HTTP status code.
#[allow(clippy::trivially_copy_pass_by_ref)]
fn status_reason(status: &u16) -> String {
    match *status {
        401 => "unauthorized".to_string(),
        403 => "forbidden".to_string(),
        404 => "page not found".to_string(),
        500 => "server error".to_string(),
        other => format!("error {other}"),
    }
}
