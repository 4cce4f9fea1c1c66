//! Page Loader Core Library
//!
//! This library saves a web page for offline viewing: it fetches the page,
//! downloads the images, stylesheets and scripts it references on the same
//! origin, and rewrites those references to point at the local copies.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`download`] - HTTP fetching and URL-to-filename derivation
//! - [`markup`] - Resource discovery and reference rewriting
//! - [`storage`] - Output folder checks and file writes
//! - [`pipeline`] - The end-to-end orchestration
//! - [`error`] - The error taxonomy shared by all stages

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod error;
pub mod markup;
pub mod pipeline;
pub mod storage;
mod user_agent;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use download::{
    CONNECT_TIMEOUT_SECS, DEFAULT_CONCURRENCY, DownloadRecord, HttpClient, MAX_CONCURRENCY,
    MIN_CONCURRENCY, Payload, READ_TIMEOUT_SECS, derive_base_name, derive_extension,
    derive_folder_name,
};
pub use error::{FolderErrorKind, PageError};
pub use markup::{ResourceKind, ResourceReference, scan};
pub use pipeline::{PageLoader, PageRequest, PipelineError, ResultSet};
