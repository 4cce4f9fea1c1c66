//! Fetching a page and its resources into memory.
//!
//! This module provides the network half of the pipeline:
//!
//! - [`HttpClient`] performs one GET per resource and classifies the result
//! - [`DownloadRecord`] holds the fetched body and its derived filename
//! - [`filename`] derives filesystem-safe names from URLs
//!
//! # Example
//!
//! ```no_run
//! use page_loader_core::download::HttpClient;
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new();
//! let record = client
//!     .fetch_resource(&Url::parse("https://example.com/logo.png")?, false)
//!     .await?;
//! println!("{} bytes -> {}", record.payload.len(), record.filename);
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
pub mod filename;
mod record;

pub use client::HttpClient;
pub use constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_CONCURRENCY, MAX_CONCURRENCY, MIN_CONCURRENCY,
    READ_TIMEOUT_SECS,
};
pub use filename::{derive_base_name, derive_extension, derive_folder_name};
pub use record::{DownloadRecord, Payload};
