//! The download-and-rewrite pipeline.
//!
//! [`PageLoader::run`] saves one page and its same-origin resources:
//!
//! 1. validate the output folder
//! 2. fetch the main page as text
//! 3. scan it for images, stylesheets and scripts
//! 4. fetch every distinct resource concurrently (fail-fast)
//! 5. point the markup at the local copies
//! 6. create the `<page>_files` folder
//! 7. write the main page
//! 8. write the resources concurrently
//!
//! Each stage hands its output to the next one; nothing is shared between
//! stages except through return values. Files written before a failing step
//! are left on disk.
//!
//! # Example
//!
//! ```no_run
//! use page_loader_core::{HttpClient, PageLoader};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = PageLoader::new(HttpClient::new());
//! let saved = loader.run("https://example.com/docs", "./out").await?;
//! for path in &saved {
//!     println!("{}", path.display());
//! }
//! # Ok(())
//! # }
//! ```

mod request;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use futures_util::{StreamExt, TryStreamExt, stream};
use tracing::{debug, info, instrument};
use url::Url;

use crate::download::filename::{claim_unique_filename, derive_folder_name};
use crate::download::{
    DEFAULT_CONCURRENCY, DownloadRecord, HttpClient, MAX_CONCURRENCY, MIN_CONCURRENCY, Payload,
};
use crate::error::PageError;
use crate::markup::{self, PageDocument, ResourceReference};
use crate::storage;

pub use request::{PageRequest, ResultSet};

/// Error type for building a [`PageLoader`].
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },
}

/// Saves a page and its same-origin resources to a local folder.
///
/// Resource fetches and resource writes each run as a bounded fan-out of at
/// most `concurrency` operations, joined before the next stage starts.
#[derive(Debug, Clone)]
pub struct PageLoader {
    client: HttpClient,
    concurrency: usize,
}

/// A fetched resource with its final, collision-free filename.
struct PlannedResource {
    url: Url,
    filename: String,
    payload: Payload,
}

impl PageLoader {
    /// Creates a loader with the default concurrency.
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Creates a loader that runs at most `concurrency` fetches or writes at once.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConcurrency`] if the value is outside
    /// the valid range (1-100).
    pub fn with_concurrency(client: HttpClient, concurrency: usize) -> Result<Self, PipelineError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(PipelineError::InvalidConcurrency { value: concurrency });
        }
        Ok(Self {
            client,
            concurrency,
        })
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Saves the page at `url` into `output_folder`.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::InvalidUrl`] before any I/O for a bad URL, and
    /// otherwise the first error raised by any stage.
    pub async fn run(
        &self,
        url: &str,
        output_folder: impl AsRef<Path>,
    ) -> Result<ResultSet, PageError> {
        let request = PageRequest::new(url, output_folder)?;
        self.run_request(&request).await
    }

    /// Runs the pipeline for an already validated request.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any stage; see [`PageError`].
    #[instrument(skip(self, request), fields(url = %request.url, output = %request.output_folder.display()))]
    pub async fn run_request(&self, request: &PageRequest) -> Result<ResultSet, PageError> {
        storage::check_output_folder(&request.output_folder).await?;

        info!("fetching page");
        let main = self.client.fetch_resource(&request.url, true).await?;
        let page_text = main.payload.as_text().unwrap_or_default();

        let (mut document, references) = markup::scan(&request.url, page_text);
        let references: Vec<ResourceReference> = references
            .into_iter()
            .filter(|reference| reference.resolved_url != request.url)
            .collect();

        let urls = distinct_urls(&references);
        info!(resources = urls.len(), "fetching resources");
        let records = self.fetch_all(&urls).await?;
        let resources = plan_resources(&urls, records);

        let folder_name = derive_folder_name(request.url.as_str())?;
        let main_text = if resources.is_empty() {
            page_text.to_string()
        } else {
            rewrite_references(&mut document, &references, &resources, &folder_name)
        };

        let resources_folder = request.output_folder.join(&folder_name);
        if !resources.is_empty() {
            storage::ensure_folder(&resources_folder).await?;
        }

        let main_path = request.output_folder.join(&main.filename);
        storage::write_file(&main_path, main_text.as_bytes()).await?;
        info!(path = %main_path.display(), "saved page");

        let resource_paths = self.write_all(&resources_folder, &resources).await?;
        info!(files = resource_paths.len() + 1, "page saved");

        Ok(ResultSet::new(main_path, resource_paths))
    }

    /// Fetches every URL concurrently; the first failure aborts the stage.
    async fn fetch_all(&self, urls: &[Url]) -> Result<HashMap<Url, DownloadRecord>, PageError> {
        let client = &self.client;
        stream::iter(urls.iter())
            .map(|url| async move { client.fetch_resource(url, false).await })
            .buffer_unordered(self.concurrency)
            .map_ok(|record| (record.source_url.clone(), record))
            .try_collect()
            .await
    }

    /// Writes every resource concurrently and returns the paths in plan order.
    async fn write_all(
        &self,
        folder: &Path,
        resources: &[PlannedResource],
    ) -> Result<Vec<PathBuf>, PageError> {
        let paths: Vec<PathBuf> = resources
            .iter()
            .map(|resource| folder.join(&resource.filename))
            .collect();

        stream::iter(paths.iter().zip(resources))
            .map(|(path, resource)| async move {
                storage::write_file(path, resource.payload.as_bytes()).await
            })
            .buffer_unordered(self.concurrency)
            .try_collect::<Vec<()>>()
            .await?;

        Ok(paths)
    }
}

/// Resolved URLs in discovery order, each listed once.
fn distinct_urls(references: &[ResourceReference]) -> Vec<Url> {
    let mut seen = HashSet::new();
    references
        .iter()
        .filter(|reference| seen.insert(&reference.resolved_url))
        .map(|reference| reference.resolved_url.clone())
        .collect()
}

/// Pairs fetched records with collision-free filenames, in discovery order.
fn plan_resources(urls: &[Url], mut records: HashMap<Url, DownloadRecord>) -> Vec<PlannedResource> {
    let mut taken = HashSet::new();
    urls.iter()
        .filter_map(|url| records.remove(url))
        .map(|record| {
            let filename = claim_unique_filename(&record.filename, &mut taken);
            if filename != record.filename {
                debug!(url = %record.source_url, filename = %filename, "renamed colliding resource");
            }
            PlannedResource {
                url: record.source_url,
                filename,
                payload: record.payload,
            }
        })
        .collect()
}

/// Points every reference at `<folder_name>/<filename>` and serializes the page.
fn rewrite_references(
    document: &mut PageDocument,
    references: &[ResourceReference],
    resources: &[PlannedResource],
    folder_name: &str,
) -> String {
    let local_names: HashMap<&Url, &str> = resources
        .iter()
        .map(|resource| (&resource.url, resource.filename.as_str()))
        .collect();

    for reference in references {
        let Some(filename) = local_names.get(&reference.resolved_url) else {
            continue;
        };
        let target = format!("{folder_name}/{filename}");
        if !document.set_reference_target(reference, &target) {
            debug!(url = %reference.resolved_url, "reference attribute vanished before rewrite");
        }
    }

    document.to_html()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use crate::test_support::socket_guard::start_mock_server_or_skip;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    fn record(url: &str, filename: &str) -> DownloadRecord {
        DownloadRecord {
            source_url: Url::parse(url).unwrap(),
            payload: Payload::Binary(url.as_bytes().to_vec()),
            filename: filename.to_string(),
        }
    }

    #[test]
    fn test_with_concurrency_bounds() {
        assert!(PageLoader::with_concurrency(HttpClient::new(), 1).is_ok());
        assert!(PageLoader::with_concurrency(HttpClient::new(), 100).is_ok());
        assert!(matches!(
            PageLoader::with_concurrency(HttpClient::new(), 0),
            Err(PipelineError::InvalidConcurrency { value: 0 })
        ));
        assert!(PageLoader::with_concurrency(HttpClient::new(), 101).is_err());
        assert_eq!(PageLoader::new(HttpClient::new()).concurrency(), DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_distinct_urls_keeps_first_occurrence_order() {
        let page = Url::parse("https://x.test/a").unwrap();
        let html = r#"<img src="/b.png"><script src="/c.js"></script><img src="/b.png">"#;
        let (_, references) = markup::scan(&page, html);

        let urls = distinct_urls(&references);

        assert_eq!(references.len(), 3);
        assert_eq!(
            urls.iter().map(Url::as_str).collect::<Vec<_>>(),
            vec!["https://x.test/b.png", "https://x.test/c.js"]
        );
    }

    #[test]
    fn test_plan_resources_disambiguates_collisions() {
        let urls = vec![
            Url::parse("https://x.test/a-b.css").unwrap(),
            Url::parse("https://x.test/a/b.css").unwrap(),
        ];
        let records = urls
            .iter()
            .map(|url| (url.clone(), record(url.as_str(), "x-test-a-b.css")))
            .collect();

        let planned = plan_resources(&urls, records);

        assert_eq!(planned[0].filename, "x-test-a-b.css");
        assert_eq!(planned[1].filename, "x-test-a-b-2.css");
        assert_eq!(planned[1].url, urls[1]);
    }

    #[tokio::test]
    async fn test_run_missing_folder_makes_no_request() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .expect(0)
            .mount(&mock_server)
            .await;

        let loader = PageLoader::new(HttpClient::new());
        let url = format!("{}/a", mock_server.uri());
        let result = loader.run(&url, &missing).await;

        match result {
            Err(PageError::Folder { path, .. }) => assert_eq!(path, missing),
            other => panic!("Expected Folder error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_page_without_resources_writes_single_file() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        let temp_dir = TempDir::new().unwrap();
        let html = "<html><head></head><body><p>plain</p></body></html>";

        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&mock_server)
            .await;

        let loader = PageLoader::new(HttpClient::new());
        let url = format!("{}/a", mock_server.uri());
        let saved = loader.run(&url, temp_dir.path()).await.unwrap();

        assert_eq!(saved.len(), 1);
        assert_eq!(
            saved.main_file().file_name().unwrap().to_str().unwrap(),
            "127-0-0-1-a.html"
        );
        assert_eq!(std::fs::read_to_string(saved.main_file()).unwrap(), html);
        assert!(!temp_dir.path().join("127-0-0-1-a_files").exists());
    }
}
