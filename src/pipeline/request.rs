//! Pipeline input and output types.

use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{FolderErrorKind, PageError};

/// A validated request to save one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Absolute http(s) URL of the page, fragment removed.
    pub url: Url,
    /// Absolute path of the folder the page is saved into.
    pub output_folder: PathBuf,
}

impl PageRequest {
    /// Validates `url` and resolves `output_folder` to an absolute path.
    ///
    /// Performs no I/O; whether the folder exists is checked by the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::InvalidUrl`] unless `url` is an absolute `http` or
    /// `https` URL with a host, and [`PageError::Folder`] for an empty folder
    /// path.
    pub fn new(url: &str, output_folder: impl AsRef<Path>) -> Result<Self, PageError> {
        let mut parsed = Url::parse(url.trim()).map_err(|_| PageError::invalid_url(url))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(PageError::invalid_url(url));
        }
        parsed.set_fragment(None);

        let output_folder = output_folder.as_ref();
        let output_folder = std::path::absolute(output_folder)
            .map_err(|_| PageError::folder(output_folder, FolderErrorKind::NotFound))?;

        Ok(Self {
            url: parsed,
            output_folder,
        })
    }
}

/// Absolute paths written by one run: the main page first, then every
/// resource in the order it was discovered in the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet {
    paths: Vec<PathBuf>,
}

impl ResultSet {
    pub(crate) fn new(main_file: PathBuf, resources: Vec<PathBuf>) -> Self {
        let mut paths = Vec::with_capacity(resources.len() + 1);
        paths.push(main_file);
        paths.extend(resources);
        Self { paths }
    }

    /// Path of the saved HTML page.
    #[must_use]
    pub fn main_file(&self) -> &Path {
        &self.paths[0]
    }

    /// Paths of the saved resources.
    #[must_use]
    pub fn resources(&self) -> &[PathBuf] {
        &self.paths[1..]
    }

    /// Number of written files (never zero).
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Always `false`; a successful run writes at least the main page.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterates over all written paths, main page first.
    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.paths.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}
