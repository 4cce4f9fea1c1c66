//! Filesystem-safe names derived from URLs.
//!
//! Saved files are named after the host and path of the URL they came from:
//! `https://x.test/img/logo.png` becomes `x-test-img-logo.png`. These helpers
//! are pure and perform no I/O.

use std::collections::HashSet;
use std::path::Path;

use url::Url;

use crate::error::PageError;

/// Trailing extensions removed from a URL before it becomes a base name.
const STRIPPED_EXTENSIONS: &[&str] = &[
    ".html", ".htm", ".css", ".js", ".jpg", ".jpeg", ".png", ".gif",
];

/// Longest extension (dot included) accepted from a URL path.
const MAX_URL_EXTENSION_LEN: usize = 12;

/// Extension used when neither the URL nor the content type provides one.
const DEFAULT_EXTENSION: &str = ".html";

/// Suffix appended to the page base name to form the resources folder.
pub const RESOURCES_FOLDER_SUFFIX: &str = "_files";

/// Derives the filesystem-safe base name for `url`.
///
/// Takes the host followed by the path, strips one recognized trailing
/// extension, then replaces every character outside `[A-Za-z0-9]` with `-`.
///
/// # Errors
///
/// Returns [`PageError::InvalidUrl`] if `url` is not an absolute URL.
pub fn derive_base_name(url: &str) -> Result<String, PageError> {
    let parsed = Url::parse(url).map_err(|_| PageError::invalid_url(url))?;
    Ok(base_name_for(&parsed))
}

/// Same as [`derive_base_name`] for an already parsed URL.
#[must_use]
pub fn base_name_for(url: &Url) -> String {
    let raw = format!("{}{}", url.host_str().unwrap_or_default(), url.path());
    let stem = STRIPPED_EXTENSIONS
        .iter()
        .find_map(|ext| strip_suffix_ignore_ascii_case(&raw, ext))
        .unwrap_or(&raw);

    stem.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Derives the file extension (with leading dot) for a fetched resource.
///
/// The extension in the URL path wins; otherwise the `Content-Type` header
/// is mapped to a fixed extension, falling back to `.html`.
#[must_use]
pub fn derive_extension(url: &Url, content_type: Option<&str>) -> String {
    extension_from_url(url).unwrap_or_else(|| {
        content_type
            .and_then(extension_from_content_type)
            .unwrap_or(DEFAULT_EXTENSION)
            .to_string()
    })
}

/// Derives the resources folder name for a page: base name plus `_files`.
///
/// # Errors
///
/// Returns [`PageError::InvalidUrl`] if `page_url` is not an absolute URL.
pub fn derive_folder_name(page_url: &str) -> Result<String, PageError> {
    Ok(format!(
        "{}{RESOURCES_FOLDER_SUFFIX}",
        derive_base_name(page_url)?
    ))
}

/// Full filename (base name plus extension) for a fetched resource.
#[must_use]
pub fn derive_filename(url: &Url, content_type: Option<&str>) -> String {
    format!("{}{}", base_name_for(url), derive_extension(url, content_type))
}

/// Returns `filename`, or `stem-N.ext` with the lowest `N >= 2` not in `taken`.
///
/// The returned name is inserted into `taken`.
pub(crate) fn claim_unique_filename(filename: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(filename.to_string()) {
        return filename.to_string();
    }

    let (stem, ext) = match filename.rfind('.') {
        Some(pos) => (&filename[..pos], &filename[pos..]),
        None => (filename, ""),
    };

    let mut suffix = 2_usize;
    loop {
        let candidate = format!("{stem}-{suffix}{ext}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        suffix += 1;
    }
}

fn extension_from_url(url: &Url) -> Option<String> {
    let last_segment = url.path_segments()?.next_back()?;
    let ext = Path::new(last_segment).extension()?.to_str()?;
    let with_dot = format!(".{ext}");
    if with_dot.len() > MAX_URL_EXTENSION_LEN || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(with_dot.to_ascii_lowercase())
}

/// Maps a `Content-Type` header value to a file extension.
fn extension_from_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "text/css" => Some(".css"),
        "image/jpeg" => Some(".jpg"),
        "image/png" => Some(".png"),
        "text/javascript" => Some(".js"),
        "image/gif" => Some(".gif"),
        _ => None,
    }
}

fn strip_suffix_ignore_ascii_case<'a>(value: &'a str, suffix: &str) -> Option<&'a str> {
    let split = value.len().checked_sub(suffix.len())?;
    let tail = value.get(split..)?;
    tail.eq_ignore_ascii_case(suffix).then(|| &value[..split])
}
