//! Reading the set of URLs to harvest out of the extracted CSV export.

use harvest_common::{HarvestError, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Column holding the page address in the export.
pub const URL_COLUMN: &str = "URL";

/// File-stem suffix of the companion export that must be skipped.
pub const RESERVED_CSV_SUFFIX: &str = "_all";

/// Picks which CSV file holds the URL list.
pub trait CsvSelector: Send + Sync {
    fn select(&self, candidates: &[PathBuf]) -> Option<PathBuf>;
}

/// First candidate whose file stem does not end with `suffix`.
#[derive(Debug, Clone)]
pub struct FirstWithoutSuffix {
    suffix: String,
}

impl FirstWithoutSuffix {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }
}

impl Default for FirstWithoutSuffix {
    fn default() -> Self {
        Self::new(RESERVED_CSV_SUFFIX)
    }
}

impl CsvSelector for FirstWithoutSuffix {
    fn select(&self, candidates: &[PathBuf]) -> Option<PathBuf> {
        candidates
            .iter()
            .find(|p| {
                p.file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|stem| !stem.ends_with(&self.suffix))
            })
            .cloned()
    }
}

/// Every `*.csv` directly inside `dir`, in directory order.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("csv") {
            out.push(path);
        }
    }
    Ok(out)
}

/// Resolve the URL export, or [`HarvestError::CsvNotFound`].
pub fn find_url_csv(dir: &Path, selector: &dyn CsvSelector) -> Result<PathBuf> {
    let candidates = list_csv_files(dir)?;
    let picked = selector
        .select(&candidates)
        .ok_or_else(|| HarvestError::CsvNotFound(dir.to_path_buf()))?;
    tracing::info!(path = %picked.display(), "Found target CSV file");
    Ok(picked)
}

/// Unique URLs in stable (lexicographic) order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlSet(BTreeSet<String>);

impl UrlSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.0.contains(url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromIterator<String> for UrlSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// True if `url` contains any of `excludes`.
pub fn is_excluded(url: &str, excludes: &[String]) -> bool {
    excludes
        .iter()
        .any(|needle| !needle.is_empty() && url.contains(needle.as_str()))
}

/// Read the `URL` column of `path` into a deduplicated set, dropping blank
/// cells and anything matching `excludes`.
pub fn read_url_set(path: &Path, excludes: &[String]) -> Result<UrlSet> {
    let csv_error = |source: csv::Error| HarvestError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let headers = reader.headers().map_err(csv_error)?;
    let column = headers
        .iter()
        .position(|h| h == URL_COLUMN)
        .ok_or_else(|| HarvestError::MissingColumn {
            column: URL_COLUMN.to_string(),
            path: path.to_path_buf(),
        })?;

    let mut urls = BTreeSet::new();
    let mut excluded = 0usize;
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let Some(url) = record.get(column).map(str::trim) else {
            continue;
        };
        if url.is_empty() {
            continue;
        }
        if is_excluded(url, excludes) {
            excluded += 1;
            tracing::debug!(url, "url.excluded");
            continue;
        }
        urls.insert(url.to_string());
    }

    tracing::info!(
        path = %path.display(),
        unique = urls.len(),
        excluded,
        "URLs found"
    );
    Ok(UrlSet(urls))
}
