//! Locating and unpacking the user-supplied zip export.

use harvest_common::{HarvestError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A zip file found in the resources directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveCandidate {
    pub path: PathBuf,
    /// Birth time where the filesystem records one, modification time otherwise.
    pub created: SystemTime,
}

/// Picks which archive a run consumes.
pub trait ArchiveSelector: Send + Sync {
    fn select(&self, candidates: &[ArchiveCandidate]) -> Option<PathBuf>;
}

/// The most recently created archive wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewestCreated;

impl ArchiveSelector for NewestCreated {
    fn select(&self, candidates: &[ArchiveCandidate]) -> Option<PathBuf> {
        candidates
            .iter()
            .max_by_key(|c| c.created)
            .map(|c| c.path.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourcesState {
    /// The directory did not exist and was just created.
    Created,
    Ready,
}

/// Make sure the resources directory exists.
pub fn ensure_resources_dir(dir: &Path) -> Result<ResourcesState> {
    if dir.is_dir() {
        return Ok(ResourcesState::Ready);
    }
    fs::create_dir_all(dir)?;
    tracing::info!(path = %dir.display(), "Resources directory created");
    Ok(ResourcesState::Created)
}

/// Every `*.zip` directly inside `dir`, in directory order.
pub fn list_archives(dir: &Path) -> Result<Vec<ArchiveCandidate>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("zip") {
            continue;
        }
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        let created = meta.created().or_else(|_| meta.modified())?;
        out.push(ArchiveCandidate { path, created });
    }
    Ok(out)
}

/// Resolve the archive to process, or [`HarvestError::ArchiveNotFound`].
pub fn find_archive(dir: &Path, selector: &dyn ArchiveSelector) -> Result<PathBuf> {
    let candidates = list_archives(dir)?;
    tracing::debug!(dir = %dir.display(), count = candidates.len(), "archive.candidates");
    selector
        .select(&candidates)
        .ok_or_else(|| HarvestError::ArchiveNotFound(dir.to_path_buf()))
}

/// Unpack every entry of `archive` into `dest`, replacing files of the same
/// name. Returns the number of entries.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<usize> {
    fs::create_dir_all(dest)?;
    let file = fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)
        .map_err(|e| HarvestError::Archive(format!("{}: {e}", archive.display())))?;
    let entries = zip.len();
    zip.extract(dest)
        .map_err(|e| HarvestError::Archive(format!("{}: {e}", archive.display())))?;
    tracing::info!(
        archive = %archive.display(),
        dest = %dest.display(),
        entries,
        "Files extracted"
    );
    Ok(entries)
}
