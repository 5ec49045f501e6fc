//! Where a run reads and writes, relative to the project root.

use harvest_config::CONFIG_FILE_NAME;
use std::path::PathBuf;

/// Overrides the project root; defaults to the working directory.
pub const ROOT_ENV: &str = "HARVEST_ROOT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    pub config_file: PathBuf,
    /// The zip export is dropped here by hand.
    pub resources_dir: PathBuf,
    /// Extraction target and output location.
    pub temp_dir: PathBuf,
    pub raw_pages_file: PathBuf,
    pub cleaned_pages_file: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let temp_dir = root.join("temp");
        Self {
            config_file: root.join(CONFIG_FILE_NAME),
            resources_dir: root.join("resources"),
            raw_pages_file: temp_dir.join("websites_data.json"),
            cleaned_pages_file: temp_dir.join("cleaned_websites_data.json"),
            temp_dir,
            root,
        }
    }

    /// Root from `HARVEST_ROOT`, else the current directory.
    pub fn discover() -> std::io::Result<Self> {
        let root = match std::env::var_os(ROOT_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => std::env::current_dir()?,
        };
        Ok(Self::new(root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_hang_off_the_root() {
        let layout = Layout::new("/srv/harvest");
        assert_eq!(layout.config_file, PathBuf::from("/srv/harvest/config.json"));
        assert_eq!(layout.resources_dir, PathBuf::from("/srv/harvest/resources"));
        assert_eq!(layout.temp_dir, PathBuf::from("/srv/harvest/temp"));
        assert_eq!(
            layout.raw_pages_file,
            PathBuf::from("/srv/harvest/temp/websites_data.json")
        );
        assert_eq!(
            layout.cleaned_pages_file,
            PathBuf::from("/srv/harvest/temp/cleaned_websites_data.json")
        );
    }
}
