//! The two page maps a scrape run persists.

use crate::extract::extract_text;
use harvest_common::Result;
use std::collections::BTreeMap;
use std::path::Path;

/// URL → fetched HTML; `None` records a failed fetch.
pub type RawPageMap = BTreeMap<String, Option<String>>;

/// URL → plain text, only for pages that had content.
pub type CleanedPageMap = BTreeMap<String, String>;

pub fn write_raw_pages(path: &Path, pages: &RawPageMap) -> Result<()> {
    harvest_common::json::write_pretty(path, pages)
}

pub fn read_raw_pages(path: &Path) -> Result<RawPageMap> {
    harvest_common::json::read(path)
}

pub fn write_cleaned_pages(path: &Path, pages: &CleanedPageMap) -> Result<()> {
    harvest_common::json::write_pretty(path, pages)
}

/// Strip every page that has content; failed and empty pages are dropped.
pub fn clean_pages(raw: &RawPageMap) -> CleanedPageMap {
    raw.iter()
        .filter_map(|(url, html)| {
            let html = html.as_deref().filter(|h| !h.is_empty())?;
            Some((url.clone(), extract_text(html)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_and_empty_pages_are_dropped() {
        let mut raw = RawPageMap::new();
        raw.insert("https://ok.example".into(), Some("<p>Fine</p>".into()));
        raw.insert("https://down.example".into(), None);
        raw.insert("https://blank.example".into(), Some(String::new()));

        let cleaned = clean_pages(&raw);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned["https://ok.example"], "Fine");
    }

    #[test]
    fn raw_map_on_disk_keeps_failures_as_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("websites_data.json");
        let mut raw = RawPageMap::new();
        raw.insert("https://down.example".into(), None);
        write_raw_pages(&path, &raw).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\n    \"https://down.example\": null\n}");
        assert_eq!(read_raw_pages(&path).unwrap(), raw);
    }
}
