//! JSON persistence helpers.
//!
//! Every document the pipeline writes (config template, page maps) uses the
//! same layout: UTF-8, four-space indentation, non-ASCII kept verbatim.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::Result;

const INDENT: &[u8] = b"    ";

/// Serialize `value` with four-space indentation.
///
/// ```
/// let text = harvest_common::json::to_pretty_string(&serde_json::json!({"a": 1})).unwrap();
/// assert_eq!(text, "{\n    \"a\": 1\n}");
/// ```
pub fn to_pretty_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut ser)?;
    // serde_json only ever emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write `value` to `path`, creating parent directories as needed.
pub fn write_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let text = to_pretty_string(value)?;
    let mut file = fs::File::create(path)?;
    file.write_all(text.as_bytes())?;
    file.flush()?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "json.written");
    Ok(())
}

/// Read a JSON document from `path`.
pub fn read<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn keeps_non_ascii_verbatim() {
        let text = to_pretty_string(&json!({"title": "Zürich – café"})).unwrap();
        assert!(text.contains("Zürich – café"));
        assert!(!text.contains("\\u"));
    }

    #[test]
    fn write_then_read_through_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.json");

        let mut map = BTreeMap::new();
        map.insert("https://a.example".to_string(), Some("<p>a</p>".to_string()));
        map.insert("https://b.example".to_string(), None);
        write_pretty(&path, &map).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n    \"https://a.example\""));
        assert!(raw.contains("\"https://b.example\": null"));

        let back: BTreeMap<String, Option<String>> = read(&path).unwrap();
        assert_eq!(back, map);
    }
}
