//! Reading the entry log from disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use jotlog_core::entry::Entry;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read log file {0}: {1}")]
    Read(PathBuf, #[source] io::Error),

    #[error("failed to parse log file {0}: {1}")]
    Parse(PathBuf, #[source] serde_json::Error),
}

/// Load every entry from a JSON array file. A missing file is an empty log.
pub fn load_entries(path: &Path) -> Result<Vec<Entry>, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "log file does not exist yet");
            return Ok(Vec::new());
        }
        Err(e) => return Err(StoreError::Read(path.to_path_buf(), e)),
    };

    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let entries: Vec<Entry> =
        serde_json::from_str(&raw).map_err(|e| StoreError::Parse(path.to_path_buf(), e))?;
    tracing::debug!(path = %path.display(), count = entries.len(), "loaded entries");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_empty() {
        let tmp = tempdir().unwrap();
        let entries = load_entries(&tmp.path().join("nope.json")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn reads_entries_with_defaults() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("log.json");
        fs::write(
            &path,
            r#"[{"id": "1", "start_time": "2023-01-01T09:00:00", "title": "Task @work"}]"#,
        )
        .unwrap();

        let entries = load_entries(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].section, "Currently");
        assert!(entries[0].note.is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("log.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_entries(&path), Err(StoreError::Parse(..))));
    }
}
