//! Durable reference-list storage
//!
//! Two line-oriented files under the data directory: the repeating list
//! (`default` in the API) cycles forever, the unique list is consumed
//! exactly once per streaming session. A missing file reads as an empty
//! list, which the selector treats as "not configured".

use crate::error::Result;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// File name of the repeating reference list
pub const REFERENCE_LIST_FILE: &str = "reference-list.txt";

/// File name of the unique reference list
pub const REFERENCE_LIST_UNIQUE_FILE: &str = "reference-list-unique.txt";

/// The two reference-list kinds exposed by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Cycles forever (`default` in the API)
    Repeating,
    /// Consumed exactly once per session
    Unique,
}

impl ListKind {
    /// Map the API path segment to a list kind
    pub fn from_route(segment: &str) -> Option<Self> {
        match segment {
            "default" => Some(ListKind::Repeating),
            "unique" => Some(ListKind::Unique),
            _ => None,
        }
    }

    fn file_name(self) -> &'static str {
        match self {
            ListKind::Repeating => REFERENCE_LIST_FILE,
            ListKind::Unique => REFERENCE_LIST_UNIQUE_FILE,
        }
    }
}

/// File-backed store for both reference lists
#[derive(Debug, Clone)]
pub struct ReferenceListStore {
    dir: PathBuf,
}

impl ReferenceListStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ReferenceListStore { dir: dir.into() }
    }

    fn path(&self, kind: ListKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// Read the full contents of a list. A missing file is an empty list.
    pub fn read(&self, kind: ListKind) -> Result<Vec<String>> {
        let path = self.path(kind);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        Ok(content
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect())
    }

    /// Replace the full contents of a list
    pub fn replace(&self, kind: ListKind, entries: &[String]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut body = entries.join("\n");
        body.push('\n');
        fs::write(self.path(kind), body)?;
        Ok(())
    }

    /// Append entries to the end of a list, creating it if absent
    pub fn append(&self, kind: ListKind, entries: &[String]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut file =
            OpenOptions::new().create(true).append(true).open(self.path(kind))?;
        let mut body = entries.join("\n");
        body.push('\n');
        file.write_all(body.as_bytes())?;
        Ok(())
    }

    /// Delete a list. Deleting an absent list is a no-op.
    pub fn delete(&self, kind: ListKind) -> Result<()> {
        let path = self.path(kind);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReferenceListStore::new(dir.path());
        assert!(store.read(ListKind::Repeating).unwrap().is_empty());
    }

    #[test]
    fn test_replace_append_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReferenceListStore::new(dir.path());

        store
            .replace(ListKind::Unique, &["AA".to_string(), "BB".to_string()])
            .unwrap();
        assert_eq!(store.read(ListKind::Unique).unwrap(), vec!["AA", "BB"]);

        store.append(ListKind::Unique, &["CC".to_string()]).unwrap();
        assert_eq!(store.read(ListKind::Unique).unwrap(), vec!["AA", "BB", "CC"]);

        store.delete(ListKind::Unique).unwrap();
        assert!(store.read(ListKind::Unique).unwrap().is_empty());
        // idempotent
        store.delete(ListKind::Unique).unwrap();
    }

    #[test]
    fn test_route_segment_mapping() {
        assert_eq!(ListKind::from_route("default"), Some(ListKind::Repeating));
        assert_eq!(ListKind::from_route("unique"), Some(ListKind::Unique));
        assert_eq!(ListKind::from_route("bogus"), None);
    }
}
