use crate::adapter::AdapterEntry;
use crate::utils::path::{join_path, split_path};
use serde::Serialize;
use std::fmt;
use std::time::SystemTime;

/// Kind of a listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// A normalized listing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub dirname: String,
    pub basename: String,
    pub kind: EntryKind,
    pub modified: Option<SystemTime>,
    /// Byte size; always `None` for directories.
    pub size: Option<u64>,
}

impl Listing {
    pub fn uri(&self) -> String {
        join_path(&self.dirname, &self.basename)
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

impl From<AdapterEntry> for Listing {
    fn from(entry: AdapterEntry) -> Self {
        let (dirname, basename) = split_path(&entry.path);
        let (kind, size) = if entry.is_dir {
            (EntryKind::Directory, None)
        } else {
            (EntryKind::File, entry.size)
        };
        Self {
            dirname,
            basename,
            kind,
            modified: entry.last_modified,
            size,
        }
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file_type = if self.is_dir() { "DIR" } else { "FILE" };
        let size_str = self
            .size
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        write!(f, "{file_type:<6} {size_str:>10} {}", self.uri())
    }
}
