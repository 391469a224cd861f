//! A single file, directory or symlink destined for the archive.

use std::fs::Metadata;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Entry {
    /// Unique name of the entry inside the archive
    pub header_name: String,

    /// Absolute path the content is read from
    pub source_path: PathBuf,

    pub is_dir: bool,

    /// Metadata captured without following symlinks
    pub metadata: Metadata,
}

impl Entry {
    pub fn is_symlink(&self) -> bool {
        self.metadata.file_type().is_symlink()
    }

    /// Bytes of content this entry contributes to the archive.
    pub fn content_len(&self) -> u64 {
        if self.metadata.is_file() {
            self.metadata.len()
        } else {
            0
        }
    }
}
