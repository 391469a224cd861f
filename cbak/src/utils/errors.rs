//! Custom error types for cbak.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CbakError {
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Cannot stat {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The output path '{}' is already taken as a directory", .0.display())]
    OutputIsDirectory(PathBuf),

    #[error("The given path '{}' is a directory, not a file", .0.display())]
    PathIsDirectory(PathBuf),

    #[error(
        "Output path [{}] is also given as input path, this leads to a recursive backup. \
         Try deleting the file or moving it to a different location",
        .0.display()
    )]
    SelfRecursion(PathBuf),

    #[error("Header name '{0}' is already entered in the restore mapping")]
    DuplicateHeader(String),

    #[error("No paths or tags are given for taking backup")]
    NoInputSpecified,

    #[error("Cannot read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config file {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("No mode selected: use 'backup', 'restore', 'extract' or 'version' (see --help)")]
    NoModeSelected,

    #[error("Unknown tag: {0}")]
    UnknownTag(String),

    #[error("Cannot determine the home directory")]
    HomeDirUnavailable,

    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CbakError {
    /// Map a failed stat on `path` to `NotFound` or `Stat`.
    pub fn from_stat(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            CbakError::NotFound(path)
        } else {
            CbakError::Stat { path, source }
        }
    }
}

pub type Result<T> = std::result::Result<T, CbakError>;
