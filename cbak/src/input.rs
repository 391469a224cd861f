//! What the user asked for in one invocation.

use crate::config::DEFAULT_CONFIG_FILE;
use std::path::PathBuf;

/// The single mode an invocation runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Backup(BackupRequest),
    Restore { archive: PathBuf },
    Extract { archive: PathBuf },
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRequest {
    /// Paths walked in the given order
    pub input_paths: Vec<PathBuf>,

    pub exclude_paths: Vec<PathBuf>,

    /// Tag names resolved through the tag registry
    pub tags: Vec<String>,

    /// Archive path; derived from the config or the clock when absent
    pub output_path: Option<PathBuf>,

    /// Also read the backup config at `config_path`
    pub use_config: bool,

    pub config_path: PathBuf,
}

impl Default for BackupRequest {
    fn default() -> Self {
        Self {
            input_paths: Vec::new(),
            exclude_paths: Vec::new(),
            tags: Vec::new(),
            output_path: None,
            use_config: false,
            config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
        }
    }
}
