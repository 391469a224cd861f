//! Backup config file loading.
//!
//! A backup config declares a named backup: an optional archive name, paths
//! and tags. JSON is the default format; files ending in `.toml` are parsed
//! as TOML with the same field names.

use crate::fs::paths::Environment;
use crate::utils::{CbakError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up when `--config` is given without a value.
pub const DEFAULT_CONFIG_FILE: &str = "cbak.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupConfig {
    /// Archive file name used when no output path is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_name: Option<String>,

    #[serde(default)]
    pub backup_paths: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

impl BackupConfig {
    /// Load a config file, resolving `path` against the working directory.
    pub fn load(env: &Environment, path: &Path) -> Result<Self> {
        let abs_path = env.resolve(path);

        let metadata =
            std::fs::metadata(&abs_path).map_err(|e| CbakError::from_stat(&abs_path, e))?;
        if metadata.is_dir() {
            return Err(CbakError::PathIsDirectory(abs_path));
        }

        let content = std::fs::read_to_string(&abs_path).map_err(|source| CbakError::ConfigRead {
            path: abs_path.clone(),
            source,
        })?;

        Self::parse(&abs_path, &content)
    }

    /// Parse config text; the format is picked from the extension of `path`.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let parsed = if is_toml {
            toml::from_str(content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(content).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| CbakError::ConfigParse {
            path: PathBuf::from(path),
            message,
        })
    }

    /// Backup name, treating an empty string as absent.
    pub fn backup_name(&self) -> Option<&str> {
        self.backup_name.as_deref().filter(|name| !name.is_empty())
    }
}
