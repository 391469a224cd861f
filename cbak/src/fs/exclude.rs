//! Exclusion set built from user-supplied exclude paths.
//!
//! Directories are expanded into their full recursive content up front, so a
//! later membership test is enough no matter which source rediscovers a path.

use super::paths::Environment;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Absolute paths that must never end up in an archive.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    paths: HashSet<PathBuf>,
}

impl ExclusionSet {
    /// Resolve and expand every raw exclude path.
    ///
    /// Paths that cannot be stat'ed are dropped with a warning. Errors while
    /// walking an excluded directory are ignored per entry.
    pub fn build<P: AsRef<Path>>(env: &Environment, raw_paths: &[P]) -> Self {
        let mut paths = HashSet::new();

        for raw in raw_paths {
            let raw = raw.as_ref();
            let abs_path = env.resolve(raw);

            let metadata = match std::fs::metadata(&abs_path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!(
                        "The path {} is causing an error, so it is removed from the exclude list: {}",
                        raw.display(),
                        e
                    );
                    continue;
                }
            };

            if metadata.is_dir() {
                let before = paths.len();
                for entry in WalkDir::new(&abs_path).into_iter().filter_map(|e| e.ok()) {
                    paths.insert(entry.into_path());
                }
                debug!(
                    "Excluding directory {} ({} paths)",
                    abs_path.display(),
                    paths.len() - before
                );
            } else {
                paths.insert(abs_path);
            }
        }

        Self { paths }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
