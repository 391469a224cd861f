//! Mode dispatch: runs exactly one of backup, restore, extract or version.

use crate::archive::{self, PackSummary, UnpackSummary};
use crate::config::BackupConfig;
use crate::fs::exclude::ExclusionSet;
use crate::fs::paths::Environment;
use crate::fs::walker::WalkContext;
use crate::input::{BackupRequest, Mode};
use crate::output::{warn_overwrite, OutputResolver, OVERWRITE_GRACE};
use crate::plan::build_backup_plan;
use crate::tags::TagRegistry;
use crate::utils::{CbakError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// `cbak <version>`
pub fn version_string() -> String {
    format!("cbak {}", env!("CARGO_PKG_VERSION"))
}

/// What a finished invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    BackedUp {
        archive: PathBuf,
        summary: PackSummary,
    },
    Restored(UnpackSummary),
    Extracted(UnpackSummary),
    Version(String),
}

pub struct Manager {
    env: Environment,
    tags: TagRegistry,
    overwrite_grace: Duration,
}

impl Manager {
    pub fn new(env: Environment, tags: TagRegistry) -> Self {
        Self {
            env,
            tags,
            overwrite_grace: OVERWRITE_GRACE,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_overwrite_grace(mut self, grace: Duration) -> Self {
        self.overwrite_grace = grace;
        self
    }

    pub fn manage(&self, mode: Option<Mode>) -> Result<Outcome> {
        match mode {
            Some(Mode::Backup(request)) => self.backup(&request),
            Some(Mode::Restore { archive }) => {
                let archive = self.archive_path(&archive)?;
                Ok(Outcome::Restored(archive::restore(&archive, &self.env.home_dir)?))
            }
            Some(Mode::Extract { archive }) => {
                let archive = self.archive_path(&archive)?;
                Ok(Outcome::Extracted(archive::extract(&archive, &self.env.cwd)?))
            }
            Some(Mode::Version) => Ok(Outcome::Version(version_string())),
            None => Err(CbakError::NoModeSelected),
        }
    }

    fn backup(&self, request: &BackupRequest) -> Result<Outcome> {
        let config = if request.use_config {
            Some(BackupConfig::load(&self.env, &request.config_path)?)
        } else {
            None
        };

        let target = OutputResolver::new(&self.env).resolve(request, config.as_ref())?;
        info!("Backup will be written to {}", target.path.display());

        let exclusions = ExclusionSet::build(&self.env, &request.exclude_paths);
        let ctx = WalkContext::new(&self.env, &exclusions, &target.path);
        let plan = build_backup_plan(request, config.as_ref(), ctx, &self.tags)?;

        // only pause once the plan is known to be packable
        if target.overwrites {
            warn_overwrite(&target.path, self.overwrite_grace);
        }

        let summary = archive::pack(&plan, &target.path)?;
        Ok(Outcome::BackedUp {
            archive: target.path,
            summary,
        })
    }

    /// Resolve an archive path for restore/extract; it must be an existing file.
    fn archive_path(&self, raw: &Path) -> Result<PathBuf> {
        let path = self.env.resolve(raw);
        let metadata = std::fs::metadata(&path).map_err(|e| CbakError::from_stat(&path, e))?;
        if metadata.is_dir() {
            return Err(CbakError::PathIsDirectory(path));
        }
        Ok(path)
    }
}
