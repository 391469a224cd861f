//! Backup plan construction.
//!
//! Combines explicit paths, config-declared paths and tags, and CLI tags
//! into one ordered entry list plus the restore mapping the archive writer
//! stores next to the data.

pub mod entry;
pub mod slots;
pub mod stamp;

pub use entry::Entry;
pub use slots::{RestoreMapping, Slot, HOME_PLACEHOLDER};
pub use stamp::HeaderStamper;

use crate::config::BackupConfig;
use crate::fs::walker::{walk, StagedEntry, WalkContext};
use crate::input::BackupRequest;
use crate::tags::TagRegistry;
use crate::utils::{CbakError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// Ordered entries and their restore mapping.
#[derive(Debug, Default)]
pub struct BackupPlan {
    pub entries: Vec<Entry>,
    pub mapping: RestoreMapping,
}

impl BackupPlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(Entry::content_len).sum()
    }
}

/// Accumulates entries from several sources into a single plan.
pub struct PlanBuilder<'a> {
    ctx: WalkContext<'a>,
    tags: &'a TagRegistry,
    stamper: HeaderStamper,
    sources: HashSet<PathBuf>,
    plan: BackupPlan,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(ctx: WalkContext<'a>, tags: &'a TagRegistry) -> Self {
        Self {
            ctx,
            tags,
            stamper: HeaderStamper::new(),
            sources: HashSet::new(),
            plan: BackupPlan::default(),
        }
    }

    /// Walk `path` and merge the result. Returns the number of entries added.
    pub fn add_path(&mut self, path: &Path) -> Result<usize> {
        let staged = walk(path, &self.ctx, &mut self.stamper)?;
        let count = staged.len();
        for staged_entry in staged {
            self.merge(staged_entry)?;
        }
        Ok(count)
    }

    /// Resolve each tag through the registry and add its path.
    pub fn add_tags(&mut self, tags: &[String]) -> Result<usize> {
        let mut count = 0;
        for tag in tags {
            let path = self.tags.resolve(tag, &self.ctx.env.home_dir)?;
            count += self.add_path(&path)?;
        }
        Ok(count)
    }

    fn merge(&mut self, staged: StagedEntry) -> Result<()> {
        let StagedEntry { entry, slot } = staged;

        if self.sources.contains(&entry.source_path) {
            return Err(CbakError::DuplicateHeader(slot.header_name));
        }

        self.plan.mapping.insert(entry.header_name.clone(), slot)?;
        self.sources.insert(entry.source_path.clone());
        self.plan.entries.push(entry);
        Ok(())
    }

    pub fn finish(self) -> BackupPlan {
        self.plan
    }
}

/// Build the plan for one backup run.
///
/// Sources are evaluated in order: explicit paths, then the config's paths
/// and tags (when `config` is given), then CLI tags. Any failure aborts the
/// whole build.
pub fn build_backup_plan(
    request: &BackupRequest,
    config: Option<&BackupConfig>,
    ctx: WalkContext<'_>,
    tags: &TagRegistry,
) -> Result<BackupPlan> {
    let mut builder = PlanBuilder::new(ctx, tags);

    if request.input_paths.is_empty() {
        if config.is_none() && request.tags.is_empty() {
            return Err(CbakError::NoInputSpecified);
        }
    } else {
        for path in &request.input_paths {
            builder.add_path(path)?;
        }
    }

    let mut config_supplied = false;
    if let Some(config) = config {
        if config.backup_paths.is_empty() {
            info!("No backup paths mentioned in the backup config, proceeding with backup");
        } else {
            config_supplied = true;
            for path in &config.backup_paths {
                builder.add_path(Path::new(path))?;
            }
        }

        if config.tags.is_empty() {
            info!("No tags mentioned in the backup config, proceeding with backup");
        } else {
            config_supplied = true;
            builder.add_tags(&config.tags)?;
        }
    }

    if request.tags.is_empty() {
        if request.input_paths.is_empty() && !config_supplied {
            return Err(CbakError::NoInputSpecified);
        }
    } else {
        builder.add_tags(&request.tags)?;
    }

    let plan = builder.finish();
    info!(
        "Backup plan ready: {} entries, {} bytes",
        plan.len(),
        plan.total_bytes()
    );
    Ok(plan)
}
