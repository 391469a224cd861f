//! Inclusion walking: expand one root path into archive entries.
//!
//! Every visited path becomes an [`Entry`] plus the [`Slot`] needed to put it
//! back. Unlike exclusion building, any stat or read failure aborts the walk.

use super::exclude::ExclusionSet;
use super::paths::{path_str, Environment, FileId};
use crate::plan::{Entry, HeaderStamper, Slot};
use crate::utils::{CbakError, Result};
use std::fs::Metadata;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Everything a walk needs to know about the current run.
#[derive(Debug, Clone, Copy)]
pub struct WalkContext<'a> {
    pub env: &'a Environment,
    pub exclusions: &'a ExclusionSet,

    /// Resolved archive path; never allowed as an input
    pub output_path: &'a Path,

    /// Identity of an archive that already exists at `output_path`, so it is
    /// also caught when reached through a symlinked directory
    pub output_id: Option<FileId>,
}

impl<'a> WalkContext<'a> {
    pub fn new(env: &'a Environment, exclusions: &'a ExclusionSet, output_path: &'a Path) -> Self {
        Self {
            env,
            exclusions,
            output_path,
            output_id: FileId::of_path(output_path),
        }
    }

    fn is_output(&self, path: &Path, metadata: &Metadata) -> bool {
        path == self.output_path
            || (self.output_id.is_some() && FileId::of(metadata) == self.output_id)
    }
}

/// An entry together with its restore slot, not yet merged into a plan.
#[derive(Debug, Clone)]
pub struct StagedEntry {
    pub entry: Entry,
    pub slot: Slot,
}

/// Expand `root` into staged entries.
///
/// A file yields one entry named after its base name. A directory yields
/// itself and every descendant, named relative to the directory's parent.
/// Excluded paths are skipped, and excluded directories are not descended.
pub fn walk(
    root: &Path,
    ctx: &WalkContext<'_>,
    stamper: &mut HeaderStamper,
) -> Result<Vec<StagedEntry>> {
    let abs_root = ctx.env.resolve(root);

    if ctx.exclusions.contains(&abs_root) {
        info!("Path {} is excluded", root.display());
        return Ok(Vec::new());
    }

    let metadata =
        std::fs::symlink_metadata(&abs_root).map_err(|e| CbakError::from_stat(&abs_root, e))?;

    let base = abs_root.parent().unwrap_or(Path::new("/"));
    let mut staged = Vec::new();

    if metadata.is_dir() {
        let walker = WalkDir::new(&abs_root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !ctx.exclusions.contains(entry.path()));

        for entry in walker {
            let entry = entry.map_err(walk_error)?;
            let metadata = entry.metadata().map_err(walk_error)?;
            staged.push(stage(entry.path(), base, metadata, ctx, stamper)?);
        }

        debug!("Walked {} ({} entries)", abs_root.display(), staged.len());
    } else {
        staged.push(stage(&abs_root, base, metadata, ctx, stamper)?);
    }

    Ok(staged)
}

fn stage(
    path: &Path,
    base: &Path,
    metadata: Metadata,
    ctx: &WalkContext<'_>,
    stamper: &mut HeaderStamper,
) -> Result<StagedEntry> {
    if ctx.is_output(path, &metadata) {
        return Err(CbakError::SelfRecursion(path.to_path_buf()));
    }

    let full = path_str(path)?;
    let relative = path.strip_prefix(base).unwrap_or(path);
    let relative = path_str(relative)?;
    let parent = full.strip_suffix(relative).unwrap_or(full);

    let entry = Entry {
        header_name: stamper.header_name(relative),
        source_path: path.to_path_buf(),
        is_dir: metadata.is_dir(),
        metadata,
    };
    let slot = Slot::portable(parent, relative, &ctx.env.home_dir);

    Ok(StagedEntry { entry, slot })
}

fn walk_error(err: walkdir::Error) -> CbakError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
    CbakError::from_stat(path, err.into())
}
