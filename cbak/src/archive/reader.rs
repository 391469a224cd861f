//! Reading archives back: restore to original locations, or extract locally.

use super::{RestoreFile, RESTORE_ENTRY_NAME};
use crate::plan::Slot;
use crate::utils::{CbakError, Result};
use filetime::FileTime;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};
use tar::Archive;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackSummary {
    pub entries: usize,

    /// Directory everything was extracted into; `None` for restores
    pub destination: Option<PathBuf>,
}

/// Put every entry back where it was found, substituting `home_dir` for the
/// home placeholder.
pub fn restore(archive_path: &Path, home_dir: &Path) -> Result<UnpackSummary> {
    info!("Restoring {}", archive_path.display());

    let entries = unpack_with(archive_path, |slot| Ok(slot.restore_path(home_dir)))?;

    info!("Restored {} entries", entries);
    Ok(UnpackSummary {
        entries,
        destination: None,
    })
}

/// Extract every entry under `<dest_dir>/<archive file stem>/`, keeping only
/// the path relative to the backed-up root.
pub fn extract(archive_path: &Path, dest_dir: &Path) -> Result<UnpackSummary> {
    let stem = archive_path
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "extracted".into());
    let destination = dest_dir.join(stem);
    info!(
        "Extracting {} into {}",
        archive_path.display(),
        destination.display()
    );

    let entries = unpack_with(archive_path, |slot| {
        Ok(destination.join(relative_name(slot)?))
    })?;

    info!("Extracted {} entries", entries);
    Ok(UnpackSummary {
        entries,
        destination: Some(destination),
    })
}

/// Read only the restore mapping of an archive.
pub fn read_restore_file(archive_path: &Path) -> Result<RestoreFile> {
    let mut archive = Archive::new(BufReader::new(File::open(archive_path)?));
    let mut entries = archive.entries()?;
    match entries.next() {
        Some(entry) => parse_restore_entry(entry?),
        None => Err(CbakError::CorruptArchive("archive is empty".to_string())),
    }
}

fn unpack_with<F>(archive_path: &Path, mut target_for: F) -> Result<usize>
where
    F: FnMut(&Slot) -> Result<PathBuf>,
{
    let mut archive = Archive::new(BufReader::new(File::open(archive_path)?));
    archive.set_preserve_permissions(true);
    archive.set_preserve_mtime(true);
    archive.set_overwrite(true);

    let mut entries = archive.entries()?;
    let restore_file = match entries.next() {
        Some(entry) => parse_restore_entry(entry?)?,
        None => return Err(CbakError::CorruptArchive("archive is empty".to_string())),
    };

    let mut count = 0;
    let mut dir_times = Vec::new();
    for entry in entries {
        let mut entry = entry?;
        let name = entry.path()?.to_string_lossy().into_owned();
        let slot = restore_file.slots.get(&name).ok_or_else(|| {
            CbakError::CorruptArchive(format!("no restore slot for entry '{name}'"))
        })?;

        let target = target_for(slot)?;
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        entry.unpack(&target)?;
        debug!("Unpacked {} to {}", name, target.display());
        count += 1;

        if entry.header().entry_type().is_dir() {
            dir_times.push((target, entry.header().mtime()?));
        }
    }

    // unpacking children bumps their directory's mtime, so set it last
    for (dir, mtime) in dir_times.into_iter().rev() {
        filetime::set_file_mtime(&dir, FileTime::from_unix_time(mtime as i64, 0))?;
    }

    Ok(count)
}

fn parse_restore_entry<R: Read>(mut entry: tar::Entry<'_, R>) -> Result<RestoreFile> {
    let name = entry.path()?.to_string_lossy().into_owned();
    if name != RESTORE_ENTRY_NAME {
        return Err(CbakError::CorruptArchive(format!(
            "expected '{RESTORE_ENTRY_NAME}' as first entry, found '{name}'"
        )));
    }

    let mut json = String::new();
    entry.read_to_string(&mut json)?;
    Ok(serde_json::from_str(&json)?)
}

/// Slot header name as a relative path, refusing anything that could escape
/// the extraction directory.
fn relative_name(slot: &Slot) -> Result<&Path> {
    let path = Path::new(&slot.header_name);
    if path.components().all(|c| matches!(c, Component::Normal(_))) {
        Ok(path)
    } else {
        Err(CbakError::CorruptArchive(format!(
            "unsafe entry name '{}'",
            slot.header_name
        )))
    }
}
