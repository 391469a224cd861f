//! Writing a backup plan to disk.

use super::{RestoreFile, RESTORE_ENTRY_NAME};
use crate::plan::{BackupPlan, Entry};
use crate::utils::Result;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tar::{Builder, EntryType, Header};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackSummary {
    /// Data entries written (the mapping entry is not counted)
    pub entries: usize,
    pub bytes: u64,
}

/// Write `plan` as an archive at `output`, mapping entry first.
///
/// The archive is built in a temporary file beside `output` and renamed over
/// it only once complete, so a failed pack leaves any previous archive intact.
pub fn pack(plan: &BackupPlan, output: &Path) -> Result<PackSummary> {
    info!("Packing {} entries into {}", plan.len(), output.display());

    let dir = output.parent().unwrap_or(Path::new("."));
    let temp = NamedTempFile::new_in(dir)?;
    let mut builder = Builder::new(BufWriter::new(temp));

    let restore_file = RestoreFile::new(plan.mapping.clone());
    let json = serde_json::to_vec_pretty(&restore_file)?;
    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Regular);
    header.set_size(json.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(restore_file.created_at.timestamp().max(0) as u64);
    builder.append_data(&mut header, RESTORE_ENTRY_NAME, json.as_slice())?;

    let mut summary = PackSummary::default();
    for entry in &plan.entries {
        if append_entry(&mut builder, entry)? {
            summary.entries += 1;
            summary.bytes += entry.content_len();
        }
    }

    let temp = builder
        .into_inner()?
        .into_inner()
        .map_err(io::IntoInnerError::into_error)?;
    temp.as_file().sync_all()?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }
    temp.persist(output).map_err(|e| e.error)?;

    info!(
        "Packed {} entries ({} bytes) into {}",
        summary.entries,
        summary.bytes,
        output.display()
    );
    Ok(summary)
}

/// Append one entry; returns false for file types tar cannot carry.
fn append_entry<W: Write>(builder: &mut Builder<W>, entry: &Entry) -> io::Result<bool> {
    let mut header = Header::new_gnu();
    header.set_metadata(&entry.metadata);

    if entry.is_dir {
        header.set_size(0);
        builder.append_data(&mut header, &entry.header_name, io::empty())?;
    } else if entry.is_symlink() {
        let target = std::fs::read_link(&entry.source_path)?;
        header.set_size(0);
        builder.append_link(&mut header, &entry.header_name, target)?;
    } else if entry.metadata.is_file() {
        let file = File::open(&entry.source_path)?;
        builder.append_data(&mut header, &entry.header_name, file)?;
    } else {
        warn!("Skipping special file {}", entry.source_path.display());
        return Ok(false);
    }

    debug!("Added {} as {}", entry.source_path.display(), entry.header_name);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::exclude::ExclusionSet;
    use crate::fs::paths::Environment;
    use crate::fs::walker::WalkContext;
    use crate::input::BackupRequest;
    use crate::plan::build_backup_plan;
    use crate::tags::TagRegistry;
    use crate::utils::CbakError;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        temp_dir: TempDir,
        env: Environment,
        output: PathBuf,
    }

    fn fixture() -> std::io::Result<Fixture> {
        let temp_dir = TempDir::new()?;
        let home = temp_dir.path().join("home");
        fs::create_dir_all(home.join("proj"))?;
        fs::create_dir_all(temp_dir.path().join("out"))?;
        fs::write(home.join("notes.txt"), b"notes")?;
        fs::write(home.join("proj/a.txt"), b"a")?;

        Ok(Fixture {
            env: Environment::new(&home, &home),
            output: temp_dir.path().join("out/backup.cbak"),
            temp_dir,
        })
    }

    impl Fixture {
        fn plan(&self, paths: &[&str]) -> Result<BackupPlan> {
            let request = BackupRequest {
                input_paths: paths.iter().map(PathBuf::from).collect(),
                ..BackupRequest::default()
            };
            let exclusions = ExclusionSet::default();
            let ctx = WalkContext::new(&self.env, &exclusions, &self.output);
            build_backup_plan(&request, None, ctx, &TagRegistry::default())
        }

        fn output_dir_listing(&self) -> std::io::Result<Vec<String>> {
            let mut names = fs::read_dir(self.temp_dir.path().join("out"))?
                .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
                .collect::<std::io::Result<Vec<_>>>()?;
            names.sort();
            Ok(names)
        }
    }

    fn first_entry_name(archive: &Path) -> Result<String> {
        let mut archive = tar::Archive::new(File::open(archive)?);
        let mut entries = archive.entries()?;
        let first = entries
            .next()
            .ok_or_else(|| CbakError::CorruptArchive("empty".to_string()))??;
        Ok(first.path()?.to_string_lossy().into_owned())
    }

    #[test]
    fn test_pack_replaces_existing_archive() -> Result<()> {
        let f = fixture()?;
        fs::write(&f.output, b"PREVIOUS GOOD BACKUP")?;
        let plan = f.plan(&["notes.txt", "proj"])?;

        let summary = pack(&plan, &f.output)?;

        assert_eq!(summary.entries, 3);
        assert_eq!(summary.bytes, 6);
        assert_eq!(first_entry_name(&f.output)?, RESTORE_ENTRY_NAME);
        assert_eq!(f.output_dir_listing()?, vec!["backup.cbak"]);
        Ok(())
    }

    #[test]
    fn test_failed_pack_keeps_previous_archive() -> Result<()> {
        let f = fixture()?;
        fs::write(&f.output, b"PREVIOUS GOOD BACKUP")?;
        let plan = f.plan(&["notes.txt", "proj"])?;
        fs::remove_file(f.env.home_dir.join("proj/a.txt"))?;

        let err = pack(&plan, &f.output).unwrap_err();

        assert!(matches!(err, CbakError::Io(_)));
        assert_eq!(fs::read(&f.output)?, b"PREVIOUS GOOD BACKUP");
        assert_eq!(f.output_dir_listing()?, vec!["backup.cbak"]);
        Ok(())
    }

    #[test]
    fn test_failed_pack_leaves_no_new_archive() -> Result<()> {
        let f = fixture()?;
        let plan = f.plan(&["proj"])?;
        fs::remove_file(f.env.home_dir.join("proj/a.txt"))?;

        assert!(pack(&plan, &f.output).is_err());

        assert!(f.output_dir_listing()?.is_empty());
        Ok(())
    }

    #[test]
    #[cfg(unix)]
    fn test_fifo_is_skipped() -> Result<()> {
        let f = fixture()?;
        let fifo = f.env.home_dir.join("proj/pipe");
        let made = std::process::Command::new("mkfifo").arg(&fifo).status();
        if !matches!(made, Ok(status) if status.success()) {
            // no mkfifo on this system
            return Ok(());
        }
        let plan = f.plan(&["proj"])?;
        assert_eq!(plan.len(), 3);

        let summary = pack(&plan, &f.output)?;

        assert_eq!(summary.entries, 2);
        let mut archive = tar::Archive::new(File::open(&f.output)?);
        for entry in archive.entries()? {
            let entry = entry?;
            assert!(!entry.path()?.to_string_lossy().starts_with("proj/pipe"));
        }
        Ok(())
    }
}
