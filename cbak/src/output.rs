//! Destination archive path selection.

use crate::config::BackupConfig;
use crate::fs::paths::Environment;
use crate::input::BackupRequest;
use crate::utils::{CbakError, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Extension of archives written by cbak.
pub const ARCHIVE_EXT: &str = ".cbak";

/// Pause after warning that an existing file will be overwritten.
pub const OVERWRITE_GRACE: Duration = Duration::from_secs(5);

/// `Backup<YYYYMMDDHHMMSS>.cbak`
pub fn timestamp_file_name() -> String {
    format!("Backup{}{}", Local::now().format("%Y%m%d%H%M%S"), ARCHIVE_EXT)
}

/// Where the archive goes, and whether an existing file is replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub path: PathBuf,
    pub overwrites: bool,
}

pub struct OutputResolver<'a> {
    env: &'a Environment,
}

impl<'a> OutputResolver<'a> {
    pub fn new(env: &'a Environment) -> Self {
        Self { env }
    }

    /// Pick the archive path for a backup run.
    ///
    /// `config` is the loaded backup config when config usage is enabled.
    pub fn resolve(
        &self,
        request: &BackupRequest,
        config: Option<&BackupConfig>,
    ) -> Result<OutputTarget> {
        if let Some(output) = &request.output_path {
            return self.check_target(self.env.resolve(output));
        }

        match config.and_then(BackupConfig::backup_name) {
            Some(name) => {
                let name = if name.ends_with(ARCHIVE_EXT) {
                    name.to_string()
                } else {
                    format!("{name}{ARCHIVE_EXT}")
                };
                self.check_target(self.env.resolve(name))
            }
            None => Ok(OutputTarget {
                path: self.env.cwd.join(timestamp_file_name()),
                overwrites: false,
            }),
        }
    }

    fn check_target(&self, path: PathBuf) -> Result<OutputTarget> {
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(OutputTarget {
                    path,
                    overwrites: false,
                })
            }
            Err(e) => return Err(CbakError::from_stat(path, e)),
        };

        if metadata.is_dir() {
            return Err(CbakError::OutputIsDirectory(path));
        }

        Ok(OutputTarget {
            path,
            overwrites: true,
        })
    }
}

/// Warn that `path` is about to be replaced, then give the user `grace` to abort.
pub fn warn_overwrite(path: &Path, grace: Duration) {
    warn!(
        "The output file '{}' already exists and will be overwritten (continuing in {}s)",
        path.display(),
        grace.as_secs()
    );
    std::thread::sleep(grace);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> std::io::Result<(TempDir, Environment)> {
        let temp_dir = TempDir::new()?;
        let env = Environment::new(temp_dir.path(), temp_dir.path());
        Ok((temp_dir, env))
    }

    fn with_output(output: &str) -> BackupRequest {
        BackupRequest {
            output_path: Some(PathBuf::from(output)),
            ..BackupRequest::default()
        }
    }

    #[test]
    fn test_explicit_new_file() -> Result<()> {
        let (temp_dir, env) = setup()?;
        let resolver = OutputResolver::new(&env);

        let target = resolver.resolve(&with_output("out.cbak"), None)?;

        assert_eq!(target.path, temp_dir.path().join("out.cbak"));
        assert!(!target.overwrites);
        Ok(())
    }

    #[test]
    fn test_explicit_directory_is_rejected() -> Result<()> {
        let (temp_dir, env) = setup()?;
        fs::create_dir(temp_dir.path().join("taken"))?;
        let resolver = OutputResolver::new(&env);

        let err = resolver.resolve(&with_output("taken"), None).unwrap_err();

        assert!(matches!(err, CbakError::OutputIsDirectory(_)));
        Ok(())
    }

    #[test]
    fn test_existing_file_is_accepted() -> Result<()> {
        let (temp_dir, env) = setup()?;
        let existing = temp_dir.path().join("old.cbak");
        fs::write(&existing, b"old")?;
        let resolver = OutputResolver::new(&env);

        let target = resolver.resolve(&with_output("old.cbak"), None)?;

        assert_eq!(target.path, existing);
        assert!(target.overwrites);
        assert_eq!(fs::read(&existing)?, b"old");
        Ok(())
    }

    #[test]
    fn test_timestamp_name_without_config() -> Result<()> {
        let (temp_dir, env) = setup()?;
        let resolver = OutputResolver::new(&env);

        let target = resolver.resolve(&BackupRequest::default(), None)?;
        assert!(!target.overwrites);
        let path = target.path;

        assert_eq!(path.parent(), Some(temp_dir.path()));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("Backup"));
        assert!(name.ends_with(ARCHIVE_EXT));
        let digits = &name["Backup".len()..name.len() - ARCHIVE_EXT.len()];
        assert_eq!(digits.len(), 14);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
        Ok(())
    }

    #[test]
    fn test_timestamp_name_when_config_has_no_name() -> Result<()> {
        let (_temp_dir, env) = setup()?;
        let resolver = OutputResolver::new(&env);

        let path = resolver
            .resolve(&BackupRequest::default(), Some(&BackupConfig::default()))?
            .path;

        assert!(path.file_name().unwrap().to_str().unwrap().starts_with("Backup"));
        Ok(())
    }

    #[test]
    fn test_config_name_gets_extension() -> Result<()> {
        let (temp_dir, env) = setup()?;
        let resolver = OutputResolver::new(&env);
        let config = BackupConfig {
            backup_name: Some("dotfiles".to_string()),
            ..BackupConfig::default()
        };

        let path = resolver.resolve(&BackupRequest::default(), Some(&config))?.path;
        assert_eq!(path, temp_dir.path().join("dotfiles.cbak"));

        let config = BackupConfig {
            backup_name: Some("dotfiles.cbak".to_string()),
            ..BackupConfig::default()
        };
        let path = resolver.resolve(&BackupRequest::default(), Some(&config))?.path;
        assert_eq!(path, temp_dir.path().join("dotfiles.cbak"));
        Ok(())
    }

    #[test]
    fn test_config_name_directory_conflict() -> Result<()> {
        let (temp_dir, env) = setup()?;
        fs::create_dir(temp_dir.path().join("dotfiles.cbak"))?;
        let resolver = OutputResolver::new(&env);
        let config = BackupConfig {
            backup_name: Some("dotfiles".to_string()),
            ..BackupConfig::default()
        };

        let err = resolver
            .resolve(&BackupRequest::default(), Some(&config))
            .unwrap_err();

        assert!(matches!(err, CbakError::OutputIsDirectory(_)));
        Ok(())
    }

    #[test]
    fn test_explicit_output_beats_config_name() -> Result<()> {
        let (temp_dir, env) = setup()?;
        let resolver = OutputResolver::new(&env);
        let config = BackupConfig {
            backup_name: Some("dotfiles".to_string()),
            ..BackupConfig::default()
        };

        let path = resolver.resolve(&with_output("mine.tar"), Some(&config))?.path;

        assert_eq!(path, temp_dir.path().join("mine.tar"));
        Ok(())
    }
}
