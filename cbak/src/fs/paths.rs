//! Path resolution against the invocation's environment.
//!
//! The home directory and working directory are captured once per run and
//! passed around explicitly, so every component resolves paths the same way.

use crate::utils::{CbakError, Result};
use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};

/// Directories the current invocation runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Home directory of the invoking user
    pub home_dir: PathBuf,

    /// Working directory relative paths are resolved against
    pub cwd: PathBuf,
}

impl Environment {
    pub fn new(home_dir: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            home_dir: home_dir.into(),
            cwd: cwd.into(),
        }
    }

    /// Capture the home directory and working directory of this process.
    pub fn detect() -> Result<Self> {
        let home_dir = dirs::home_dir().ok_or(CbakError::HomeDirUnavailable)?;
        let cwd = std::env::current_dir()?;
        Ok(Self { home_dir, cwd })
    }

    /// Resolve `path` to an absolute, lexically normalized path.
    ///
    /// Relative paths are joined onto the working directory. The filesystem
    /// is never consulted, so this cannot fail.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            normalize(path)
        } else {
            normalize(&self.cwd.join(path))
        }
    }
}

/// Drop `.` components and fold `..` into their parent, without touching disk.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Device and inode of a filesystem object, used to spot the same file
/// reached under two different names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId {
    dev: u64,
    ino: u64,
}

impl FileId {
    #[cfg(unix)]
    pub fn of(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    pub fn of(_metadata: &Metadata) -> Option<Self> {
        None
    }

    /// Identity of whatever `path` points to, following symlinks.
    pub fn of_path(path: &Path) -> Option<Self> {
        std::fs::metadata(path).ok().and_then(|m| Self::of(&m))
    }
}

/// Borrow `path` as UTF-8, failing for paths that cannot name an archive entry.
pub fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| CbakError::NonUtf8Path(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Environment {
        Environment::new("/home/u", "/home/u/work")
    }

    #[test]
    fn test_absolute_path_unchanged() {
        assert_eq!(env().resolve("/etc/hosts"), PathBuf::from("/etc/hosts"));
    }

    #[test]
    fn test_relative_path_joins_cwd() {
        assert_eq!(
            env().resolve("notes/today.md"),
            PathBuf::from("/home/u/work/notes/today.md")
        );
    }

    #[test]
    fn test_dot_components_are_folded() {
        assert_eq!(env().resolve("./a/../b"), PathBuf::from("/home/u/work/b"));
        assert_eq!(env().resolve("../.."), PathBuf::from("/home"));
        assert_eq!(env().resolve("/../../x"), PathBuf::from("/x"));
    }

    #[test]
    #[cfg(unix)]
    fn test_file_id_sees_through_symlinks() -> std::io::Result<()> {
        let temp_dir = tempfile::TempDir::new()?;
        let real = temp_dir.path().join("real.txt");
        let other = temp_dir.path().join("other.txt");
        std::fs::write(&real, b"x")?;
        std::fs::write(&other, b"y")?;
        std::os::unix::fs::symlink(&real, temp_dir.path().join("alias.txt"))?;

        let id = FileId::of_path(&real);
        assert!(id.is_some());
        assert_eq!(FileId::of_path(&temp_dir.path().join("alias.txt")), id);
        assert_ne!(FileId::of_path(&other), id);
        assert_eq!(FileId::of_path(&temp_dir.path().join("missing")), None);
        Ok(())
    }

    #[test]
    fn test_trailing_separator_dropped() {
        assert_eq!(env().resolve("/home/u/proj/"), PathBuf::from("/home/u/proj"));
    }
}
