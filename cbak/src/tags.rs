//! Tag registry: short names for well-known locations.
//!
//! The built-in table is compiled in; tests and embedders can build their
//! own with [`TagRegistry::from_entries`].

use crate::utils::{CbakError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Where a tag points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagLocation {
    pub path: PathBuf,

    /// `path` is relative to the home directory
    pub is_under_home: bool,
}

/// (name, path, is_under_home)
const BUILTIN_TAGS: &[(&str, &str, bool)] = &[
    ("bash", ".bashrc", true),
    ("zsh", ".zshrc", true),
    ("fish", ".config/fish", true),
    ("profile", ".profile", true),
    ("vim", ".vimrc", true),
    ("nvim", ".config/nvim", true),
    ("emacs", ".emacs.d", true),
    ("git", ".gitconfig", true),
    ("ssh", ".ssh", true),
    ("tmux", ".tmux.conf", true),
    ("kitty", ".config/kitty", true),
    ("alacritty", ".config/alacritty", true),
    ("hypr", ".config/hypr", true),
    ("i3", ".config/i3", true),
    ("sway", ".config/sway", true),
    ("waybar", ".config/waybar", true),
    ("rofi", ".config/rofi", true),
    ("fonts", ".local/share/fonts", true),
    ("themes", ".themes", true),
    ("icons", ".icons", true),
    ("hosts", "/etc/hosts", false),
    ("fstab", "/etc/fstab", false),
    ("pacman", "/etc/pacman.conf", false),
    ("grub", "/etc/default/grub", false),
    ("sddm", "/etc/sddm.conf", false),
];

/// Read-only mapping from tag name to location.
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    tags: BTreeMap<String, TagLocation>,
}

impl TagRegistry {
    /// The compiled-in table.
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN_TAGS.iter().copied())
    }

    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str, bool)>,
    {
        let tags = entries
            .into_iter()
            .map(|(name, path, is_under_home)| {
                (
                    name.to_string(),
                    TagLocation {
                        path: PathBuf::from(path),
                        is_under_home,
                    },
                )
            })
            .collect();
        Self { tags }
    }

    pub fn get(&self, name: &str) -> Option<&TagLocation> {
        self.tags.get(name)
    }

    /// Iterate tags in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagLocation)> {
        self.tags.iter().map(|(name, location)| (name.as_str(), location))
    }

    /// Resolve a tag to the path it stands for, prefixing `home_dir` for
    /// home-relative tags.
    pub fn resolve(&self, name: &str, home_dir: &Path) -> Result<PathBuf> {
        let location = self
            .get(name)
            .ok_or_else(|| CbakError::UnknownTag(name.to_string()))?;

        if location.is_under_home {
            Ok(home_dir.join(&location.path))
        } else {
            Ok(location.path.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_relative_tag() {
        let registry = TagRegistry::from_entries([("notes", "Documents/notes", true)]);
        let path = registry.resolve("notes", Path::new("/home/u")).unwrap();
        assert_eq!(path, PathBuf::from("/home/u/Documents/notes"));
    }

    #[test]
    fn test_absolute_tag() {
        let registry = TagRegistry::from_entries([("hosts", "/etc/hosts", false)]);
        let path = registry.resolve("hosts", Path::new("/home/u")).unwrap();
        assert_eq!(path, PathBuf::from("/etc/hosts"));
    }

    #[test]
    fn test_unknown_tag() {
        let registry = TagRegistry::builtin();
        let err = registry.resolve("no-such-tag", Path::new("/home/u")).unwrap_err();
        assert!(matches!(err, CbakError::UnknownTag(name) if name == "no-such-tag"));
    }

    #[test]
    fn test_builtin_table_is_consistent() {
        let registry = TagRegistry::builtin();
        assert_eq!(registry.iter().count(), BUILTIN_TAGS.len());
        for (name, location) in registry.iter() {
            assert_eq!(
                location.is_under_home,
                location.path.is_relative(),
                "tag {name} mixes home-relative flag and path kind"
            );
        }
    }
}
