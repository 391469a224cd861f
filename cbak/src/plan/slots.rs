//! Restore mapping: archive header name -> original location.
//!
//! Parent paths are stored in a portable form where the home directory is
//! replaced by [`HOME_PLACEHOLDER`], so an archive can be restored into a
//! different home.

use crate::utils::{CbakError, Result};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::path::{Path, PathBuf};

/// Stands in for the home directory (including its trailing separator).
pub const HOME_PLACEHOLDER: &str = "#/HomeDir#/";

/// Where one archive entry came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    /// Directory the entry was found in, with a trailing separator
    pub parent_path: String,

    /// Entry name relative to `parent_path`, without the timestamp suffix
    pub header_name: String,
}

impl Slot {
    /// Build a slot, substituting the placeholder for `home_dir` in `parent_path`.
    pub fn portable(parent_path: &str, header_name: impl Into<String>, home_dir: &Path) -> Self {
        Self {
            parent_path: to_portable(parent_path, home_dir),
            header_name: header_name.into(),
        }
    }

    /// Original parent directory, with the placeholder replaced by `home_dir`.
    pub fn parent_dir(&self, home_dir: &Path) -> PathBuf {
        match self.parent_path.strip_prefix(HOME_PLACEHOLDER) {
            Some(rest) => home_dir.join(rest),
            None => PathBuf::from(&self.parent_path),
        }
    }

    /// Full path the entry is restored to.
    pub fn restore_path(&self, home_dir: &Path) -> PathBuf {
        self.parent_dir(home_dir).join(&self.header_name)
    }
}

fn to_portable(parent_path: &str, home_dir: &Path) -> String {
    let home = home_dir.to_string_lossy();
    let home = home.trim_end_matches('/');
    if home.is_empty() {
        return parent_path.to_string();
    }

    match parent_path.strip_prefix(home) {
        Some("") => HOME_PLACEHOLDER.to_string(),
        Some(rest) if rest.starts_with('/') => format!("{HOME_PLACEHOLDER}{}", &rest[1..]),
        _ => parent_path.to_string(),
    }
}

/// All slots of one backup, keyed by archive header name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RestoreMapping {
    slots: BTreeMap<String, Slot>,
}

impl RestoreMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a slot; an occupied key is a conflict, never an overwrite.
    pub fn insert(&mut self, header_name: impl Into<String>, slot: Slot) -> Result<()> {
        match self.slots.entry(header_name.into()) {
            btree_map::Entry::Occupied(occupied) => {
                tracing::debug!(
                    "Existing slot {:?}, rejected slot {:?}",
                    occupied.get(),
                    slot
                );
                Err(CbakError::DuplicateHeader(occupied.key().clone()))
            }
            btree_map::Entry::Vacant(vacant) => {
                vacant.insert(slot);
                Ok(())
            }
        }
    }

    pub fn get(&self, header_name: &str) -> Option<&Slot> {
        self.slots.get(header_name)
    }

    pub fn contains(&self, header_name: &str) -> bool {
        self.slots.contains_key(header_name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.slots.iter().map(|(name, slot)| (name.as_str(), slot))
    }
}
