//! Archive I/O: a plain tar stream whose first entry is the restore mapping.
//!
//! ```text
//! cbak-restore.json          <- RestoreFile (JSON)
//! notes.txt2026-10-19,...    <- entries in plan order
//! proj2026-10-19,...
//! proj/a.txt2026-10-19,...
//! ```

pub mod reader;
pub mod writer;

pub use reader::{extract, restore, UnpackSummary};
pub use writer::{pack, PackSummary};

use crate::plan::RestoreMapping;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reserved name of the mapping entry. Data entries always end in a
/// timestamp digit, so they cannot collide with it.
pub const RESTORE_ENTRY_NAME: &str = "cbak-restore.json";

/// Version of the [`RestoreFile`] layout.
pub const RESTORE_FILE_VERSION: u32 = 1;

/// The serialized restore mapping stored inside every archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreFile {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub slots: RestoreMapping,
}

impl RestoreFile {
    pub fn new(slots: RestoreMapping) -> Self {
        Self {
            version: RESTORE_FILE_VERSION,
            created_at: Utc::now(),
            slots,
        }
    }
}
