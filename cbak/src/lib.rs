//! cbak library
//!
//! Resolves explicit paths, config-declared paths and tags into a
//! conflict-free backup plan, packs it into a tar archive with a restore
//! mapping, and restores or extracts such archives later.

pub mod archive;
pub mod config;
pub mod fs;
pub mod input;
pub mod manager;
pub mod output;
pub mod plan;
pub mod tags;
pub mod utils;

// Re-export commonly used types
pub use config::BackupConfig;
pub use fs::paths::Environment;
pub use input::{BackupRequest, Mode};
pub use manager::{Manager, Outcome};
pub use tags::TagRegistry;
pub use utils::errors::CbakError;
pub type Result<T> = std::result::Result<T, CbakError>;
