//! Filesystem side of plan building: path resolution, exclusion, walking.

pub mod exclude;
pub mod paths;
pub mod walker;
