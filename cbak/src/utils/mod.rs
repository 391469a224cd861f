//! Error types and logging setup shared by the library and the binary.

pub mod errors;
pub mod logger;

pub use errors::{CbakError, Result};
