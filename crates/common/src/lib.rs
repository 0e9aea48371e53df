//! selenese-ats Common Library
//!
//! The test case data model shared by the formatter and the CLI.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

/// selenese-ats version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
