//! CLI Commands

pub mod batch;
pub mod check;
pub mod config;
pub mod generate;
pub mod parse;

use std::path::Path;

use anyhow::{Context, Result};

/// Write a file, creating its parent directories
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))
}
