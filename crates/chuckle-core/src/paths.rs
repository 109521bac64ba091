//! Locations of the running executable, for resolving bundled assets.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Absolute path of the running executable.
pub fn executable_path() -> Result<PathBuf> {
    std::env::current_exe().context("failed to query the executable path")
}

/// Directory containing the running executable.
pub fn executable_directory_name() -> Result<PathBuf> {
    let exe = executable_path()?;
    exe.parent()
        .map(PathBuf::from)
        .with_context(|| format!("executable path {} has no parent", exe.display()))
}
