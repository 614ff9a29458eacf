//! Default file locations.

use anyhow::Result;
use directories::ProjectDirs;
use std::path::PathBuf;

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "soawatch", "soawatch")
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
}

/// `<config_dir>/config.toml`
pub fn config_file() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

/// `<data_dir>/state.json`
pub fn store_file() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().join("state.json"))
}
