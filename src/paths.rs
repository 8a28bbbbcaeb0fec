//! Common paths for sosmed data storage
//!
//! All sosmed data is stored under ~/.config/sosmed/ on all platforms:
//! - config.toml - User configuration
//! - session.enc - Encrypted session (token + cached user)

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the sosmed data directory (~/.config/sosmed/)
pub fn sosmed_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let dir = home.join(".config").join("sosmed");
    fs::create_dir_all(&dir).context("Failed to create sosmed directory")?;
    Ok(dir)
}

/// Get the config file path (~/.config/sosmed/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(sosmed_dir()?.join("config.toml"))
}

/// Get the session file path (~/.config/sosmed/session.enc)
pub fn session_path() -> Result<PathBuf> {
    Ok(sosmed_dir()?.join("session.enc"))
}
