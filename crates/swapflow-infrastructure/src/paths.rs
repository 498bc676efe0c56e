//! Unified path management for swapflow files.
//!
//! Station configuration and session data live under the platform config
//! and data directories. All path resolution goes through here so every
//! storage component agrees on the layout.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for swapflow.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/swapflow/          # Config directory
/// └── config.toml              # Station configuration
///
/// ~/.local/share/swapflow/     # Data directory
/// └── store/                   # Key-value store (session collection, pointer)
/// ```
pub struct SwapflowPaths;

impl SwapflowPaths {
    /// Returns the swapflow configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/swapflow/`)
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("swapflow"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the swapflow data directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to data directory (e.g., `~/.local/share/swapflow/`)
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join("swapflow"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the station configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the directory backing the key-value store.
    pub fn store_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("store"))
    }
}
