//! Station configuration service.
//!
//! Loads [`StationConfig`] from the configuration file
//! (~/.config/swapflow/config.toml) and caches it. A missing file is
//! materialized with defaults on first load so a station always has
//! identifiers to stamp onto sessions.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use swapflow_core::config::StationConfig;
use swapflow_core::error::{Result, SwapflowError};
use tracing::{info, warn};

use crate::paths::SwapflowPaths;

/// Configuration service that loads and caches the station configuration.
#[derive(Debug, Clone)]
pub struct StationConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    /// Uses RwLock for thread-safe lazy loading.
    config: Arc<RwLock<Option<StationConfig>>>,
}

impl StationConfigService {
    /// Creates a service over the default platform config file.
    ///
    /// # Errors
    ///
    /// Returns [`SwapflowError::Config`] when the config directory cannot
    /// be resolved.
    pub fn new() -> Result<Self> {
        let path = SwapflowPaths::config_file()
            .map_err(|e| SwapflowError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    /// Creates a service over an explicit config file path.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the station configuration, loading from file if not cached.
    ///
    /// Unreadable or unparseable files degrade to defaults with a
    /// diagnostic; configuration problems never stop the station.
    pub fn get_config(&self) -> StationConfig {
        {
            let read_lock = self.config.read().unwrap();
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = match self.load_config() {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "[StationConfigService] Falling back to default config: {}",
                    e
                );
                StationConfig::default()
            }
        };

        {
            let mut write_lock = self.config.write().unwrap();
            *write_lock = Some(loaded.clone());
        }

        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap();
        *write_lock = None;
    }

    /// Persists a configuration and refreshes the cache.
    pub fn save(&self, config: &StationConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(config)?;
        fs::write(&self.path, raw)?;

        let mut write_lock = self.config.write().unwrap();
        *write_lock = Some(config.clone());
        Ok(())
    }

    /// Loads the configuration, writing defaults when the file is missing.
    fn load_config(&self) -> Result<StationConfig> {
        if !self.path.exists() {
            let default_config = StationConfig::default();
            info!(
                "[StationConfigService] No config at {:?}, writing defaults",
                self.path
            );
            self.save(&default_config)?;
            return Ok(default_config);
        }

        let raw = fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&raw)?)
    }
}
