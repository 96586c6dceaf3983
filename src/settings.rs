//! Settings persistence
//!
//! Stores [`ScanOptions`] as a flat JSON object in the user config directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::ScanOptions;

/// Directory name under the platform config dir
const APP_DIR: &str = "maigret-night";
const SETTINGS_FILE: &str = "settings.json";

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Settings file {path} is not valid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No configuration directory available on this platform")]
    NoConfigDir,
}

/// Location of the settings file
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store at an explicit path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<config_dir>/maigret-night/settings.json`
    pub fn default_location() -> Result<Self, SettingsError> {
        let dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(Self::at(dir.join(APP_DIR).join(SETTINGS_FILE)))
    }

    /// Explicit path when given, platform default otherwise
    pub fn resolve(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(p) => Ok(Self::at(p)),
            None => Self::default_location(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load stored options
    ///
    /// Returns `Ok(None)` when no file exists yet. Missing keys take their
    /// defaults and numeric values are clamped into range.
    pub fn load(&self) -> Result<Option<ScanOptions>, SettingsError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No settings file at {}", self.path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let options: ScanOptions =
            serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!("Loaded settings from {}", self.path.display());
        Ok(Some(options.clamped()))
    }

    /// Load stored options, falling back to defaults when absent
    pub fn load_or_default(&self) -> Result<ScanOptions, SettingsError> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Reload into `current`, leaving it untouched on error
    ///
    /// Returns whether a settings file was found.
    pub fn reload_into(&self, current: &mut ScanOptions) -> Result<bool, SettingsError> {
        match self.load()? {
            Some(options) => {
                *current = options;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Write options, creating the parent directory if needed
    pub fn save(&self, options: &ScanOptions) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let json = serde_json::to_string_pretty(options).map_err(|source| SettingsError::Parse {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(io_err)?;

        tracing::info!("Saved settings to {}", self.path.display());
        Ok(())
    }

    /// Remove the settings file; absent files are fine
    pub fn reset(&self) -> Result<(), SettingsError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SettingsError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
