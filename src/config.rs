use crate::errors::{WrapError, WrapResult};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Switches consulted whenever a chain link is created or serialized
///
/// Every field has a default, so a partial TOML file only overrides the keys
/// it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Capture the call site of new links
    pub capture_caller: bool,
    /// Capture a process snapshot for new links
    pub capture_process: bool,
    /// Read source lines around the call site
    pub capture_source_fragments: bool,
    /// Lines read on each side of the call site
    pub source_fragment_radius: u32,
    /// Count links whose causes render identically
    pub track_similar_errors: bool,
    /// Serialize links in the minimal JSON shape
    pub marshal_minimal_json: bool,
    /// Log filter used by the command-line tool
    pub log_level: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            capture_caller: true,
            capture_process: true,
            capture_source_fragments: true,
            source_fragment_radius: 2,
            track_similar_errors: true,
            marshal_minimal_json: true,
            log_level: "info".to_string(),
        }
    }
}

impl Configuration {
    /// Radius to use for source fragments, 0 when fragments are disabled
    pub fn effective_fragment_radius(&self) -> u32 {
        if self.capture_source_fragments {
            self.source_fragment_radius
        } else {
            0
        }
    }
}

/// Loads and saves a [`Configuration`] as TOML
///
/// # Example
///
/// ```rust,no_run
/// use wrapped_error::config::ConfigManager;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let manager = ConfigManager::load_default()?;
///     wrapped_error::state().set_configuration(manager.config().clone());
///     Ok(())
/// }
/// ```
pub struct ConfigManager {
    config_path: PathBuf,
    config: Configuration,
}

impl ConfigManager {
    /// Load the configuration at `path`, creating a default file if missing
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or created.
    pub fn load(path: impl Into<PathBuf>) -> WrapResult<Self> {
        let config_path = path.into();
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    WrapError::io_with_source(parent, "create config directory", e)
                })?;
            }
        }

        let config = Self::load_or_create(&config_path)?;
        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load the configuration from [`default_path`](Self::default_path)
    pub fn load_default() -> WrapResult<Self> {
        Self::load(Self::default_path()?)
    }

    /// `<config dir>/wrapped-error/config.toml` for the current user
    pub fn default_path() -> WrapResult<PathBuf> {
        let base_dirs =
            BaseDirs::new().ok_or_else(|| WrapError::config("Failed to get base directories"))?;
        Ok(base_dirs
            .config_dir()
            .join("wrapped-error")
            .join("config.toml"))
    }

    /// Pair `config` with `path` without touching the filesystem
    pub fn new(path: impl Into<PathBuf>, config: Configuration) -> Self {
        Self {
            config_path: path.into(),
            config,
        }
    }

    /// Read the configuration at `path`, falling back to defaults in memory
    ///
    /// Unlike [`load`](Self::load), nothing is written when the file is
    /// missing.
    pub fn open(path: impl Into<PathBuf>) -> WrapResult<Self> {
        let config_path = path.into();
        let config = if config_path.exists() {
            Self::read(&config_path)?
        } else {
            Configuration::default()
        };
        Ok(Self {
            config_path,
            config,
        })
    }

    fn read(path: &Path) -> WrapResult<Configuration> {
        let content = fs::read_to_string(path)
            .map_err(|e| WrapError::io_with_source(path, "read config file", e))?;
        Ok(toml::from_str(&content)?)
    }

    fn load_or_create(path: &Path) -> WrapResult<Configuration> {
        if path.exists() {
            Self::read(path)
        } else {
            let config = Configuration::default();
            let content = toml::to_string_pretty(&config).map_err(|e| {
                WrapError::config_with_source("Failed to serialize default config", e)
            })?;
            fs::write(path, content)
                .map_err(|e| WrapError::io_with_source(path, "write default config", e))?;
            Ok(config)
        }
    }

    /// Write the configuration to its path, creating parent directories
    pub fn save(&self) -> WrapResult<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    WrapError::io_with_source(parent, "create config directory", e)
                })?;
            }
        }

        let content = toml::to_string_pretty(&self.config)
            .map_err(|e| WrapError::config_with_source("Failed to serialize config", e))?;
        fs::write(&self.config_path, content)
            .map_err(|e| WrapError::io_with_source(&self.config_path, "write config file", e))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Configuration {
        &mut self.config
    }
}
