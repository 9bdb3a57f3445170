//! CLI Context for dependency injection and shared state
//!
//! This module provides the CliContext abstraction that resolves the
//! configuration file once and applies it to the process-wide state before
//! any chain is built.

use anyhow::Result;
use std::path::PathBuf;
use wrapped_error::ConfigManager;

/// CLI execution context containing shared dependencies and configuration
pub struct CliContext {
    pub verbose: bool,
    pub config_manager: ConfigManager,
}

impl CliContext {
    /// Create a new CLI context from an optional configuration path
    ///
    /// A missing file is not created here; defaults are used in memory.
    pub fn new(config_path: Option<PathBuf>, verbose: bool) -> Result<Self> {
        let path = match config_path {
            Some(path) => path,
            None => ConfigManager::default_path()?,
        };
        let config_manager = ConfigManager::open(path)?;

        wrapped_error::init().set_configuration(config_manager.config().clone());

        Ok(Self {
            verbose,
            config_manager,
        })
    }

    /// Initialize logging subsystem based on verbosity and configuration
    pub fn init_logging(&self) -> Result<()> {
        let log_level = if self.verbose {
            "debug"
        } else {
            self.config_manager.config().log_level.as_str()
        };

        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env().add_directive(
                    log_level
                        .parse()
                        .unwrap_or_else(|_| tracing::Level::INFO.into()),
                ),
            )
            .init();

        if self.verbose {
            tracing::debug!("Verbose logging enabled");
            tracing::debug!("Config path: {}", self.config_manager.path().display());
        }

        Ok(())
    }
}
