//! Command handlers for all CLI operations
//!
//! This module contains the implementation of all command handlers,
//! providing clean separation between CLI parsing and chain operations.

use super::{CliContext, Commands, ConfigAction};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use wrapped_error::codec::{Codec, Compression};
use wrapped_error::{json, Cause, ConfigManager, Configuration, PlainError, WrappedError};

/// Coordinates all command handling operations with dependency injection via CliContext
pub struct CommandHandler {
    context: CliContext,
}

impl CommandHandler {
    /// Create a new command handler instance with the provided context
    pub fn new(context: CliContext) -> Self {
        Self { context }
    }

    /// Route commands to their appropriate handlers
    pub fn handle_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Encode {
                contexts,
                cause,
                output,
                compress: _,
                no_compress,
            } => self.handle_encode(&contexts, cause, &output, no_compress),
            Commands::Inspect { file, json, full } => self.handle_inspect(&file, json, full),
            Commands::Parse { text, json } => self.handle_parse(&text, json),
            Commands::Format { file, template } => self.handle_format(&file, &template),
            Commands::Config { action } => self.handle_config(action),
        }
    }

    /// Build a chain, outermost context first, and write its encoding
    fn handle_encode(
        &self,
        contexts: &[String],
        cause: Option<String>,
        output: &Path,
        no_compress: bool,
    ) -> Result<()> {
        let chain = build_chain(contexts, cause).context("At least one context is required")?;

        let compression = if no_compress {
            Compression::None
        } else {
            Compression::Zlib
        };
        let bytes = Codec::new(compression)
            .encode(&chain)
            .context("Failed to encode chain")?;

        fs::write(output, &bytes)
            .with_context(|| format!("Failed to write {}", output.display()))?;

        info!("Wrote {} bytes to {}", bytes.len(), output.display());
        println!(
            "Encoded {} links ({} bytes) to {}",
            chain.depth() + 1,
            bytes.len(),
            output.display()
        );
        Ok(())
    }

    /// Decode a file and print its trace or JSON
    fn handle_inspect(&self, file: &Path, as_json: bool, full: bool) -> Result<()> {
        let chain = read_chain(file)?;

        if as_json {
            let value = json::to_json(&chain, !full);
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            println!("{}", chain.trace());
        }
        Ok(())
    }

    /// Parse a rendered message and print the resulting chain
    fn handle_parse(&self, text: &str, as_json: bool) -> Result<()> {
        let chain = WrappedError::parse_text(text);
        debug!("Parsed {} links", chain.depth() + 1);

        if as_json {
            let value = json::to_json(&chain, true);
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            println!("{}", chain.trace());
        }
        Ok(())
    }

    /// Decode a file and render it through a template
    fn handle_format(&self, file: &Path, template: &str) -> Result<()> {
        let chain = read_chain(file)?;
        println!("{}", wrapped_error::format::format(&chain, template));
        Ok(())
    }

    /// Handle configuration management
    fn handle_config(&self, action: ConfigAction) -> Result<()> {
        let path = self.context.config_manager.path().to_path_buf();

        match action {
            ConfigAction::Show => {
                let config = self.context.config_manager.config();
                println!("{}", toml::to_string_pretty(config)?);
            }
            ConfigAction::Path => {
                println!("{}", path.display());
            }
            ConfigAction::Init { force } => {
                if path.exists() && !force {
                    println!("Configuration already initialized at: {}", path.display());
                    println!("Use --force to overwrite");
                    return Ok(());
                }
                write_default_config(path.clone())?;
                println!("Configuration initialized successfully at: {}", path.display());
            }
            ConfigAction::Set { key, value } => {
                let mut config_manager = ConfigManager::open(path)?;
                set_config_value(config_manager.config_mut(), &key, &value)?;
                config_manager.save()?;
                println!("Configuration updated: {key} = {value}");
            }
            ConfigAction::Get { key } => {
                let value = get_config_value(self.context.config_manager.config(), &key)?;
                println!("{value}");
            }
        }
        Ok(())
    }
}

/// Link `contexts` so the first one is outermost
fn build_chain(contexts: &[String], cause: Option<String>) -> Option<WrappedError> {
    let mut inner: Option<Cause> = cause.map(|message| PlainError::new(message).into());
    let mut head = None;

    for context in contexts.iter().rev() {
        if let Some(link) = head.take() {
            inner = Some(Cause::from(link));
        }
        head = Some(WrappedError::new(inner.take(), context.as_str()));
    }
    head
}

fn read_chain(file: &Path) -> Result<WrappedError> {
    let bytes = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    debug!("Read {} bytes from {}", bytes.len(), file.display());

    let chain = wrapped_error::decode(&bytes)
        .with_context(|| format!("Failed to decode {}", file.display()))?;
    Ok(chain)
}

fn write_default_config(path: PathBuf) -> Result<()> {
    ConfigManager::new(path, Configuration::default()).save()?;
    Ok(())
}

fn set_config_value(config: &mut Configuration, key: &str, value: &str) -> Result<()> {
    match key {
        "capture_caller" => config.capture_caller = value.parse()?,
        "capture_process" => config.capture_process = value.parse()?,
        "capture_source_fragments" => config.capture_source_fragments = value.parse()?,
        "source_fragment_radius" => {
            config.source_fragment_radius =
                value.parse::<u32>().context("Radius must be a non-negative number")?
        }
        "track_similar_errors" => config.track_similar_errors = value.parse()?,
        "marshal_minimal_json" => config.marshal_minimal_json = value.parse()?,
        "log_level" => config.log_level = value.to_string(),
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
    Ok(())
}

fn get_config_value(config: &Configuration, key: &str) -> Result<String> {
    let value = match key {
        "capture_caller" => config.capture_caller.to_string(),
        "capture_process" => config.capture_process.to_string(),
        "capture_source_fragments" => config.capture_source_fragments.to_string(),
        "source_fragment_radius" => config.source_fragment_radius.to_string(),
        "track_similar_errors" => config.track_similar_errors.to_string(),
        "marshal_minimal_json" => config.marshal_minimal_json.to_string(),
        "log_level" => config.log_level.clone(),
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_chain_orders_outermost_first() {
        let contexts = vec!["outer".to_string(), "inner".to_string()];
        let chain = build_chain(&contexts, Some("eof".to_string())).unwrap();

        assert_eq!(chain.rendered_message(), "outer: inner: eof");
        assert_eq!(chain.depth(), 2);
    }

    #[test]
    fn test_build_chain_requires_context() {
        assert!(build_chain(&[], None).is_none());
    }

    #[test]
    fn test_config_values_round_trip() {
        let mut config = Configuration::default();
        set_config_value(&mut config, "source_fragment_radius", "4").unwrap();
        set_config_value(&mut config, "capture_process", "false").unwrap();

        assert_eq!(get_config_value(&config, "source_fragment_radius").unwrap(), "4");
        assert_eq!(get_config_value(&config, "capture_process").unwrap(), "false");
    }

    #[test]
    fn test_unknown_config_key() {
        let mut config = Configuration::default();
        assert!(set_config_value(&mut config, "nope", "1").is_err());
        assert!(get_config_value(&config, "nope").is_err());
        assert!(set_config_value(&mut config, "capture_caller", "maybe").is_err());
    }
}
