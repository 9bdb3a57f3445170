//! Error types returned by the fallible parts of the crate
//!
//! Chain construction never fails. Everything that can fail (severity
//! registration, pattern compilation, the binary codec and the configuration
//! plumbing) reports through [`WrapError`].

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for wrapped-error operations
///
/// Variants are grouped by the component that produces them so callers can
/// decide quickly whether an input must be discarded or an operation retried
/// with different arguments.
#[derive(Error, Debug)]
pub enum WrapError {
    // Severity table errors
    #[error("Severity already registered: {title}")]
    AlreadyRegistered {
        title: String,
    },

    #[error("Invalid severity pattern '{pattern}': {reason}")]
    PatternCompilation {
        pattern: String,
        reason: String,
        #[source]
        source: Option<regex::Error>,
    },

    // Binary codec errors
    #[error("Decoding error: {reason}")]
    Decoding {
        reason: String,
    },

    #[error("CRC check failed: expected {expected:#010x}, computed {actual:#010x}")]
    Integrity {
        expected: u32,
        actual: u32,
    },

    #[error("Compression error: {operation}")]
    Compression {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("TOML parsing error: {context}")]
    TomlParsing {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // I/O errors
    #[error("File I/O error for '{path}': {operation}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Convenience type alias for Results using WrapError
pub type WrapResult<T> = Result<T, WrapError>;

impl WrapError {
    /// Create a new AlreadyRegistered error
    pub fn already_registered(title: impl Into<String>) -> Self {
        Self::AlreadyRegistered {
            title: title.into(),
        }
    }

    /// Create a new PatternCompilation error without an underlying regex error
    pub fn pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PatternCompilation {
            pattern: pattern.into(),
            reason: reason.into(),
            source: None,
        }
    }

    /// Create a new PatternCompilation error from a regex error
    pub fn pattern_with_source(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::PatternCompilation {
            pattern: pattern.into(),
            reason: source.to_string(),
            source: Some(source),
        }
    }

    /// Create a new Decoding error
    pub fn decoding(reason: impl Into<String>) -> Self {
        Self::Decoding {
            reason: reason.into(),
        }
    }

    /// Create a new Integrity error
    pub fn integrity(expected: u32, actual: u32) -> Self {
        Self::Integrity { expected, actual }
    }

    /// Create a new Compression error
    pub fn compression(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Compression {
            operation: operation.into(),
            source,
        }
    }

    /// Create a new Config error with context
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new Config error with source
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new I/O error with source
    pub fn io_with_source(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Io {
            path: path.into(),
            operation: operation.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether the input that produced this error must be discarded
    pub fn is_fatal_to_input(&self) -> bool {
        matches!(
            self,
            Self::Decoding { .. } | Self::Integrity { .. } | Self::Compression { .. }
        )
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::AlreadyRegistered { .. } | Self::PatternCompilation { .. } => "severity",
            Self::Decoding { .. } | Self::Integrity { .. } | Self::Compression { .. } => "codec",
            Self::Config { .. } | Self::TomlParsing { .. } => "config",
            Self::Io { .. } => "io",
        }
    }
}

impl From<toml::de::Error> for WrapError {
    fn from(err: toml::de::Error) -> Self {
        Self::TomlParsing {
            context: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = WrapError::already_registered("disk");
        assert_eq!(err.to_string(), "Severity already registered: disk");

        let err = WrapError::decoding("invalid byte length");
        assert_eq!(err.to_string(), "Decoding error: invalid byte length");
    }

    #[test]
    fn test_integrity_message_is_hex() {
        let err = WrapError::integrity(0xdead_beef, 0x1);
        assert_eq!(
            err.to_string(),
            "CRC check failed: expected 0xdeadbeef, computed 0x00000001"
        );
    }

    #[test]
    fn test_error_category() {
        assert_eq!(WrapError::decoding("x").category(), "codec");
        assert_eq!(WrapError::integrity(0, 1).category(), "codec");
        assert_eq!(WrapError::already_registered("x").category(), "severity");
        assert_eq!(WrapError::config("x").category(), "config");
    }

    #[test]
    fn test_fatal_to_input() {
        assert!(WrapError::decoding("x").is_fatal_to_input());
        assert!(WrapError::integrity(0, 1).is_fatal_to_input());
        assert!(!WrapError::already_registered("x").is_fatal_to_input());
    }

    #[test]
    fn test_pattern_error_keeps_regex_source() {
        let regex_err = regex::Regex::new("(").unwrap_err();
        let err = WrapError::pattern_with_source("(", regex_err);

        match &err {
            WrapError::PatternCompilation { pattern, source, .. } => {
                assert_eq!(pattern, "(");
                assert!(source.is_some());
            }
            _ => panic!("Wrong error type"),
        }
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("key = ").unwrap_err();
        let err: WrapError = toml_err.into();

        assert!(matches!(err, WrapError::TomlParsing { .. }));
        assert_eq!(err.category(), "config");
        assert!(std::error::Error::source(&err).is_some());
    }
}
