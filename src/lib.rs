//! Wrapped Error Library
//!
//! Context-carrying error chains. Each link records where it was created, a
//! snapshot of the process, creation metadata and an optional severity
//! classification, and whole chains can be rendered as text, JSON or a
//! checksummed binary encoding.
//!
//! ```rust
//! use wrapped_error::{Cause, WrappedError};
//!
//! let io = std::io::Error::new(std::io::ErrorKind::Other, "disk unplugged");
//! let inner = WrappedError::wrap(Cause::plain(io), "saving report");
//! let outer = WrappedError::wrap(inner, "finishing job");
//!
//! assert_eq!(outer.depth(), 2);
//! assert_eq!(outer.to_string(), "finishing job: saving report: disk unplugged");
//! ```

pub mod capture;
pub mod chain;
pub mod codec;
pub mod config;
pub mod errors;
pub mod format;
pub mod json;
pub mod metadata;
pub mod severity;
pub mod similarity;
pub mod state;

// Re-export commonly used types for convenience
pub use capture::{Caller, MemoryStats, Process, SourceFragment};
pub use chain::{Cause, Context, Link, PlainError, WrappedError};
pub use codec::{decode, encode, Codec, Compression};
pub use config::{ConfigManager, Configuration};
pub use errors::{WrapError, WrapResult, WrapResultExt};
pub use metadata::Metadata;
pub use severity::{Severity, SeverityLevel, SeverityMatch, SeverityTable};
pub use state::{init, state, State};

/// Register `severity` with the process-wide severity table
pub fn register_severity(severity: Severity) -> WrapResult<()> {
    state().severities().register(severity)
}

/// Remove `severity` from the process-wide severity table
pub fn unregister_severity(severity: &Severity) {
    state().severities().unregister(severity)
}
