//! Centralized error handling module
//!
//! [`WrapError`] reports failures of the fallible operations (severity
//! registration, the binary codec and configuration I/O). [`WrapResultExt`]
//! turns any other error into a chain link at the point it is propagated.

pub mod context;
pub mod types;

pub use context::WrapResultExt;
pub use types::{WrapError, WrapResult};
