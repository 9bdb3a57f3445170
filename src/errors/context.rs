//! Result and Option extensions that build chain links
//!
//! These are the `?`-friendly way to start or extend a chain: the error of a
//! failed `Result` becomes the cause of a new link and a `None` becomes a
//! root link. The call site recorded on the link is the caller of the
//! extension method.

use crate::chain::{Cause, Context, WrappedError};
use crate::state::state;
use std::error::Error;
use std::panic::Location;

/// Extension trait for wrapping failures in a new chain link
///
/// ```rust
/// use wrapped_error::errors::WrapResultExt;
///
/// fn read_settings() -> Result<String, wrapped_error::WrappedError> {
///     std::fs::read_to_string("/nonexistent/settings.toml").wrap_err("reading settings")
/// }
///
/// let err = read_settings().unwrap_err();
/// assert!(err.rendered_message().starts_with("reading settings: "));
/// ```
pub trait WrapResultExt<T> {
    /// Wrap the failure with `context`
    #[track_caller]
    fn wrap_err(self, context: impl Into<Context>) -> Result<T, WrappedError>;

    /// Wrap the failure with a lazily built context
    #[track_caller]
    fn wrap_err_with<C, F>(self, f: F) -> Result<T, WrappedError>
    where
        C: Into<Context>,
        F: FnOnce() -> C;
}

impl<T, E> WrapResultExt<T> for Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    #[track_caller]
    fn wrap_err(self, context: impl Into<Context>) -> Result<T, WrappedError> {
        let location = Location::caller();
        self.map_err(|e| WrappedError::new_at(state(), location, Some(Cause::plain(e)), context.into()))
    }

    #[track_caller]
    fn wrap_err_with<C, F>(self, f: F) -> Result<T, WrappedError>
    where
        C: Into<Context>,
        F: FnOnce() -> C,
    {
        let location = Location::caller();
        self.map_err(|e| WrappedError::new_at(state(), location, Some(Cause::plain(e)), f().into()))
    }
}

impl<T> WrapResultExt<T> for Option<T> {
    #[track_caller]
    fn wrap_err(self, context: impl Into<Context>) -> Result<T, WrappedError> {
        let location = Location::caller();
        self.ok_or_else(|| WrappedError::new_at(state(), location, None, context.into()))
    }

    #[track_caller]
    fn wrap_err_with<C, F>(self, f: F) -> Result<T, WrappedError>
    where
        C: Into<Context>,
        F: FnOnce() -> C,
    {
        let location = Location::caller();
        self.ok_or_else(|| WrappedError::new_at(state(), location, None, f().into()))
    }
}

/// Wrap the failure of an expression in a new chain link
///
/// Usage:
/// ```rust
/// use wrapped_error::{wrap, WrappedError};
///
/// fn parse_port(text: &str) -> Result<u16, WrappedError> {
///     let port = wrap!(text.parse::<u16>(), "parsing port")?;
///     Ok(port)
/// }
///
/// assert!(parse_port("99999").is_err());
/// ```
#[macro_export]
macro_rules! wrap {
    ($expr:expr, $context:expr) => {
        $crate::errors::WrapResultExt::wrap_err($expr, $context)
    };
}
