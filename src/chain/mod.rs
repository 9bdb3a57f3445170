//! The error chain
//!
//! A [`WrappedError`] is one chain link: a context payload, the captures taken
//! when it was created, and an optional [`Cause`] it wraps. A cause is either
//! another chain link or an opaque error from outside the crate, so every
//! traversal matches on the two cases instead of inspecting types at runtime.
//!
//! [`Link`] is a borrowed view of either case and carries the traversal
//! primitive, [`Link::walk`]. Depth, rendering, tracing, identity matching and
//! severity scoring are all built on it.

mod context;
mod text;

pub use context::Context;

use crate::capture::{Caller, Process};
use crate::metadata::Metadata;
use crate::state::{state, State};
use std::error::Error;
use std::fmt;
use std::panic::Location;

/// Separator placed between link messages in a rendered chain
pub const CHAIN_DELIMITER: &str = ": ";

/// An opaque error carrying only a message
///
/// Decoding a chain produces these for errors that were not chain links when
/// encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainError {
    message: String,
}

impl PlainError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PlainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for PlainError {}

/// The error wrapped by a chain link
#[derive(Debug)]
pub enum Cause {
    Wrapped(Box<WrappedError>),
    Plain(Box<dyn Error + Send + Sync + 'static>),
}

impl Cause {
    /// Wrap any error, recognizing chain links
    pub fn plain<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        let boxed: Box<dyn Error + Send + Sync + 'static> = Box::new(err);
        Self::from(boxed)
    }

    pub fn as_link(&self) -> Link<'_> {
        match self {
            Self::Wrapped(link) => Link::Wrapped(link),
            Self::Plain(err) => Link::Plain(err.as_ref()),
        }
    }
}

impl From<WrappedError> for Cause {
    fn from(err: WrappedError) -> Self {
        Self::Wrapped(Box::new(err))
    }
}

impl From<PlainError> for Cause {
    fn from(err: PlainError) -> Self {
        Self::Plain(Box::new(err))
    }
}

impl From<Box<dyn Error + Send + Sync + 'static>> for Cause {
    fn from(err: Box<dyn Error + Send + Sync + 'static>) -> Self {
        match err.downcast::<WrappedError>() {
            Ok(link) => Self::Wrapped(link),
            Err(err) => Self::Plain(err),
        }
    }
}

/// A borrowed view of one position in a chain
#[derive(Debug, Clone, Copy)]
pub enum Link<'a> {
    Wrapped(&'a WrappedError),
    Plain(&'a (dyn Error + Send + Sync + 'static)),
}

impl<'a> Link<'a> {
    /// The next link, or `None` at the end of the chain
    ///
    /// Opaque errors always end the chain.
    pub fn inner(self) -> Option<Link<'a>> {
        match self {
            Self::Wrapped(link) => link.cause.as_ref().map(Cause::as_link),
            Self::Plain(_) => None,
        }
    }

    /// Visit this link and every following one, outermost first
    ///
    /// Stops after the last link or as soon as `step` returns `false`.
    pub fn walk<F>(self, mut step: F)
    where
        F: FnMut(Link<'a>) -> bool,
    {
        let mut current = Some(self);
        while let Some(link) = current {
            if !step(link) {
                break;
            }
            current = link.inner();
        }
    }

    /// Number of links after this one
    pub fn depth(self) -> usize {
        let mut visited = 0usize;
        self.walk(|_| {
            visited += 1;
            true
        });
        visited - 1
    }

    /// This link's own message: its context, or an opaque error's text
    pub fn message(self) -> String {
        match self {
            Self::Wrapped(link) => link.context.to_string(),
            Self::Plain(err) => err.to_string(),
        }
    }

    /// Messages of this link and every following one, joined by `": "`
    pub fn rendered(self) -> String {
        let mut parts = Vec::new();
        self.walk(|link| {
            parts.push(link.message());
            true
        });
        parts.join(CHAIN_DELIMITER)
    }

    pub fn as_error(self) -> &'a (dyn Error + 'static) {
        match self {
            Self::Wrapped(link) => link,
            Self::Plain(err) => err,
        }
    }

    pub fn as_wrapped(self) -> Option<&'a WrappedError> {
        match self {
            Self::Wrapped(link) => Some(link),
            Self::Plain(_) => None,
        }
    }

    /// Downcast the error at this position to a concrete type
    pub fn downcast_ref<E: Error + 'static>(self) -> Option<&'a E> {
        self.as_error().downcast_ref::<E>()
    }
}

/// One link of an error chain
#[derive(Debug)]
pub struct WrappedError {
    context: Context,
    cause: Option<Cause>,
    caller: Option<Caller>,
    process: Option<Process>,
    metadata: Metadata,
}

impl WrappedError {
    /// Create a chain link around `cause` using the process-wide state
    #[track_caller]
    pub fn new(cause: Option<Cause>, context: impl Into<Context>) -> Self {
        Self::new_at(state(), Location::caller(), cause, context.into())
    }

    /// Create the terminal link of a chain
    #[track_caller]
    pub fn root(context: impl Into<Context>) -> Self {
        Self::new_at(state(), Location::caller(), None, context.into())
    }

    /// Wrap `cause` in a new chain link
    #[track_caller]
    pub fn wrap(cause: impl Into<Cause>, context: impl Into<Context>) -> Self {
        Self::new_at(state(), Location::caller(), Some(cause.into()), context.into())
    }

    /// Create a chain link against an explicit state
    #[track_caller]
    pub fn new_in(state: &State, cause: Option<Cause>, context: impl Into<Context>) -> Self {
        Self::new_at(state, Location::caller(), cause, context.into())
    }

    /// Create a chain link attributed to `location`
    ///
    /// Captures the call site and the process snapshot when the configuration
    /// asks for them, then assembles metadata from the cause. Never fails: any
    /// capture that cannot complete degrades to sentinel or absent values.
    pub fn new_at(
        state: &State,
        location: &Location<'_>,
        cause: Option<Cause>,
        context: Context,
    ) -> Self {
        let config = state.configuration();

        let caller = config
            .capture_caller
            .then(|| Caller::capture(location, config.effective_fragment_radius()));
        let process = config.capture_process.then(Process::capture);
        let metadata = Metadata::assemble(
            state,
            cause.as_ref().map(Cause::as_link),
            config.track_similar_errors,
        );

        Self {
            context,
            cause,
            caller,
            process,
            metadata,
        }
    }

    /// Assemble a link without capturing anything, for decoded chains
    pub(crate) fn from_parts(context: Context, cause: Option<Cause>, caller: Option<Caller>) -> Self {
        Self {
            context,
            cause,
            caller,
            process: None,
            metadata: Metadata::empty(),
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn caller(&self) -> Option<&Caller> {
        self.caller.as_ref()
    }

    pub fn process(&self) -> Option<&Process> {
        self.process.as_ref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The wrapped cause
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    /// Take the wrapped cause out of this link
    pub fn into_cause(mut self) -> Option<Cause> {
        self.cause.take()
    }

    /// This link as a chain position
    pub fn as_link(&self) -> Link<'_> {
        Link::Wrapped(self)
    }

    /// The link after this one
    pub fn inner(&self) -> Option<Link<'_>> {
        self.as_link().inner()
    }

    /// Visit this link and every following one, outermost first
    pub fn walk<'a, F>(&'a self, step: F)
    where
        F: FnMut(Link<'a>) -> bool,
    {
        self.as_link().walk(step)
    }

    /// Number of links after this one
    pub fn depth(&self) -> usize {
        self.as_link().depth()
    }

    /// Every link of the chain, this one first
    pub fn chain(&self) -> Vec<Link<'_>> {
        let mut links = Vec::new();
        self.walk(|link| {
            links.push(link);
            true
        });
        links
    }

    /// The link at position `index` of [`chain`](Self::chain)
    pub fn link_at_index(&self, index: usize) -> Option<Link<'_>> {
        self.chain().get(index).copied()
    }

    /// The link that has exactly `depth` links after it
    pub fn link_at_depth(&self, depth: usize) -> Option<Link<'_>> {
        let links = self.chain();
        let index = links.len().checked_sub(depth)?.checked_sub(1)?;
        links.get(index).copied()
    }

    /// Contexts of the whole chain joined by `": "`
    pub fn rendered_message(&self) -> String {
        self.as_link().rendered()
    }

    /// A multi-line rendering with one line per link
    ///
    /// Each line shows how many links follow, the call site and the context:
    ///
    /// ```text
    /// ┌ 2: main (main.rs:12) reading config
    /// ├ 1: load (config.rs:40) parsing section
    /// └ 0: unexpected end of input
    /// ```
    pub fn trace(&self) -> String {
        let depth = self.depth();
        if depth == 0 {
            return match &self.caller {
                Some(caller) => format!("{} {}", caller, self.context),
                None => self.context.to_string(),
            };
        }

        let mut lines = Vec::with_capacity(depth + 1);
        let mut remaining = depth;
        self.walk(|link| {
            let glyph = if lines.is_empty() {
                "┌"
            } else if remaining == 0 {
                "└"
            } else {
                "├"
            };

            let line = match link {
                Link::Wrapped(w) => match w.caller() {
                    Some(caller) => format!("{} {}: {} {}", glyph, remaining, caller, w.context()),
                    None => format!("{} {}: {}", glyph, remaining, w.context()),
                },
                Link::Plain(err) => format!("{} {}: {}", glyph, remaining, err),
            };
            lines.push(line);
            remaining = remaining.saturating_sub(1);
            true
        });

        lines.join("\n")
    }

    /// Whether `target` is, by identity, one of the errors in this chain
    pub fn is(&self, target: &(dyn Error + 'static)) -> bool {
        let target = target as *const dyn Error as *const ();
        let mut found = false;
        self.walk(|link| {
            found = link.as_error() as *const dyn Error as *const () == target;
            !found
        });
        found
    }

    /// Whether some error in this chain equals `target`
    pub fn is_equal<E>(&self, target: &E) -> bool
    where
        E: Error + PartialEq + 'static,
    {
        let mut found = false;
        self.walk(|link| {
            found = link.downcast_ref::<E>() == Some(target);
            !found
        });
        found
    }

    /// The first error in this chain of type `E`
    pub fn find_as<E: Error + 'static>(&self) -> Option<&E> {
        let mut found = None;
        self.walk(|link| {
            found = link.downcast_ref::<E>();
            found.is_none()
        });
        found
    }
}

impl fmt::Display for WrappedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered_message())
    }
}

impl Error for WrappedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner().map(Link::as_error)
    }
}

impl Drop for WrappedError {
    // Unlink iteratively so that dropping a very long chain cannot exhaust
    // the stack.
    fn drop(&mut self) {
        let mut next = self.cause.take();
        while let Some(Cause::Wrapped(mut link)) = next {
            next = link.cause.take();
        }
    }
}
