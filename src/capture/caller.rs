//! Call-site capture
//!
//! The call site is taken from `#[track_caller]` locations, which always carry
//! a file and line. The enclosing function name is resolved from debug symbols
//! of a freshly captured backtrace and falls back to a sentinel when symbols
//! are unavailable (stripped release builds, for example).

use super::fragment::SourceFragment;
use backtrace::Backtrace;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;
use std::path::Path;

/// File name used when the call site cannot be resolved
pub const UNKNOWN_FILE: &str = "unknown file";

/// Function name used when the call site cannot be resolved
pub const UNKNOWN_FUNCTION: &str = "unknown function";

/// Line number used when the call site cannot be resolved
pub const UNKNOWN_LINE: u32 = 0;

/// The call site that created a chain link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caller {
    file: String,
    function: String,
    line: u32,
    stack_trace: String,
    source_fragment: Option<SourceFragment>,
}

impl Caller {
    /// Capture the call site at `location`
    ///
    /// When `fragment_radius` is positive, `2 * radius + 1` source lines around
    /// the call site are read from disk on a best-effort basis.
    pub fn capture(location: &Location<'_>, fragment_radius: u32) -> Self {
        let backtrace = Backtrace::new();
        let function = resolve_function(&backtrace, location)
            .unwrap_or_else(|| UNKNOWN_FUNCTION.to_string());

        let file = Path::new(location.file())
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNKNOWN_FILE.to_string());

        let source_fragment = if fragment_radius > 0 {
            SourceFragment::read(location.file(), location.line(), fragment_radius)
        } else {
            None
        };

        Self {
            file,
            function,
            line: location.line(),
            stack_trace: format!("{:?}", backtrace),
            source_fragment,
        }
    }

    /// A caller made of sentinel values, carrying only a stack trace
    pub fn unknown() -> Self {
        Self {
            file: UNKNOWN_FILE.to_string(),
            function: UNKNOWN_FUNCTION.to_string(),
            line: UNKNOWN_LINE,
            stack_trace: format!("{:?}", Backtrace::new()),
            source_fragment: None,
        }
    }

    /// Rebuild a caller from its wire fields
    ///
    /// Stack traces and source fragments are not part of the wire format.
    /// The sentinel triple decodes to `None`.
    pub(crate) fn from_wire(file: String, function: String, line: u32) -> Option<Self> {
        if file == UNKNOWN_FILE && function == UNKNOWN_FUNCTION && line == UNKNOWN_LINE {
            return None;
        }
        Some(Self {
            file,
            function,
            line,
            stack_trace: String::new(),
            source_fragment: None,
        })
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// The stack trace captured with the call site
    pub fn stack(&self) -> &str {
        &self.stack_trace
    }

    pub fn fragment(&self) -> Option<&SourceFragment> {
        self.source_fragment.as_ref()
    }

    /// The raw source text around the call site, if it was captured
    pub fn source(&self) -> Option<&str> {
        self.source_fragment.as_ref().map(|f| f.source.as_str())
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.function, self.file, self.line)
    }
}

/// Find the symbol whose debug location matches `location`
fn resolve_function(backtrace: &Backtrace, location: &Location<'_>) -> Option<String> {
    let wanted = Path::new(location.file());

    for frame in backtrace.frames() {
        for symbol in frame.symbols() {
            let (Some(filename), Some(line)) = (symbol.filename(), symbol.lineno()) else {
                continue;
            };
            if line != location.line() || !filename.ends_with(wanted) {
                continue;
            }
            if let Some(name) = symbol.name() {
                return Some(format!("{:#}", name));
            }
        }
    }

    None
}
