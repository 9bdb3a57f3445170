//! Source fragments read from disk around a call site

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Lines of source code surrounding a call site
///
/// `lower_line` and `upper_line` are the 1-based bounds of the lines actually
/// read, so a window that hangs off either end of the file is clipped. A
/// window that misses the file entirely has both bounds set to 0 and empty
/// source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFragment {
    pub file: String,
    pub lower_line: u32,
    pub upper_line: u32,
    pub source: String,
}

impl SourceFragment {
    /// Read `2 * radius + 1` lines centered on `line` from `path`
    ///
    /// Returns `None` when the file cannot be opened or read. Source files are
    /// only reachable when the process runs next to its sources, so absence is
    /// the normal case for deployed binaries.
    pub fn read(path: impl AsRef<Path>, line: u32, radius: u32) -> Option<Self> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                tracing::trace!("source fragment unavailable for {}: {}", path.display(), e);
                return None;
            }
        };

        let first = i64::from(line) - i64::from(radius);
        let last = i64::from(line) + i64::from(radius);

        let mut lower = 0u32;
        let mut upper = 0u32;
        let mut source = String::new();

        for (idx, text) in BufReader::new(file).lines().enumerate() {
            let number = idx as i64 + 1;
            if number > last {
                break;
            }
            if number < first {
                continue;
            }

            let text = text.ok()?;
            if lower == 0 {
                lower = number as u32;
            }
            upper = number as u32;
            source.push_str(&text);
            source.push('\n');
        }

        Some(Self {
            file: path.display().to_string(),
            lower_line: lower,
            upper_line: upper,
            source,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

impl fmt::Display for SourceFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} - {}] {}\n{}",
            self.lower_line, self.upper_line, self.file, self.source
        )
    }
}
