//! Severity classification of error chains
//!
//! A [`Severity`] pairs a title and a level with a regular expression. Its
//! score against an error is the fraction of the error's rendered message
//! covered by non-overlapping pattern matches. A [`SeverityTable`] holds the
//! registered severities and picks the best-scoring one across a whole chain.

mod level;
mod table;

pub use level::SeverityLevel;
pub use table::SeverityTable;

use crate::chain::Link;
use crate::errors::{WrapError, WrapResult};
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;

/// A registered (title, pattern, level) classification
#[derive(Debug, Clone)]
pub struct Severity {
    title: String,
    pattern: Regex,
    level: SeverityLevel,
}

impl Severity {
    /// Build a severity, compiling `pattern`
    ///
    /// # Errors
    ///
    /// Returns [`WrapError::PatternCompilation`] when the pattern is empty or
    /// is not a valid regular expression.
    pub fn new(
        title: impl Into<String>,
        pattern: &str,
        level: SeverityLevel,
    ) -> WrapResult<Self> {
        if pattern.is_empty() {
            return Err(WrapError::pattern(pattern, "pattern required"));
        }

        let regex =
            Regex::new(pattern).map_err(|e| WrapError::pattern_with_source(pattern, e))?;

        Ok(Self {
            title: title.into(),
            pattern: regex,
            level,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn level(&self) -> SeverityLevel {
        self.level
    }

    /// Coverage of `text` by non-overlapping matches, from 0.0 to 1.0
    pub fn score_text(&self, text: &str) -> f64 {
        if text.is_empty() {
            return 0.0;
        }

        let covered: usize = self.pattern.find_iter(text).map(|m| m.len()).sum();
        (covered as f64 / text.len() as f64).min(1.0)
    }

    /// Score this severity against the rendered message of `link`
    pub fn score(&self, link: Link<'_>) -> f64 {
        self.score_text(&link.rendered())
    }
}

impl PartialEq for Severity {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
            && self.pattern.as_str() == other.pattern.as_str()
            && self.level == other.level
    }
}

impl Eq for Severity {}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.title)
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Severity", 3)?;
        state.serialize_field("title", &self.title)?;
        state.serialize_field("pattern", self.pattern.as_str())?;
        state.serialize_field("level", &self.level)?;
        state.end()
    }
}

/// The best severity found for a chain, with its score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeverityMatch {
    pub severity: Severity,
    pub score: f64,
}

impl SeverityMatch {
    pub fn title(&self) -> &str {
        self.severity.title()
    }

    pub fn level(&self) -> SeverityLevel {
        self.severity.level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::PlainError;

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = Severity::new("broken", "(unclosed", SeverityLevel::Low).unwrap_err();
        assert!(matches!(err, WrapError::PatternCompilation { .. }));
    }

    #[test]
    fn test_empty_pattern_is_rejected() {
        let err = Severity::new("empty", "", SeverityLevel::Low).unwrap_err();
        assert!(matches!(err, WrapError::PatternCompilation { .. }));
    }

    #[test]
    fn test_score_is_coverage_ratio() {
        let severity = Severity::new("ab", "ab", SeverityLevel::Low).unwrap();
        assert_eq!(severity.score_text("abab"), 1.0);
        assert_eq!(severity.score_text("abcd"), 0.5);
        assert_eq!(severity.score_text("xyz"), 0.0);
    }

    #[test]
    fn test_empty_text_scores_zero() {
        for pattern in [".*", "a*", "x"] {
            let severity = Severity::new("t", pattern, SeverityLevel::High).unwrap();
            assert_eq!(severity.score_text(""), 0.0);
        }
    }

    #[test]
    fn test_score_against_link() {
        let severity = Severity::new("disk", "disk", SeverityLevel::Severe).unwrap();
        let err = PlainError::new("disk");
        assert_eq!(severity.score(Link::Plain(&err)), 1.0);
    }

    #[test]
    fn test_equality_uses_title_pattern_and_level() {
        let a = Severity::new("t", "x+", SeverityLevel::Low).unwrap();
        let b = Severity::new("t", "x+", SeverityLevel::Low).unwrap();
        let c = Severity::new("t", "x+", SeverityLevel::High).unwrap();
        let d = Severity::new("other", "x+", SeverityLevel::Low).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_display() {
        let severity = Severity::new("Out of memory", "oom", SeverityLevel::Severe).unwrap();
        assert_eq!(severity.to_string(), "[severe] Out of memory");
    }
}
