//! Template formatting of chain links
//!
//! Templates contain fixed-width tokens of the form `${{XXX}}`, each replaced
//! by one value read through the link's accessors. Sequences that look like
//! tokens but are not recognized are copied through unchanged.
//!
//! ```rust
//! use wrapped_error::format::format;
//! use wrapped_error::WrappedError;
//!
//! let err = WrappedError::root("disk full");
//! assert_eq!(format(&err, "error: ${{CTX}}"), "error: disk full");
//! ```

use crate::capture::{UNKNOWN_FILE, UNKNOWN_FUNCTION, UNKNOWN_LINE, UNKNOWN_THREADS};
use crate::chain::{Link, WrappedError};

const TOKEN_PREFIX: &str = "${{";
const TOKEN_LEN: usize = 8;

/// Count substituted for process fields when no snapshot was taken
const UNKNOWN_COUNT: i64 = -1;

/// Tokens understood by [`format`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Context,
    Inner,
    Chain,
    File,
    Function,
    Line,
    Stack,
    Source,
    Time,
    Duration,
    Index,
    Similar,
    Threads,
    Cpus,
    ForeignCalls,
    Memory,
    SeverityTitle,
    SeverityLevel,
}

impl Token {
    pub const ALL: [Token; 18] = [
        Token::Context,
        Token::Inner,
        Token::Chain,
        Token::File,
        Token::Function,
        Token::Line,
        Token::Stack,
        Token::Source,
        Token::Time,
        Token::Duration,
        Token::Index,
        Token::Similar,
        Token::Threads,
        Token::Cpus,
        Token::ForeignCalls,
        Token::Memory,
        Token::SeverityTitle,
        Token::SeverityLevel,
    ];

    /// The token's literal text
    pub fn as_str(self) -> &'static str {
        match self {
            Token::Context => "${{CTX}}",
            Token::Inner => "${{INN}}",
            Token::Chain => "${{CHN}}",
            Token::File => "${{FIL}}",
            Token::Function => "${{FUN}}",
            Token::Line => "${{LIN}}",
            Token::Stack => "${{STK}}",
            Token::Source => "${{SRC}}",
            Token::Time => "${{TIM}}",
            Token::Duration => "${{DUR}}",
            Token::Index => "${{IDX}}",
            Token::Similar => "${{SIM}}",
            Token::Threads => "${{RTS}}",
            Token::Cpus => "${{CPU}}",
            Token::ForeignCalls => "${{CGO}}",
            Token::Memory => "${{MEM}}",
            Token::SeverityTitle => "${{SET}}",
            Token::SeverityLevel => "${{SEL}}",
        }
    }

    pub fn parse(text: &str) -> Option<Token> {
        Token::ALL.into_iter().find(|token| token.as_str() == text)
    }

    /// The value this token stands for in `err`
    pub fn value(self, err: &WrappedError) -> String {
        let caller = err.caller();
        let process = err.process();
        let metadata = err.metadata();

        match self {
            Token::Context => err.context().to_string(),
            Token::Inner => err.inner().map(Link::rendered).unwrap_or_default(),
            Token::Chain => err.rendered_message(),
            Token::File => caller.map_or(UNKNOWN_FILE, |c| c.file()).to_string(),
            Token::Function => caller.map_or(UNKNOWN_FUNCTION, |c| c.function()).to_string(),
            Token::Line => caller.map_or(UNKNOWN_LINE, |c| c.line()).to_string(),
            Token::Stack => caller.map(|c| c.stack().to_string()).unwrap_or_default(),
            Token::Source => caller
                .and_then(|c| c.source())
                .map(str::to_string)
                .unwrap_or_default(),
            Token::Time => metadata.time().to_rfc3339(),
            Token::Duration => format!("{:.6}", metadata.duration().as_secs_f64()),
            Token::Index => metadata.index().to_string(),
            Token::Similar => metadata.similar().to_string(),
            Token::Threads => process.map_or(UNKNOWN_THREADS, |p| p.threads()).to_string(),
            Token::Cpus => process.map_or(UNKNOWN_COUNT, |p| p.cpus()).to_string(),
            Token::ForeignCalls => process
                .map_or(UNKNOWN_COUNT, |p| p.foreign_calls())
                .to_string(),
            Token::Memory => process
                .and_then(|p| p.memory())
                .and_then(|m| serde_json::to_string(m).ok())
                .unwrap_or_default(),
            Token::SeverityTitle => metadata
                .severity()
                .map(|s| s.title().to_string())
                .unwrap_or_default(),
            Token::SeverityLevel => metadata
                .severity()
                .map(|s| s.level().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Replace every recognized token in `template` with its value from `err`
pub fn format(err: &WrappedError, template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(TOKEN_PREFIX) {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];

        match candidate.get(..TOKEN_LEN).and_then(Token::parse) {
            Some(token) => {
                out.push_str(&token.value(err));
                rest = &candidate[TOKEN_LEN..];
            }
            None => {
                out.push_str(TOKEN_PREFIX);
                rest = &candidate[TOKEN_PREFIX.len()..];
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::PlainError;
    use crate::severity::{Severity, SeverityLevel};
    use crate::state::State;

    fn bare_state() -> State {
        let state = State::new();
        state.configure(|c| {
            c.capture_caller = false;
            c.capture_process = false;
        });
        state
    }

    #[test]
    fn test_context_inner_and_chain() {
        let state = bare_state();
        let err = WrappedError::new_in(&state, Some(PlainError::new("eof").into()), "reading");

        assert_eq!(
            format(&err, "${{CTX}} | ${{INN}} | ${{CHN}}"),
            "reading | eof | reading: eof"
        );
    }

    #[test]
    fn test_absent_captures_use_sentinels() {
        let state = bare_state();
        let err = WrappedError::new_in(&state, None, "x");

        assert_eq!(
            format(&err, "${{FIL}} ${{FUN}} ${{LIN}} [${{STK}}] ${{RTS}} ${{CPU}} ${{CGO}} [${{MEM}}]"),
            "unknown file unknown function 0 [] -1 -1 -1 []"
        );
        assert_eq!(format(&err, "[${{SET}}][${{SEL}}][${{INN}}]"), "[][][]");
    }

    #[test]
    fn test_metadata_tokens() {
        let state = bare_state();
        let err = WrappedError::new_in(&state, None, "x");

        assert_eq!(format(&err, "#${{IDX}} ~${{SIM}}"), "#1 ~0");
        assert!(format(&err, "${{DUR}}").parse::<f64>().is_ok());
        assert_eq!(format(&err, "${{TIM}}"), err.metadata().time().to_rfc3339());
    }

    #[test]
    fn test_caller_tokens() {
        let state = State::new();
        state.configure(|c| {
            c.capture_process = false;
            c.capture_source_fragments = false;
        });
        let err = WrappedError::new_in(&state, None, "x");

        assert_eq!(format(&err, "${{FIL}}"), "format.rs");
        assert_ne!(format(&err, "${{LIN}}"), "0");
    }

    #[test]
    fn test_severity_tokens() {
        let state = bare_state();
        state
            .severities()
            .register(Severity::new("io", "eof", SeverityLevel::High).unwrap())
            .unwrap();
        let err = WrappedError::new_in(&state, Some(PlainError::new("eof").into()), "reading");

        assert_eq!(format(&err, "${{SEL}}/${{SET}}"), "high/io");
    }

    #[test]
    fn test_unknown_and_partial_tokens_are_kept() {
        let state = bare_state();
        let err = WrappedError::new_in(&state, None, "x");

        assert_eq!(format(&err, "${{XYZ}} ${{CTX"), "${{XYZ}} ${{CTX");
        assert_eq!(format(&err, "${{${{CTX}}"), "${{x");
        assert_eq!(format(&err, "no tokens"), "no tokens");
    }

    #[test]
    fn test_every_token_round_trips_its_text() {
        for token in Token::ALL {
            assert_eq!(Token::parse(token.as_str()), Some(token));
        }
    }
}
