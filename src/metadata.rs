//! Creation-time metadata of chain links

use crate::chain::Link;
use crate::severity::SeverityMatch;
use crate::state::State;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Metadata recorded when a chain link is created
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    time: DateTime<Utc>,
    #[serde(with = "duration_secs")]
    duration: Duration,
    index: u64,
    similar: u64,
    severity: Option<SeverityMatch>,
}

impl Metadata {
    /// Assemble metadata for a link wrapping `inner`
    ///
    /// Draws the next index from `state`, measures the time since launch, and,
    /// when `track_similar` is set, records `inner` with the similarity
    /// tracker. Severity is looked up only when the table is populated.
    pub fn assemble(state: &State, inner: Option<Link<'_>>, track_similar: bool) -> Self {
        let similar = if track_similar {
            state.similarity().record_and_count(inner)
        } else {
            0
        };

        let severity = match inner {
            Some(link) if !state.severities().is_empty() => state.severities().best_match(link),
            _ => None,
        };

        Self {
            time: Utc::now(),
            duration: state.elapsed_since_launch(),
            index: state.take_index(),
            similar,
            severity,
        }
    }

    /// Metadata for links that were decoded or parsed rather than created
    pub fn empty() -> Self {
        Self {
            time: DateTime::<Utc>::default(),
            duration: Duration::ZERO,
            index: 0,
            similar: 0,
            severity: None,
        }
    }

    /// When the link was created
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// Time between process launch and the link's creation
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Position of the link in the process-wide creation sequence
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Number of earlier links whose cause rendered identically
    pub fn similar(&self) -> u64 {
        self.similar
    }

    pub fn severity(&self) -> Option<&SeverityMatch> {
        self.severity.as_ref()
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(#{}) (≈{}) (+{:.6}) {}",
            self.index,
            self.similar,
            self.duration.as_secs_f64(),
            self.time
        )
    }
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }
}
