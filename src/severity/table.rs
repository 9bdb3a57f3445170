use super::{Severity, SeverityMatch};
use crate::chain::Link;
use crate::errors::{WrapError, WrapResult};
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// An ordered, concurrently readable collection of severities
#[derive(Debug, Default)]
pub struct SeverityTable {
    severities: RwLock<Vec<Severity>>,
}

impl SeverityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `severity` to the table
    ///
    /// # Errors
    ///
    /// Returns [`WrapError::AlreadyRegistered`] if an equal severity is
    /// already present.
    pub fn register(&self, severity: Severity) -> WrapResult<()> {
        let mut severities = self.severities.write().unwrap_or_else(PoisonError::into_inner);

        if severities.contains(&severity) {
            return Err(WrapError::already_registered(severity.title()));
        }

        debug!("registered severity {}", severity);
        severities.push(severity);
        Ok(())
    }

    /// Remove the first severity equal to `severity`; absent entries are ignored
    pub fn unregister(&self, severity: &Severity) {
        let mut severities = self.severities.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(pos) = severities.iter().position(|s| s == severity) {
            let removed = severities.remove(pos);
            debug!("unregistered severity {}", removed);
        }
    }

    pub fn len(&self) -> usize {
        self.severities.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered severities in registration order
    pub fn severities(&self) -> Vec<Severity> {
        self.severities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.severities
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Find the best-scoring severity over every link of the chain at `link`
    ///
    /// Each link is scored by its own rendered message, which includes the
    /// links below it. Ties keep the earlier link and, within a link, the
    /// earlier registration. Returns `None` when nothing scores above 0.0.
    pub fn best_match(&self, link: Link<'_>) -> Option<SeverityMatch> {
        let severities = self.severities.read().unwrap_or_else(PoisonError::into_inner);
        if severities.is_empty() {
            return None;
        }

        let mut best: Option<(&Severity, f64)> = None;
        link.walk(|current| {
            let text = current.rendered();
            for severity in severities.iter() {
                let score = severity.score_text(&text);
                if score > best.map_or(0.0, |(_, s)| s) {
                    best = Some((severity, score));
                }
            }
            true
        });

        best.map(|(severity, score)| SeverityMatch {
            severity: severity.clone(),
            score,
        })
    }
}
