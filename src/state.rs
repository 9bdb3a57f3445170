//! Process-wide mutable state
//!
//! Chain construction reads and updates four shared resources: the creation
//! index counter, the similarity tracker, the severity table and the launch
//! clock. [`State`] owns all of them together with the active configuration.
//! Each resource has its own lock or atomic so contention on one never stalls
//! the others.
//!
//! The global instance is created on first use. Call [`init`] early in `main`
//! to pin the launch clock to program start.

use crate::config::Configuration;
use crate::severity::SeverityTable;
use crate::similarity::SimilarityTracker;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

/// First index handed out by a fresh state
pub const DEFAULT_FIRST_INDEX: u64 = 1;

static STATE: Lazy<State> = Lazy::new(State::new);

/// The process-wide state
pub fn state() -> &'static State {
    &STATE
}

/// Initialize the process-wide state, pinning the launch clock
pub fn init() -> &'static State {
    Lazy::force(&STATE)
}

#[derive(Debug, Clone, Copy)]
struct LaunchClock {
    instant: Instant,
    wall: DateTime<Utc>,
}

impl LaunchClock {
    fn now() -> Self {
        Self {
            instant: Instant::now(),
            wall: Utc::now(),
        }
    }
}

/// Shared counters, tables and configuration used by chain construction
#[derive(Debug)]
pub struct State {
    next_index: AtomicU64,
    similarity: SimilarityTracker,
    severities: SeverityTable,
    launch: RwLock<LaunchClock>,
    config: RwLock<Configuration>,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    /// Create an isolated state with default values
    pub fn new() -> Self {
        Self {
            next_index: AtomicU64::new(DEFAULT_FIRST_INDEX),
            similarity: SimilarityTracker::new(),
            severities: SeverityTable::new(),
            launch: RwLock::new(LaunchClock::now()),
            config: RwLock::new(Configuration::default()),
        }
    }

    /// Restore every resource to its initial value
    pub fn reset(&self) {
        self.next_index.store(DEFAULT_FIRST_INDEX, Ordering::SeqCst);
        self.similarity.reset();
        self.severities.clear();
        *self.launch.write().unwrap_or_else(PoisonError::into_inner) = LaunchClock::now();
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Configuration::default();
    }

    /// The index the next created link will receive
    pub fn next_index(&self) -> u64 {
        self.next_index.load(Ordering::SeqCst)
    }

    pub fn set_next_index(&self, index: u64) {
        self.next_index.store(index, Ordering::SeqCst);
    }

    /// Hand out the next index
    ///
    /// Concurrent callers always receive distinct values, increasing in the
    /// order the counter was updated.
    pub fn take_index(&self) -> u64 {
        self.next_index.fetch_add(1, Ordering::SeqCst)
    }

    pub fn similarity(&self) -> &SimilarityTracker {
        &self.similarity
    }

    pub fn severities(&self) -> &SeverityTable {
        &self.severities
    }

    /// Wall-clock time of launch (or of the last reset)
    pub fn launched_at(&self) -> DateTime<Utc> {
        self.launch.read().unwrap_or_else(PoisonError::into_inner).wall
    }

    pub fn elapsed_since_launch(&self) -> Duration {
        self.launch
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .instant
            .elapsed()
    }

    /// A snapshot of the active configuration
    pub fn configuration(&self) -> Configuration {
        self.config.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_configuration(&self, config: Configuration) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
    }

    /// Modify the active configuration in place
    pub fn configure<F>(&self, f: F)
    where
        F: FnOnce(&mut Configuration),
    {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::{Severity, SeverityLevel};
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_index_starts_at_one() {
        let state = State::new();
        assert_eq!(state.take_index(), 1);
        assert_eq!(state.take_index(), 2);
        assert_eq!(state.next_index(), 3);
    }

    #[test]
    fn test_set_next_index() {
        let state = State::new();
        state.set_next_index(100);
        assert_eq!(state.take_index(), 100);
    }

    #[test]
    fn test_concurrent_indexes_are_distinct() {
        let state = Arc::new(State::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let state = Arc::clone(&state);
                thread::spawn(move || (0..250).map(|_| state.take_index()).collect::<Vec<_>>())
            })
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            let indexes = handle.join().unwrap();
            assert!(indexes.windows(2).all(|w| w[0] < w[1]));
            all.extend(indexes);
        }
        assert_eq!(all.len(), 2000);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let state = State::new();
        state.take_index();
        state.similarity().record_digest(1);
        state
            .severities()
            .register(Severity::new("t", "x", SeverityLevel::Low).unwrap())
            .unwrap();
        state.configure(|c| c.capture_caller = false);

        state.reset();

        assert_eq!(state.next_index(), DEFAULT_FIRST_INDEX);
        assert_eq!(state.similarity().record_digest(1), 0);
        assert!(state.severities().is_empty());
        assert!(state.configuration().capture_caller);
    }

    #[test]
    fn test_elapsed_grows() {
        let state = State::new();
        let first = state.elapsed_since_launch();
        thread::sleep(Duration::from_millis(2));
        assert!(state.elapsed_since_launch() > first);
        assert!(state.launched_at() <= Utc::now());
    }
}
