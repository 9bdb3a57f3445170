//! Common test utilities and helpers
//!
//! This module provides reusable test helpers to reduce code duplication
//! across integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wrapped_error::{Cause, PlainError, State, WrappedError};

/// Test command builder for the wrapped-error CLI
pub struct TestCommand {
    cmd: Command,
}

impl TestCommand {
    /// Create a new test command for the wrapped-error binary
    pub fn new() -> Self {
        let mut cmd = Command::cargo_bin("wrapped-error").expect("Failed to find wrapped-error binary");
        cmd.env_remove("WRAPPED_ERROR_CONFIG").env_remove("RUST_LOG");
        Self { cmd }
    }

    /// Add arguments to the command
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.cmd.arg(arg.as_ref());
        }
        self
    }

    /// Add a single argument to the command
    pub fn arg<S: AsRef<str>>(mut self, arg: S) -> Self {
        self.cmd.arg(arg.as_ref());
        self
    }

    /// Add a path argument to the command
    pub fn path_arg<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cmd.arg(path.as_ref());
        self
    }

    /// Execute and expect success
    pub fn expect_success(mut self) -> TestAssertion {
        let assert = self.cmd.assert().success();
        TestAssertion { assert }
    }

    /// Execute and expect failure
    pub fn expect_failure(mut self) -> TestAssertion {
        let assert = self.cmd.assert().failure();
        TestAssertion { assert }
    }
}

impl Default for TestCommand {
    fn default() -> Self {
        Self::new()
    }
}

/// Test assertion wrapper with convenient methods
pub struct TestAssertion {
    assert: assert_cmd::assert::Assert,
}

impl TestAssertion {
    /// Assert stdout contains text
    pub fn stdout_contains<S: AsRef<str>>(self, text: S) -> Self {
        let assert = self.assert.stdout(predicate::str::contains(text.as_ref()));
        Self { assert }
    }

    /// Assert multiple stdout patterns
    pub fn stdout_contains_all<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self.assert = self.assert.stdout(predicate::str::contains(pattern.as_ref()));
        }
        Self { assert: self.assert }
    }

    /// Assert stderr contains text
    pub fn stderr_contains<S: AsRef<str>>(self, text: S) -> Self {
        let assert = self.assert.stderr(predicate::str::contains(text.as_ref()));
        Self { assert }
    }

    /// Stdout as a string
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.assert.get_output().stdout).into_owned()
    }

    /// Finish the assertion
    pub fn done(self) -> assert_cmd::assert::Assert {
        self.assert
    }
}

/// Test environment setup helper
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub config_path: PathBuf,
}

impl TestEnvironment {
    /// Create a new test environment with temporary directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config_path = temp_dir.path().join("config.toml");

        Self {
            temp_dir,
            config_path,
        }
    }

    /// A path inside the environment's directory
    pub fn file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Create a command configured for this environment
    pub fn command(&self) -> TestCommand {
        TestCommand::new().arg("--config").path_arg(&self.config_path)
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

/// Helpers for building chains in tests
pub mod chains {
    use super::*;

    /// A state that captures call sites but skips process snapshots and source reads
    pub fn quiet_state() -> State {
        let state = State::new();
        state.configure(|c| {
            c.capture_process = false;
            c.capture_source_fragments = false;
        });
        state
    }

    /// Build a chain whose first context is outermost, optionally ending in an opaque error
    pub fn build(state: &State, contexts: &[&str], leaf: Option<&str>) -> WrappedError {
        let mut inner: Option<Cause> = leaf.map(|m| PlainError::new(m).into());
        let mut head: Option<WrappedError> = None;

        for context in contexts.iter().rev() {
            if let Some(link) = head.take() {
                inner = Some(link.into());
            }
            head = Some(WrappedError::new_in(state, inner.take(), *context));
        }
        head.expect("at least one context")
    }
}

/// Assertion helpers for common patterns
pub mod assertions {
    /// Assert that a path exists
    pub fn assert_path_exists<P: AsRef<std::path::Path>>(path: P) {
        assert!(
            path.as_ref().exists(),
            "Path should exist: {}",
            path.as_ref().display()
        );
    }
}
