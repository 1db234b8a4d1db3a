//! Shared types passed between the interpreter runner and the resolver.

use serde_json::Value;

/// Decoded appliance configuration.
///
/// The shape is defined by the appliance, so it stays a generic JSON value
/// (object, array, string, number, bool or null).
pub type ConfigTree = Value;

/// Output of one interpreter run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionResult {
    /// Stdout with any leading `Content-Type:` header removed.
    pub stdout: String,
    /// Stderr exactly as the interpreter wrote it.
    pub stderr: String,
    /// Exit code, when the child exited normally. Informational only.
    pub exit_code: Option<i32>,
    /// Stdout bytes discarded after the capture limit was reached.
    pub stdout_truncated: usize,
}

impl ExecutionResult {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code: Some(0),
            stdout_truncated: 0,
        }
    }
}
