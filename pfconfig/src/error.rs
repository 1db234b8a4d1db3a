//! Errors raised while fetching appliance configuration.
//!
//! A key path that leads nowhere is not an error: lookups return `Ok(None)`.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The interpreter binary could not be started.
    #[error("failed to launch interpreter {}: {source}", .binary.display())]
    Launch {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing the script or draining the output pipes failed.
    #[error("interpreter communication failed ({stage}): {source}{}", stderr_suffix(.stderr))]
    Communication {
        stage: &'static str,
        #[source]
        source: io::Error,
        stderr: String,
    },

    /// The interpreter did not exit within the configured bound.
    #[error("interpreter timed out after {}s{}", .timeout.as_secs(), stderr_suffix(.stderr))]
    Timeout { timeout: Duration, stderr: String },

    /// Stdout hit the capture limit, so the JSON would be cut short.
    #[error("interpreter stdout exceeded the output limit ({discarded} bytes discarded)")]
    Truncated { discarded: usize },

    /// Stdout was not valid JSON after header stripping.
    #[error("failed to decode interpreter output as JSON: {source}{}", stderr_suffix(.stderr))]
    Decode {
        #[source]
        source: serde_json::Error,
        stderr: String,
    },

    /// The key-path argument list was malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ConfigError {
    pub(crate) fn communication(stage: &'static str, source: io::Error) -> Self {
        Self::Communication {
            stage,
            source,
            stderr: String::new(),
        }
    }

    /// Stderr captured from the interpreter, when the error carries it.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Communication { stderr, .. }
            | Self::Timeout { stderr, .. }
            | Self::Decode { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\ninterpreter stderr:\n{trimmed}")
    }
}
