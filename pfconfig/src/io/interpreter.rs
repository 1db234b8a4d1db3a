//! Interpreter abstraction for running rendered scripts.
//!
//! The [`Interpreter`] trait decouples config resolution from the actual
//! appliance backend (`php-cgi`). Tests use scripted interpreters that return
//! predetermined output without spawning processes.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::core::sanitize::strip_content_type_header;
use crate::core::script::Script;
use crate::core::types::ExecutionResult;
use crate::error::ConfigError;
use crate::io::process::run_with_stdin;
use crate::io::settings::Settings;

/// Abstraction over script execution backends.
pub trait Interpreter {
    /// Run `script` once and return its sanitized stdout plus raw stderr.
    fn run(&self, script: &Script) -> Result<ExecutionResult, ConfigError>;
}

impl<T: Interpreter + ?Sized> Interpreter for &T {
    fn run(&self, script: &Script) -> Result<ExecutionResult, ConfigError> {
        (**self).run(script)
    }
}

/// Interpreter that pipes scripts into the appliance's `php-cgi` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhpCgi {
    /// Path to the interpreter executable.
    pub binary: PathBuf,
    /// Kill the interpreter after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub output_limit_bytes: usize,
}

impl PhpCgi {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        let defaults = Settings::default();
        Self {
            binary: binary.into(),
            timeout: defaults.timeout(),
            output_limit_bytes: defaults.output_limit_bytes,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            binary: settings.interpreter.clone(),
            timeout: settings.timeout(),
            output_limit_bytes: settings.output_limit_bytes,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Interpreter for PhpCgi {
    #[instrument(skip_all, fields(binary = %self.binary.display()))]
    fn run(&self, script: &Script) -> Result<ExecutionResult, ConfigError> {
        let source = script.render();
        debug!("running script in php-cgi:\n{source}");

        let output = run_with_stdin(
            &self.binary,
            source.as_bytes(),
            self.timeout,
            self.output_limit_bytes,
        )?;

        let raw_out = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !raw_out.is_empty() {
            debug!("stdout:\n{raw_out}");
        }
        if !stderr.is_empty() {
            debug!("stderr:\n{stderr}");
        }
        if !output.status.success() {
            warn!(exit_code = ?output.status.code(), "interpreter exited unsuccessfully");
        }

        Ok(ExecutionResult {
            stdout: strip_content_type_header(&raw_out),
            stderr,
            exit_code: output.status.code(),
            stdout_truncated: output.stdout_truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_settings_copies_interpreter_options() {
        let settings = Settings {
            interpreter: PathBuf::from("/opt/php/bin/php-cgi"),
            timeout_secs: 0,
            output_limit_bytes: 512,
            ..Settings::default()
        };
        let php = PhpCgi::from_settings(&settings);
        assert_eq!(php.binary, PathBuf::from("/opt/php/bin/php-cgi"));
        assert_eq!(php.timeout, None);
        assert_eq!(php.output_limit_bytes, 512);
    }

    #[test]
    fn launch_failure_is_reported_with_binary_path() {
        let php = PhpCgi::new("/nonexistent/pfconfig-test/php-cgi");
        let err = php.run(&Script::new(["echo 1;"])).expect_err("launch fails");
        match err {
            ConfigError::Launch { binary, .. } => {
                assert_eq!(binary, PathBuf::from("/nonexistent/pfconfig-test/php-cgi"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
