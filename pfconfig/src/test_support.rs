//! Test-only interpreter doubles.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::script::Script;
use crate::core::types::ExecutionResult;
use crate::error::ConfigError;
use crate::io::interpreter::Interpreter;

/// Interpreter that returns queued results in order and records every script.
#[derive(Debug, Default)]
pub struct ScriptedInterpreter {
    results: RefCell<VecDeque<ExecutionResult>>,
    scripts: RefCell<Vec<String>>,
}

impl ScriptedInterpreter {
    pub fn new(results: Vec<ExecutionResult>) -> Self {
        Self {
            results: RefCell::new(results.into()),
            scripts: RefCell::new(Vec::new()),
        }
    }

    /// Rendered scripts received so far.
    pub fn scripts(&self) -> Vec<String> {
        self.scripts.borrow().clone()
    }
}

impl Interpreter for ScriptedInterpreter {
    fn run(&self, script: &Script) -> Result<ExecutionResult, ConfigError> {
        self.scripts.borrow_mut().push(script.render());
        self.results.borrow_mut().pop_front().ok_or_else(|| {
            ConfigError::Communication {
                stage: "scripted interpreter",
                source: io::Error::other("no scripted result queued"),
                stderr: String::new(),
            }
        })
    }
}

/// Temporary directory holding a fake `php-cgi` shell script.
pub struct MockInterpreter {
    dir: tempfile::TempDir,
    binary: PathBuf,
}

impl MockInterpreter {
    /// Create a mock that drains stdin, then prints `stdout` and `stderr` verbatim.
    pub fn printing(stdout: &str, stderr: &str) -> io::Result<Self> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("stdout.txt"), stdout)?;
        fs::write(dir.path().join("stderr.txt"), stderr)?;
        let body = format!(
            "cat > \"{dir}/stdin.txt\"\ncat \"{dir}/stdout.txt\"\ncat \"{dir}/stderr.txt\" >&2\n",
            dir = dir.path().display()
        );
        Self::from_body(dir, &body)
    }

    /// Create a mock from a raw `sh` body.
    pub fn with_body(body: &str) -> io::Result<Self> {
        Self::from_body(tempfile::tempdir()?, body)
    }

    fn from_body(dir: tempfile::TempDir, body: &str) -> io::Result<Self> {
        let binary = dir.path().join("php-cgi");
        fs::write(&binary, format!("#!/bin/sh\n{body}"))?;
        make_executable(&binary)?;
        Ok(Self { dir, binary })
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Script text the mock received on stdin, when it was built with [`MockInterpreter::printing`].
    pub fn received_stdin(&self) -> io::Result<String> {
        fs::read_to_string(self.dir.path().join("stdin.txt"))
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
