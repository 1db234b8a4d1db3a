//! Helpers for running child processes with piped stdin and bounded output.

use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

use crate::error::ConfigError;

/// Captured child process output.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Bytes read past the capture limit and discarded.
    pub stdout_truncated: usize,
    pub stderr_truncated: usize,
}

/// Spawn `program` without arguments, feed `stdin`, and capture both output streams.
///
/// Stdout and stderr are drained on reader threads while the child runs so a
/// chatty interpreter cannot block on a full pipe. Bytes beyond
/// `output_limit_bytes` are read and discarded. With `timeout` set, the child
/// is killed once it elapses and [`ConfigError::Timeout`] is returned; with
/// `None` the call waits for as long as the child runs.
#[instrument(skip_all, fields(program = %program.display(), timeout_secs = timeout.map(|t| t.as_secs()), output_limit_bytes))]
pub fn run_with_stdin(
    program: &Path,
    stdin: &[u8],
    timeout: Option<Duration>,
    output_limit_bytes: usize,
) -> Result<CommandOutput, ConfigError> {
    let mut cmd = Command::new(program);
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!("spawning child process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, "failed to spawn interpreter");
            return Err(ConfigError::Launch {
                binary: program.to_path_buf(),
                source: e,
            });
        }
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| not_piped("stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| not_piped("stderr"))?;

    let stdout_handle = thread::spawn(move || read_stream_limited(stdout, output_limit_bytes));
    let stderr_handle = thread::spawn(move || read_stream_limited(stderr, output_limit_bytes));

    // Written on its own thread so the timeout also covers an interpreter
    // that never reads its input.
    let mut child_stdin = child.stdin.take().ok_or_else(|| not_piped("stdin"))?;
    let input = stdin.to_vec();
    let stdin_handle = thread::spawn(move || {
        // Dropping the handle closes the pipe so the child sees EOF.
        child_stdin.write_all(&input)
    });

    let status = match timeout {
        Some(limit) => match child
            .wait_timeout(limit)
            .map_err(|e| ConfigError::communication("wait for interpreter", e))?
        {
            Some(status) => status,
            None => {
                warn!(timeout_secs = limit.as_secs(), "interpreter timed out, killing");
                child
                    .kill()
                    .map_err(|e| ConfigError::communication("kill interpreter", e))?;
                child
                    .wait()
                    .map_err(|e| ConfigError::communication("wait interpreter after kill", e))?;
                let _ = stdin_handle.join();
                let _ = join_output(stdout_handle);
                return Err(ConfigError::Timeout {
                    timeout: limit,
                    stderr: collect_stderr(stderr_handle),
                });
            }
        },
        None => child
            .wait()
            .map_err(|e| ConfigError::communication("wait for interpreter", e))?,
    };

    let written = stdin_handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("stdin writer thread panicked")));
    if let Err(e) = written {
        warn!(err = %e, exit_code = ?status.code(), "failed to write script to interpreter");
        let _ = join_output(stdout_handle);
        return Err(ConfigError::Communication {
            stage: "write stdin",
            source: e,
            stderr: collect_stderr(stderr_handle),
        });
    }

    let (stdout, stdout_truncated) =
        join_output(stdout_handle).map_err(|e| ConfigError::communication("read stdout", e))?;
    let (stderr, stderr_truncated) =
        join_output(stderr_handle).map_err(|e| ConfigError::communication("read stderr", e))?;

    if stdout_truncated > 0 || stderr_truncated > 0 {
        warn!(stdout_truncated, stderr_truncated, "output truncated");
    }

    debug!(exit_code = ?status.code(), "command finished");
    Ok(CommandOutput {
        status,
        stdout,
        stderr,
        stdout_truncated,
        stderr_truncated,
    })
}

fn not_piped(stream: &str) -> ConfigError {
    ConfigError::communication(
        "open pipes",
        io::Error::other(format!("{stream} was not piped")),
    )
}

/// Stderr captured so far, for attaching to an error. Read failures yield `""`.
fn collect_stderr(handle: thread::JoinHandle<io::Result<(Vec<u8>, usize)>>) -> String {
    join_output(handle)
        .map(|(bytes, _)| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

fn join_output(
    handle: thread::JoinHandle<io::Result<(Vec<u8>, usize)>>,
) -> io::Result<(Vec<u8>, usize)> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(io::Error::other("output reader thread panicked")),
    }
}

fn read_stream_limited<R: Read>(mut reader: R, limit: usize) -> io::Result<(Vec<u8>, usize)> {
    let mut buf = Vec::new();
    let mut truncated = 0usize;
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        let remaining = limit.saturating_sub(buf.len());
        if remaining > 0 {
            let keep = n.min(remaining);
            buf.extend_from_slice(&chunk[..keep]);
            truncated += n.saturating_sub(keep);
        } else {
            truncated += n;
        }
    }

    Ok((buf, truncated))
}
