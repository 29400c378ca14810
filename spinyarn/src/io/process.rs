//! Child process helper for external speech programs.

use std::io::{Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

/// Bytes of stderr kept for diagnostics; the rest is drained and dropped.
const STDERR_LIMIT_BYTES: usize = 8 * 1024;

/// Outcome of a finished (or killed) child process.
#[derive(Debug)]
pub struct ProcessOutcome {
    pub status: ExitStatus,
    pub stderr: Vec<u8>,
    pub timed_out: bool,
}

impl ProcessOutcome {
    pub fn succeeded(&self) -> bool {
        !self.timed_out && self.status.success()
    }

    /// Lossy, trimmed stderr for log fields.
    pub fn stderr_excerpt(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Run `cmd`, feed it `input` on stdin, and wait at most `timeout`.
///
/// Stdout is discarded. Stdin is written and stderr is read on their own
/// threads, so a child that ignores its input or fills a pipe cannot stall the
/// timeout. On timeout the child is killed and the outcome is returned with
/// `timed_out` set rather than as an error.
#[instrument(skip_all, fields(timeout_secs = timeout.as_secs(), input_bytes = input.len()))]
pub fn run_with_input(mut cmd: Command, input: &[u8], timeout: Duration) -> Result<ProcessOutcome> {
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    debug!("spawning child process");
    let mut child = cmd.spawn().context("spawn command")?;

    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;
    let stderr_handle = thread::spawn(move || read_limited(stderr, STDERR_LIMIT_BYTES));

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| anyhow!("stdin was not piped"))?;
    let input = input.to_vec();
    let stdin_handle = thread::spawn(move || {
        // The child may exit without reading everything; its status says more.
        if let Err(err) = stdin.write_all(&input) {
            warn!(err = %err, "child closed stdin early");
        }
    });

    let mut timed_out = false;
    let status = match child.wait_timeout(timeout).context("wait for command")? {
        Some(status) => status,
        None => {
            warn!(timeout_secs = timeout.as_secs(), "command timed out, killing");
            timed_out = true;
            child.kill().context("kill command")?;
            child.wait().context("wait command after kill")?
        }
    };

    if stdin_handle.join().is_err() {
        return Err(anyhow!("stdin writer thread panicked"));
    }
    let stderr = match stderr_handle.join() {
        Ok(result) => result.context("read stderr")?,
        Err(_) => return Err(anyhow!("stderr reader thread panicked")),
    };

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(ProcessOutcome {
        status,
        stderr,
        timed_out,
    })
}

fn read_limited<R: Read>(mut reader: R, limit: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        let remaining = limit.saturating_sub(buf.len());
        buf.extend_from_slice(&chunk[..n.min(remaining)]);
    }
    Ok(buf)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn successful_child_reads_stdin() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("test \"$(cat)\" = hello");
        let outcome = run_with_input(cmd, b"hello", Duration::from_secs(5)).expect("run");
        assert!(outcome.succeeded());
    }

    #[test]
    fn failing_child_reports_stderr() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("cat >/dev/null; echo boom >&2; exit 3");
        let outcome = run_with_input(cmd, b"text", Duration::from_secs(5)).expect("run");
        assert!(!outcome.succeeded());
        assert_eq!(outcome.status.code(), Some(3));
        assert_eq!(outcome.stderr_excerpt(), "boom");
    }

    #[test]
    fn slow_child_is_killed_on_timeout() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("exec sleep 5");
        let outcome = run_with_input(cmd, b"", Duration::from_millis(100)).expect("run");
        assert!(outcome.timed_out);
        assert!(!outcome.succeeded());
    }

    #[test]
    fn timeout_holds_when_child_never_reads_large_input() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("exec sleep 5");
        let input = vec![b'a'; 512 * 1024];

        let started = std::time::Instant::now();
        let outcome = run_with_input(cmd, &input, Duration::from_millis(200)).expect("run");

        assert!(outcome.timed_out);
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
