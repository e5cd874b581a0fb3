//! Solver child process
//!
//! The script is written on a separate thread and stdout is collected on
//! another, so a solver that stops reading (or never answers) cannot block
//! the caller past its deadline. On timeout the child is killed and reaped.

use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Instant;
use tracing::{debug, warn};

use crate::features::solver::domain::{SolverError, SolverResult};

/// Run `command args...` with `script` on stdin; returns its stdout
pub fn run_solver(
    command: &str,
    args: &[String],
    script: String,
    deadline: Instant,
) -> SolverResult<String> {
    let mut child = Command::new(command)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| SolverError::Backend(format!("failed to start '{}': {}", command, e)))?;

    let (Some(mut stdin), Some(mut stdout), Some(mut stderr)) =
        (child.stdin.take(), child.stdout.take(), child.stderr.take())
    else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(SolverError::Backend("solver pipes unavailable".to_string()));
    };

    thread::spawn(move || {
        // A solver that exits early closes the pipe; its output decides
        if let Err(e) = stdin.write_all(script.as_bytes()) {
            debug!(error = %e, "solver closed stdin early");
        }
    });

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut out = String::new();
        let result = stdout.read_to_string(&mut out).map(|_| out);
        let _ = tx.send(result);
    });
    let stderr_reader = thread::spawn(move || {
        let mut err = String::new();
        let _ = stderr.read_to_string(&mut err);
        err
    });

    let remaining = deadline.saturating_duration_since(Instant::now());
    match rx.recv_timeout(remaining) {
        Ok(Ok(out)) => {
            let status = child.wait();
            let err = stderr_reader.join().unwrap_or_default();
            if out.trim().is_empty() {
                let detail = if err.trim().is_empty() {
                    format!("no output (exit status {:?})", status.ok())
                } else {
                    err.trim().to_string()
                };
                return Err(SolverError::Backend(detail));
            }
            Ok(out)
        }
        Ok(Err(e)) => {
            let _ = child.kill();
            let _ = child.wait();
            Err(SolverError::Backend(format!("reading solver output: {}", e)))
        }
        Err(RecvTimeoutError::Timeout) => {
            warn!(command, "solver exceeded its deadline, killing it");
            let _ = child.kill();
            let _ = child.wait();
            Err(SolverError::Timeout)
        }
        Err(RecvTimeoutError::Disconnected) => {
            let _ = child.kill();
            let _ = child.wait();
            Err(SolverError::Backend("solver output reader stopped".to_string()))
        }
    }
}
