//! External tool invocation.
//!
//! Every collaborator tool (nmcli, iwgetid, iw, wpctl, fc-list, pgrep,
//! ping, xsetroot, the sync client) is an untrusted, best-effort text
//! producer. All calls go through [`CommandRunner`] so pollers can be
//! tested against a scripted runner, and every call is time-boxed
//! independently of the overall cycle deadline.

use async_trait::async_trait;
use log::warn;
use std::collections::HashSet;
use std::process::Stdio;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;
use tokio::process::Command;

/// Per-call timeout for external tools.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("tool not found: {0}")]
    NotFound(String),

    #[error("tool timed out: {0}")]
    Timeout(String),

    #[error("tool exited with status {status}: {stderr}")]
    Failed { status: i32, stderr: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Captured stdout of a successful run.
#[derive(Clone, Debug)]
pub struct ProbeOutput {
    pub stdout: String,
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<ProbeOutput, ProbeError>;
}

/// Runs real processes via tokio with kill-on-drop, so a timed-out tool
/// does not linger past its cycle.
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<ProbeOutput, ProbeError> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProbeError::NotFound(program.to_string())
            } else {
                ProbeError::Io(e)
            }
        })?;

        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| ProbeError::Timeout(program.to_string()))??;

        if output.status.success() {
            Ok(ProbeOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            })
        } else {
            Err(ProbeError::Failed {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// Check whether a binary exists on PATH.
pub async fn has_command(runner: &dyn CommandRunner, name: &str) -> bool {
    let probe = format!("command -v -- {name}");
    match runner.run("sh", &["-c", &probe], PROBE_TIMEOUT).await {
        Ok(out) => !out.stdout.trim().is_empty(),
        Err(_) => false,
    }
}

/// Warn at most once per distinct cause for the process lifetime.
/// Keeps a flaky tool from spamming the log every ten seconds.
pub fn warn_once(cause: &str, message: impl AsRef<str>) {
    static SEEN: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();
    let seen = SEEN.get_or_init(|| Mutex::new(HashSet::new()));
    let mut seen = match seen.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if seen.insert(cause.to_string()) {
        warn!("{}", message.as_ref());
    }
}
