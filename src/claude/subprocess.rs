//! Claude CLI spawning.

use std::env;
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::ClaudeError;

/// Default timeout for Claude subprocess execution (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Environment variable to override the default timeout.
pub const TIMEOUT_ENV_VAR: &str = "CHGLOG_CLAUDE_TIMEOUT";

/// Subprocess timeout: `CHGLOG_CLAUDE_TIMEOUT` seconds when set, else 300s.
fn get_timeout() -> Duration {
    let default = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
    let Some(raw) = env::var(TIMEOUT_ENV_VAR).ok().filter(|v| !v.trim().is_empty()) else {
        return default;
    };
    raw.trim().parse::<u64>().map(Duration::from_secs).unwrap_or_else(|_| {
        warn!(
            var = TIMEOUT_ENV_VAR,
            value = %raw,
            default_secs = DEFAULT_TIMEOUT_SECS,
            "Invalid timeout, using default"
        );
        default
    })
}

/// Name of the Claude Code executable looked up on `PATH`.
const CLAUDE_BIN: &str = "claude";

/// Check if Claude Code CLI is installed and accessible.
pub async fn check_claude_installed() -> Result<(), ClaudeError> {
    check_installed(CLAUDE_BIN).await
}

async fn check_installed(program: &str) -> Result<(), ClaudeError> {
    if which::which(program).is_err() {
        debug!(program, "Executable not found on PATH");
        return Err(ClaudeError::NotInstalled);
    }

    let version_check = Command::new(program)
        .arg("--version")
        .output()
        .await
        .map_err(ClaudeError::SpawnFailed)?;

    if !version_check.status.success() {
        return Err(ClaudeError::NotInstalled);
    }

    Ok(())
}

/// Arguments for one non-interactive Claude invocation.
fn claude_args(prompt: &str, system: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "-p".to_string(),
        prompt.to_string(),
        "--output-format".to_string(),
        "json".to_string(),
    ];
    if let Some(system) = system {
        args.push("--append-system-prompt".to_string());
        args.push(system.to_string());
    }
    args
}

/// Run Claude CLI with a prompt and return its raw JSON envelope.
///
/// # Timeout
///
/// The subprocess has a default timeout of 5 minutes, configurable via
/// `CHGLOG_CLAUDE_TIMEOUT` (seconds). Exceeding it returns
/// `ClaudeError::Timeout`.
pub async fn run_claude(prompt: &str, system: Option<&str>) -> Result<String, ClaudeError> {
    let timeout_duration = get_timeout();
    debug!(
        timeout_secs = timeout_duration.as_secs(),
        prompt_len = prompt.len(),
        "Spawning claude"
    );

    let mut command = Command::new(CLAUDE_BIN);
    command.args(claude_args(prompt, system));
    let output = run_with_timeout(command, timeout_duration).await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);
        return Err(ClaudeError::NonZeroExit { code, stderr });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Wait for `command` to finish. The child is killed if the deadline passes
/// or the caller drops the future.
async fn run_with_timeout(mut command: Command, limit: Duration) -> Result<Output, ClaudeError> {
    let pending = command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    timeout(limit, pending)
        .await
        .map_err(|_| ClaudeError::Timeout(limit.as_secs()))?
        .map_err(ClaudeError::SpawnFailed)
}
