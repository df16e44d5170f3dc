//! Runs fixed command lines through `sh -c` and classifies the outcome.
//!
//! There is no timeout and no retry: a hung command blocks its caller until the
//! child exits. Callers that need a deadline must wrap `execute` themselves.

use std::process::{Output, Stdio};
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{Instrument, Span};

use crate::domain::{CommandResult, CommandSpec};

/// Exit status POSIX shells use for "command not found".
const SHELL_NOT_FOUND: i32 = 127;
const NO_SUCH_FILE: &str = "No such file or directory";
/// Children run under the C locale so stderr matches [`NO_SUCH_FILE`].
const CHILD_LOCALE: &str = "C";

/// Backend abstraction so handlers can run against a real shell or a mock.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Always yields exactly one result; failures are values, never panics.
    async fn execute(&self, spec: CommandSpec) -> CommandResult;
}

#[derive(Clone)]
pub struct ShellExecutor {
    shell: String,
    span: Span,
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new("sh")
    }
}

impl ShellExecutor {
    pub fn new(shell: impl Into<String>) -> Self {
        let shell = shell.into();
        let span = tracing::info_span!("shell", shell = %shell);
        Self { shell, span }
    }
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn execute(&self, spec: CommandSpec) -> CommandResult {
        let span = tracing::debug_span!(parent: &self.span, "exec", command = %spec.command_line);
        async {
            tracing::info!("Executing command");
            let start = Instant::now();
            let res = Command::new(&self.shell)
                .arg("-c")
                .arg(&spec.command_line)
                .env("LC_ALL", CHILD_LOCALE)
                .stdin(Stdio::null())
                .output()
                .await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            metrics::histogram!("jetson_command_duration_ms").record(elapsed_ms as f64);

            let result = match res {
                Ok(output) => classify(&spec, output),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    CommandResult::not_found(&spec.command_line, e.to_string(), -1)
                }
                Err(e) => CommandResult::unexpected(
                    &spec.command_line,
                    format!("failed to run {}: {e}", self.shell),
                ),
            };

            match result.error {
                None => tracing::info!(
                    elapsed_ms,
                    stdout_len = result.stdout.len(),
                    "Command successful"
                ),
                Some(kind) => tracing::error!(
                    elapsed_ms,
                    ?kind,
                    exit_code = result.exit_code,
                    stderr = %result.stderr.trim(),
                    "Command failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }
}

fn classify(spec: &CommandSpec, output: Output) -> CommandResult {
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let command = spec.command_line.clone();

    let Some(code) = output.status.code() else {
        return CommandResult {
            stdout,
            stderr,
            ..CommandResult::unexpected(command, terminated_by(&output))
        };
    };

    if code == 0 || !spec.expects_success {
        return CommandResult {
            exit_code: code,
            stderr,
            ..CommandResult::success(command, stdout)
        };
    }

    if code == SHELL_NOT_FOUND || stderr.contains(NO_SUCH_FILE) {
        return CommandResult {
            stdout,
            ..CommandResult::not_found(command, stderr, code)
        };
    }

    CommandResult {
        stdout,
        ..CommandResult::failed(command, stderr, code)
    }
}

#[cfg(unix)]
fn terminated_by(output: &Output) -> String {
    use std::os::unix::process::ExitStatusExt;
    match output.status.signal() {
        Some(sig) => format!("process terminated by signal {sig}"),
        None => "process exited without a status code".into(),
    }
}

#[cfg(not(unix))]
fn terminated_by(_output: &Output) -> String {
    "process exited without a status code".into()
}
