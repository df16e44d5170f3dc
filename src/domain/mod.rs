use serde::{Deserialize, Serialize};

use crate::core::error::CommandError;

/// One external command to run. Built per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub command_line: String,
    /// When false, a non-zero exit is recorded but not classified as an error.
    pub expects_success: bool,
}

impl CommandSpec {
    pub fn new(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
            expects_success: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandErrorKind {
    NotFound,
    NonZeroExit,
    Unexpected,
}

/// Captured outcome of one command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    /// `-1` when the process never produced a status (spawn failure, signal).
    pub exit_code: i32,
    pub error: Option<CommandErrorKind>,
    /// Human-readable cause for `Unexpected` failures.
    pub detail: Option<String>,
}

impl CommandResult {
    pub fn success(command: impl Into<String>, stdout: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: 0,
            error: None,
            detail: None,
        }
    }

    pub fn not_found(command: impl Into<String>, stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            command: command.into(),
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code,
            error: Some(CommandErrorKind::NotFound),
            detail: None,
        }
    }

    pub fn failed(command: impl Into<String>, stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            command: command.into(),
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code,
            error: Some(CommandErrorKind::NonZeroExit),
            detail: None,
        }
    }

    pub fn unexpected(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            stdout: String::new(),
            stderr: String::new(),
            exit_code: -1,
            error: Some(CommandErrorKind::Unexpected),
            detail: Some(reason.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Trimmed stdout on success, the classified error otherwise.
    pub fn into_output(self) -> Result<String, CommandError> {
        match self.error {
            None => Ok(self.stdout.trim().to_owned()),
            Some(CommandErrorKind::NotFound) => Err(CommandError::NotFound {
                command: self.command,
            }),
            Some(CommandErrorKind::NonZeroExit) => Err(CommandError::Failed {
                command: self.command,
                stderr: self.stderr,
                exit_code: self.exit_code,
            }),
            Some(CommandErrorKind::Unexpected) => Err(CommandError::Unexpected {
                command: self.command,
                reason: self.detail.unwrap_or_else(|| "unknown failure".into()),
            }),
        }
    }
}

/// Payload of `get_jetson_sw_info`. `errors` is absent, not empty, on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwInfo {
    pub jetpack_release: String,
    pub linux_version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl Default for SwInfo {
    fn default() -> Self {
        Self {
            jetpack_release: "N/A".into(),
            linux_version: "N/A".into(),
            errors: Vec::new(),
        }
    }
}

/// Body of the `jetson://info` resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDescriptor {
    pub server_name: String,
    pub version: String,
    pub description: String,
    pub capabilities: Vec<String>,
}
