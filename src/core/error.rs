use thiserror::Error;

/// Outcome of a command that did not produce usable stdout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The file or binary the command refers to does not exist.
    #[error("file not found for command: {command}")]
    NotFound { command: String },

    /// The process ran and exited with a failing status.
    #[error("{}", failed_detail(.command, .stderr, .exit_code))]
    Failed {
        command: String,
        stderr: String,
        exit_code: i32,
    },

    /// Spawn/wait failure, signal termination, anything else.
    #[error("{reason}")]
    Unexpected { command: String, reason: String },
}

impl CommandError {
    pub fn command(&self) -> &str {
        match self {
            CommandError::NotFound { command }
            | CommandError::Failed { command, .. }
            | CommandError::Unexpected { command, .. } => command,
        }
    }
}

/// Trimmed stderr when there is any, otherwise the raw exit status line.
fn failed_detail(command: &str, stderr: &str, exit_code: &i32) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        format!("Command '{command}' returned non-zero exit status {exit_code}.")
    } else {
        trimmed.to_owned()
    }
}

/// Errors surfaced by the dispatcher to the transports.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown operation: {0}")]
    OperationNotFound(String),

    #[error("{0}")]
    Handler(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("operation already registered: {0}")]
    Duplicate(&'static str),
}
