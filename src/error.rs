use rustyline::error::ReadlineError;
use std::io;
use std::path::PathBuf;

/// Everything that can go wrong while reading, splitting or running a command.
///
/// Only [`ShellError::is_fatal`] errors stop the interpreter. The rest are
/// reported on the error channel and the loop moves on to the next line.
#[derive(thiserror::Error, Debug)]
pub enum ShellError {
    /// Memory for the input line or argument vector could not be obtained.
    #[error("allocation error")]
    Allocation,

    /// A builtin was called without an argument it needs.
    #[error("{command}: expected argument")]
    MissingArgument { command: String },

    #[error("cd: {}: {source}", .path.display())]
    DirectoryChange {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The executable could not be found or the OS refused to run it.
    #[error("{command}: {reason}")]
    Execution { command: String, reason: String },

    /// The OS could not create the child process at all.
    #[error("{command}: failed to spawn: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The input stream itself failed.
    #[error("read error: {0}")]
    Input(#[source] io::Error),

    #[error("write error: {0}")]
    Output(#[source] io::Error),

    #[error("line editor error: {0}")]
    Editor(#[from] ReadlineError),
}

impl ShellError {
    pub fn command_not_found(command: impl Into<String>) -> Self {
        ShellError::Execution {
            command: command.into(),
            reason: "command not found".to_string(),
        }
    }

    /// Whether the interpreter has to stop instead of reporting and reading on.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ShellError::Allocation | ShellError::Input(_) | ShellError::Editor(_)
        )
    }
}
