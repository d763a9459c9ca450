use crate::builtin::{self, Builtin};
use crate::env::Environment;
use crate::error::ShellError;
use std::io::Write;
use tracing::warn;

/// Control signal returned by every command to the dispatch loop.
///
/// It only says whether to read another line. What went wrong, if anything,
/// has already been written to the error channel by the command itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    Continue,
    ExitRequested,
    /// The command failed and reported it; the loop goes on.
    ContinueAfterError,
}

impl LoopStatus {
    pub fn should_continue(self) -> bool {
        self != LoopStatus::ExitRequested
    }
}

/// In-process command implementation.
///
/// `args` is the full argument vector, the command name included at index 0.
pub type Handler =
    fn(args: &[String], out: &mut dyn Write, err: &mut dyn Write, env: &mut Environment) -> LoopStatus;

/// What a command name refers to.
#[derive(Debug, Clone, Copy)]
pub enum Command {
    Builtin(&'static Builtin),
    External,
}

impl Command {
    /// Builtins win over any program with the same name.
    pub fn resolve(name: &str) -> Self {
        match builtin::lookup(name) {
            Some(b) => Command::Builtin(b),
            None => Command::External,
        }
    }
}

/// Writes `error` to the error channel where the failure happened.
pub(crate) fn report_failure(err: &mut dyn Write, error: &ShellError) -> LoopStatus {
    warn!(%error, "command failed");
    // Nowhere left to report to if stderr itself is gone.
    let _ = writeln!(err, "lsh: {error}");
    LoopStatus::ContinueAfterError
}
