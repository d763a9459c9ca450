use crate::command::{Command, LoopStatus, report_failure};
use crate::config::DEFAULT_PROMPT;
use crate::env::Environment;
use crate::error::ShellError;
use crate::external;
use crate::io_adapters::LineSource;
use crate::tokenizer;
use std::io::Write;
use tracing::{debug, error};

/// Where the read-split-dispatch cycle stands. Each state owns the data the
/// next step consumes, so a line is dropped as soon as it has been split and
/// the arguments as soon as they have been dispatched.
#[derive(Debug)]
enum LoopState {
    /// Showing the prompt and waiting for a line.
    Prompting,
    Tokenizing(String),
    Dispatching(Vec<String>),
    Terminated,
}

/// A line-oriented command interpreter.
///
/// Each line is split on whitespace; the first word names either a builtin,
/// run in this process, or a program, run as a child that is waited for.
///
/// Example
/// ```
/// use lsh::{Interpreter, LoopStatus};
/// let mut sh = Interpreter::default();
/// let mut out = Vec::new();
/// let status = sh.execute_line("echo hello world", &mut out, &mut std::io::sink()).unwrap();
/// assert_eq!(status, LoopStatus::Continue);
/// assert_eq!(out, b"hello world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    prompt: String,
}

impl Interpreter {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self::with_env(Environment::new(), prompt)
    }

    pub fn with_env(env: Environment, prompt: impl Into<String>) -> Self {
        Self {
            env,
            prompt: prompt.into(),
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Runs one already split command: a builtin if the name is in the table,
    /// an external program otherwise.
    pub fn execute(&mut self, args: &[String], out: &mut dyn Write, err: &mut dyn Write) -> LoopStatus {
        let Some(name) = args.first() else {
            return LoopStatus::Continue;
        };

        match Command::resolve(name) {
            Command::Builtin(builtin) => {
                debug!(command = %name, "running builtin");
                (builtin.handler)(args, out, err, &mut self.env)
            }
            Command::External => {
                // Anything still buffered must come out before the child writes.
                if let Err(e) = out.flush() {
                    return report_failure(err, &ShellError::Output(e));
                }
                debug!(command = %name, "launching external command");
                external::launch(args, &self.env, err)
            }
        }
    }

    /// Splits `line` and runs it. A blank line is a no-op.
    ///
    /// Only a fatal error (memory exhaustion) is returned as `Err`.
    pub fn execute_line(
        &mut self,
        line: &str,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<LoopStatus, ShellError> {
        let args = tokenizer::split(line)?;
        Ok(self.execute(&args, out, err))
    }

    /// Reads and runs lines from `source` until `exit` or end of input.
    ///
    /// Command failures, and non-fatal errors from `source`, are reported on
    /// `err` and never end the loop. The returned error is always fatal:
    /// memory exhaustion or a broken input stream.
    pub fn repl<S: LineSource + ?Sized>(
        &mut self,
        source: &mut S,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<(), ShellError> {
        let mut state = LoopState::Prompting;

        loop {
            state = match state {
                LoopState::Prompting => match source.read_line(&self.prompt) {
                    Ok(Some(line)) => LoopState::Tokenizing(line),
                    Ok(None) => {
                        debug!("end of input");
                        LoopState::Terminated
                    }
                    Err(e) if e.is_fatal() => return Err(fatal(e)),
                    Err(e) => {
                        report_failure(err, &e);
                        LoopState::Prompting
                    }
                },
                LoopState::Tokenizing(line) => {
                    let args = tokenizer::split(&line).map_err(fatal)?;
                    if args.is_empty() {
                        LoopState::Prompting
                    } else {
                        LoopState::Dispatching(args)
                    }
                }
                LoopState::Dispatching(args) => {
                    if self.execute(&args, out, err).should_continue() {
                        LoopState::Prompting
                    } else {
                        debug!("exit requested");
                        LoopState::Terminated
                    }
                }
                LoopState::Terminated => {
                    let _ = out.flush();
                    return Ok(());
                }
            };
        }
    }
}

fn fatal(e: ShellError) -> ShellError {
    error!(error = %e, "interpreter stopped");
    e
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT)
    }
}
