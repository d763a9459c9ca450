//! A minimal line-oriented command interpreter.
//!
//! Every input line is split on whitespace into an argument vector. The first
//! word names either a builtin (`cd`, `help`, `exit`, `pwd`, `echo`), which runs
//! inside the interpreter, or an external program, which is spawned and waited
//! for. There are no pipes, redirections, quoting or variables.
//!
//! The main entry point is [`Interpreter`]; input arrives through a
//! [`LineSource`](io_adapters::LineSource).

mod builtin;
mod command;
pub mod config;
pub mod env;
mod error;
mod external;
mod interpreter;
pub mod io_adapters;
mod tokenizer;

#[cfg(test)]
mod test_support;

pub use builtin::{BUILTINS, Builtin, lookup};
pub use command::{Command, Handler, LoopStatus};
pub use error::ShellError;
pub use external::{find_command_path, launch};
pub use interpreter::Interpreter;
pub use tokenizer::split;
