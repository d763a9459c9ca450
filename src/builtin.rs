use crate::command::{Handler, LoopStatus, report_failure};
use crate::env::Environment;
use crate::error::ShellError;
use argh::{EarlyExit, FromArgs};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// An entry of the builtin table.
#[derive(Debug)]
pub struct Builtin {
    pub name: &'static str,
    /// One-line description shown by `help`.
    pub summary: &'static str,
    pub handler: Handler,
}

/// Every command the interpreter runs in its own process.
pub static BUILTINS: &[Builtin] = &[
    Builtin {
        name: Cd::NAME,
        summary: "change the working directory",
        handler: run::<Cd>,
    },
    Builtin {
        name: "exit",
        summary: "leave the interpreter",
        handler: exit,
    },
    Builtin {
        name: Help::NAME,
        summary: "show this summary",
        handler: run::<Help>,
    },
    Builtin {
        name: Pwd::NAME,
        summary: "print the working directory",
        handler: run::<Pwd>,
    },
    Builtin {
        name: "echo",
        summary: "print the arguments separated by spaces",
        handler: echo,
    },
];

/// Exact, case-sensitive lookup in [`BUILTINS`].
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name == name)
}

/// Builtins whose arguments are parsed with [`argh`].
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd".
    const NAME: &'static str;

    fn execute(self, out: &mut dyn Write, env: &mut Environment) -> Result<LoopStatus, ShellError>;
}

/// Parses `args` into `T` and runs it, reporting any failure on `err`.
fn run<T: BuiltinCommand>(
    args: &[String],
    out: &mut dyn Write,
    err: &mut dyn Write,
    env: &mut Environment,
) -> LoopStatus {
    let rest: Vec<&str> = args.iter().skip(1).map(String::as_str).collect();
    let cmd = match T::from_args(&[T::NAME], &rest) {
        Ok(cmd) => cmd,
        Err(EarlyExit { output, status }) => {
            return match status {
                Ok(()) => match writeln!(out, "{}", output.trim_end()) {
                    Ok(()) => LoopStatus::Continue,
                    Err(e) => report_failure(err, &ShellError::Output(e)),
                },
                Err(()) => {
                    let _ = writeln!(err, "{}", output.trim_end());
                    LoopStatus::ContinueAfterError
                }
            };
        }
    };

    match cmd.execute(out, env) {
        Ok(status) => status,
        Err(e) => report_failure(err, &e),
    }
}

/// `exit` takes no options, so anything after it is ignored.
fn exit(
    _args: &[String],
    _out: &mut dyn Write,
    _err: &mut dyn Write,
    _env: &mut Environment,
) -> LoopStatus {
    LoopStatus::ExitRequested
}

#[derive(FromArgs)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    const NAME: &'static str = "cd";

    fn execute(self, _out: &mut dyn Write, env: &mut Environment) -> Result<LoopStatus, ShellError> {
        let target = match self.target {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => {
                return Err(ShellError::MissingArgument {
                    command: Self::NAME.to_string(),
                });
            }
        };

        let new_dir = if target.is_absolute() {
            target.clone()
        } else {
            env.current_dir.join(&target)
        };

        let canonical = fs::canonicalize(&new_dir).map_err(|source| ShellError::DirectoryChange {
            path: target.clone(),
            source,
        })?;

        env::set_current_dir(&canonical)
            .map_err(|source| ShellError::DirectoryChange { path: target, source })?;
        env.current_dir = canonical;
        Ok(LoopStatus::Continue)
    }
}

#[derive(FromArgs)]
/// Show the builtin commands.
pub struct Help {
    #[argh(positional, greedy)]
    /// ignored
    pub _topics: Vec<String>,
}

impl BuiltinCommand for Help {
    const NAME: &'static str = "help";

    fn execute(self, out: &mut dyn Write, _env: &mut Environment) -> Result<LoopStatus, ShellError> {
        write_usage(out).map_err(ShellError::Output)?;
        Ok(LoopStatus::Continue)
    }
}

fn write_usage(out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "lsh: a minimal command interpreter")?;
    writeln!(out, "Type a program name and its arguments, then hit enter.")?;
    writeln!(out, "The following commands are built in:")?;
    for builtin in BUILTINS {
        writeln!(out, "  {:<8}{}", builtin.name, builtin.summary)?;
    }
    writeln!(out, "Anything else is looked up in PATH and run as a separate program.")
}

#[derive(FromArgs)]
/// Print the current working directory to standard output.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    const NAME: &'static str = "pwd";

    fn execute(self, out: &mut dyn Write, env: &mut Environment) -> Result<LoopStatus, ShellError> {
        writeln!(out, "{}", env.current_dir.to_string_lossy()).map_err(ShellError::Output)?;
        Ok(LoopStatus::Continue)
    }
}

/// `echo [-n] words...`. Only a leading `-n` is an option; every other word,
/// dash or not, is printed as given.
fn echo(
    args: &[String],
    out: &mut dyn Write,
    err: &mut dyn Write,
    _env: &mut Environment,
) -> LoopStatus {
    let words = args.get(1..).unwrap_or_default();
    let (no_newline, words) = match words.split_first() {
        Some((first, rest)) if first == "-n" => (true, rest),
        _ => (false, words),
    };

    let s = words.join(" ");
    let written = if no_newline {
        write!(out, "{}", s)
    } else {
        writeln!(out, "{}", s)
    };
    match written {
        Ok(()) => LoopStatus::Continue,
        Err(e) => report_failure(err, &ShellError::Output(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{lock_current_dir, make_unique_temp_dir, test_env};
    use pretty_assertions::assert_eq;
    use std::env as stdenv;

    fn argv(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn call(words: &[&str], env: &mut Environment) -> (LoopStatus, String, String) {
        let builtin = lookup(words[0]).expect("builtin");
        let mut out = Vec::new();
        let mut err = Vec::new();
        let status = (builtin.handler)(&argv(words), &mut out, &mut err, env);
        (
            status,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_lookup_finds_minimum_set() {
        for name in ["cd", "help", "exit"] {
            assert!(lookup(name).is_some(), "{name} missing");
        }
        assert!(lookup("ls").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn test_exit_ignores_arguments() {
        let mut env = test_env();
        assert_eq!(call(&["exit"], &mut env).0, LoopStatus::ExitRequested);
        assert_eq!(call(&["exit", "3"], &mut env).0, LoopStatus::ExitRequested);
        assert_eq!(
            call(&["exit", "--help"], &mut env).0,
            LoopStatus::ExitRequested
        );
    }

    #[test]
    fn test_help_lists_every_builtin() {
        let mut env = test_env();
        let (status, out, err) = call(&["help"], &mut env);

        assert_eq!(status, LoopStatus::Continue);
        assert_eq!(err, "");
        for builtin in BUILTINS {
            assert!(out.contains(builtin.name), "help misses {}", builtin.name);
        }
    }

    #[test]
    fn test_pwd_prints_current_dir() {
        let _lock = lock_current_dir();
        let mut env = test_env();
        let expected = format!("{}\n", env.current_dir.to_string_lossy());

        let (status, out, _) = call(&["pwd"], &mut env);

        assert_eq!(status, LoopStatus::Continue);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_echo_with_and_without_newline() {
        let mut env = test_env();

        let (_, out, _) = call(&["echo", "hello", "world"], &mut env);
        assert_eq!(out, "hello world\n");

        let (_, out, _) = call(&["echo", "-n", "foo", "bar"], &mut env);
        assert_eq!(out, "foo bar");

        let (_, out, _) = call(&["echo"], &mut env);
        assert_eq!(out, "\n");
    }

    #[test]
    fn test_echo_prints_dash_words_verbatim() {
        let mut env = test_env();

        let (status, out, err) = call(&["echo", "-e", "hi"], &mut env);
        assert_eq!(status, LoopStatus::Continue);
        assert_eq!(out, "-e hi\n");
        assert_eq!(err, "");

        let (_, out, _) = call(&["echo", "-5"], &mut env);
        assert_eq!(out, "-5\n");

        let (_, out, _) = call(&["echo", "a", "-n", "--help"], &mut env);
        assert_eq!(out, "a -n --help\n");
    }

    #[test]
    fn test_unknown_option_is_reported_on_err() {
        let mut env = test_env();
        let (status, out, err) = call(&["pwd", "--bogus"], &mut env);

        assert_eq!(status, LoopStatus::ContinueAfterError);
        assert_eq!(out, "");
        assert!(!err.is_empty());
    }

    #[test]
    fn test_cd_without_argument_keeps_directory() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let mut env = test_env();
        let before = env.current_dir.clone();

        let (status, _, err) = call(&["cd"], &mut env);

        assert_eq!(status, LoopStatus::ContinueAfterError);
        assert_eq!(err, "lsh: cd: expected argument\n");
        assert_eq!(stdenv::current_dir().unwrap(), orig);
        assert_eq!(env.current_dir, before);
    }

    #[test]
    fn test_cd_to_absolute_path() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir("cd_abs").expect("failed to create temp dir");
        let canonical_temp = fs::canonicalize(&temp).expect("canonicalize failed");
        let orig = stdenv::current_dir().unwrap();
        let mut env = test_env();

        let (status, _, err) = call(&["cd", &canonical_temp.to_string_lossy()], &mut env);

        assert_eq!(status, LoopStatus::Continue);
        assert_eq!(err, "");
        let new_canonical = fs::canonicalize(stdenv::current_dir().unwrap()).unwrap();
        assert_eq!(new_canonical, canonical_temp);
        assert_eq!(env.current_dir, canonical_temp);

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn test_cd_to_relative_path() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir("cd_rel").expect("failed to create temp dir");
        fs::create_dir_all(temp.join("child")).unwrap();
        let orig = stdenv::current_dir().unwrap();
        let mut env = test_env();
        env.current_dir = fs::canonicalize(&temp).unwrap();

        let (status, _, _) = call(&["cd", "child"], &mut env);

        assert_eq!(status, LoopStatus::Continue);
        assert_eq!(
            env.current_dir,
            fs::canonicalize(temp.join("child")).unwrap()
        );

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn test_cd_nonexistent_path_errors() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let mut env = test_env();
        let name = format!("nonexistent_dir_for_lsh_test_{}", std::process::id());

        let (status, _, err) = call(&["cd", &name], &mut env);

        assert_eq!(status, LoopStatus::ContinueAfterError);
        assert!(err.starts_with(&format!("lsh: cd: {name}: ")), "got {err:?}");
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }

    #[test]
    fn test_cd_into_file_errors() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir("cd_file").expect("failed to create temp dir");
        let file = temp.join("plain");
        fs::write(&file, b"x").unwrap();
        let orig = stdenv::current_dir().unwrap();
        let mut env = test_env();

        let (status, _, _) = call(&["cd", &file.to_string_lossy()], &mut env);

        assert_eq!(status, LoopStatus::ContinueAfterError);
        assert_eq!(stdenv::current_dir().unwrap(), orig);
        let _ = fs::remove_dir_all(&temp);
    }
}
