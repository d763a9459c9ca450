use crate::command::{LoopStatus, report_failure};
use crate::env::Environment;
use crate::error::ShellError;
use std::borrow::Cow;
use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::{Component, Path};
use std::process::{self, ExitStatus};
use tracing::debug;

/// Runs `args[0]` as a separate program and waits for it to terminate.
///
/// The child inherits the standard streams, the variables of `env` and its
/// current directory. Its exit code is logged but never becomes the loop's
/// status: once the child is gone the loop continues. Failures to find or
/// start the program are reported on `err`.
pub fn launch(args: &[String], env: &Environment, err: &mut dyn Write) -> LoopStatus {
    let Some((name, rest)) = args.split_first() else {
        return LoopStatus::Continue;
    };

    match spawn_and_wait(name, rest, env) {
        Ok(status) => {
            debug!(command = %name, disposition = exit_disposition(status), "child terminated");
            LoopStatus::Continue
        }
        Err(e) => report_failure(err, &e),
    }
}

fn spawn_and_wait(name: &str, args: &[String], env: &Environment) -> Result<ExitStatus, ShellError> {
    let search_paths = env.get_var("PATH").unwrap_or_default();
    let executable = find_command_path(OsStr::new(&search_paths), Path::new(name))
        .ok_or_else(|| ShellError::command_not_found(name))?;
    debug!(command = %name, path = %executable.display(), "spawning");

    let mut child = process::Command::new(&*executable)
        .args(args)
        .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(&env.current_dir)
        .spawn()
        .map_err(|source| classify_spawn_error(name, source))?;

    // Retries on EINTR and ignores stop signals, so this returns only once the
    // child is reaped.
    child.wait().map_err(|e| ShellError::Execution {
        command: name.to_string(),
        reason: format!("wait failed: {e}"),
    })
}

/// "Exec format error" on Linux and the BSDs.
const ENOEXEC: i32 = 8;

/// Problems with the program itself are execution errors; anything else
/// means the OS could not create a process.
fn classify_spawn_error(name: &str, source: io::Error) -> ShellError {
    let bad_program = matches!(
        source.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
    ) || (cfg!(unix) && source.raw_os_error() == Some(ENOEXEC));

    if bad_program {
        ShellError::Execution {
            command: name.to_string(),
            reason: source.to_string(),
        }
    } else {
        ShellError::Spawn {
            command: name.to_string(),
            source,
        }
    }
}

/// Exit code of the child, or `128 + signal` when a signal killed it.
fn exit_disposition(exit_status: ExitStatus) -> i32 {
    if let Some(code) = exit_status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = exit_status.signal() {
            return 128 + signal;
        }
    }
    -1
}

/// Maps a command name to the file to run.
///
/// A bare name is looked up in each directory of `search_paths` in order,
/// skipping entries that are not runnable files. Anything with a directory
/// part (`/bin/ls`, `./tool`, `bin/tool`) is taken as given and only has to
/// exist; whether it can run is left to the OS.
pub fn find_command_path<'a>(search_paths: &OsStr, name: &'a Path) -> Option<Cow<'a, Path>> {
    let mut components = name.components();
    match (components.next(), components.next()) {
        (None, _) => None,
        (Some(Component::Normal(bare)), None) => std::env::split_paths(search_paths)
            .map(|dir| dir.join(bare))
            .find(|candidate| is_runnable(candidate))
            .map(Cow::Owned),
        _ => name.exists().then_some(Cow::Borrowed(name)),
    }
}

#[cfg(unix)]
fn is_runnable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_runnable(path: &Path) -> bool {
    path.is_file()
}
