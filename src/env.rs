use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// The interpreter's view of the process environment.
///
/// - `vars`: variables handed to launched children and used to resolve `PATH`.
/// - `current_dir`: kept in sync with the process working directory by `cd`.
#[derive(Debug, Clone)]
pub struct Environment {
    pub vars: HashMap<String, String>,
    pub current_dir: PathBuf,
}

impl Environment {
    /// Capture the current process state.
    pub fn new() -> Self {
        let vars = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { vars, current_dir }
    }

    /// Looks up `key` in `vars`, falling back to the process environment.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
