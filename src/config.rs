use argh::FromArgs;

pub const DEFAULT_PROMPT: &str = "> ";

/// Filter used when neither `RUST_LOG` nor `--log` says otherwise.
pub const DEFAULT_LOG_FILTER: &str = "off";

#[derive(FromArgs, Debug)]
/// A minimal line-oriented command interpreter.
pub struct Options {
    #[argh(option, default = "DEFAULT_PROMPT.to_string()")]
    /// text printed before every line
    pub prompt: String,

    #[argh(switch)]
    /// read standard input as a plain stream, without line editing
    pub plain: bool,

    #[argh(option, default = "DEFAULT_LOG_FILTER.to_string()")]
    /// tracing filter used when RUST_LOG is unset, e.g. "lsh=debug"
    pub log: String,
}

impl Options {
    /// Line editing only makes sense on a terminal.
    pub fn use_editor(&self, stdin_is_terminal: bool) -> bool {
        stdin_is_terminal && !self.plain
    }
}
