use crate::error::ShellError;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{BufRead, Write};
use tracing::warn;

/// Where input lines come from.
///
/// A source emits the prompt itself: a line editor has to draw it, a plain
/// stream just writes it out before blocking.
pub trait LineSource {
    /// Shows `prompt` and blocks for the next line, without its terminator.
    ///
    /// Returns `Ok(None)` once the input is exhausted.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ShellError>;
}

/// Reads lines from any buffered stream: redirected stdin, files, test input.
pub struct StreamSource<R, W> {
    input: R,
    prompt_out: W,
    buf: Vec<u8>,
}

impl<R: BufRead, W: Write> StreamSource<R, W> {
    pub fn new(input: R, prompt_out: W) -> Self {
        Self {
            input,
            prompt_out,
            buf: Vec::new(),
        }
    }

    /// The writer prompts go to.
    pub fn prompt_output(&self) -> &W {
        &self.prompt_out
    }
}

impl<R: BufRead, W: Write> LineSource for StreamSource<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ShellError> {
        // A prompt nobody can see does not stop the commands from running.
        if let Err(error) = self
            .prompt_out
            .write_all(prompt.as_bytes())
            .and_then(|()| self.prompt_out.flush())
        {
            warn!(%error, "failed to write prompt");
        }

        self.buf.clear();
        let read = self
            .input
            .read_until(b'\n', &mut self.buf)
            .map_err(ShellError::Input)?;
        if read == 0 {
            return Ok(None);
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

/// Interactive terminal input with line editing and in-memory history.
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    pub fn new() -> Result<Self, ShellError> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ShellError> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Some(line))
            }
            // Ctrl-C drops the half-typed line.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
