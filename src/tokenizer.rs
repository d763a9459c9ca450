//! Splitting of an input line into the argument vector.
//!
//! There is no quoting and no escaping: a token is any maximal run of
//! characters that are not delimiters.

use crate::error::ShellError;
use tracing::trace;

/// Characters that separate tokens. They are never part of a token.
pub const DELIMITERS: [char; 5] = [' ', '\t', '\r', '\n', '\x07'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitState {
    Between,
    InToken,
}

struct SplitFSM<'a> {
    input: std::str::Chars<'a>,
    state: SplitState,
    buffer: String,
    tokens: Vec<String>,
}

impl<'a> SplitFSM<'a> {
    fn new(line: &'a str) -> Self {
        SplitFSM {
            input: line.chars(),
            state: SplitState::Between,
            buffer: String::new(),
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<String>, ShellError> {
        while let Some(ch) = self.input.next() {
            match (self.state, is_delimiter(ch)) {
                (SplitState::Between, true) => {}
                (SplitState::Between, false) => {
                    self.push_char(ch)?;
                    self.state = SplitState::InToken;
                }
                (SplitState::InToken, true) => {
                    self.finish_token()?;
                    self.state = SplitState::Between;
                }
                (SplitState::InToken, false) => self.push_char(ch)?,
            }
        }

        if self.state == SplitState::InToken {
            self.finish_token()?;
        }

        Ok(self.tokens)
    }

    fn push_char(&mut self, ch: char) -> Result<(), ShellError> {
        self.buffer
            .try_reserve(ch.len_utf8())
            .map_err(|_| ShellError::Allocation)?;
        self.buffer.push(ch);
        Ok(())
    }

    fn finish_token(&mut self) -> Result<(), ShellError> {
        self.tokens
            .try_reserve(1)
            .map_err(|_| ShellError::Allocation)?;
        self.tokens.push(std::mem::take(&mut self.buffer));
        Ok(())
    }
}

pub fn is_delimiter(ch: char) -> bool {
    DELIMITERS.contains(&ch)
}

/// Splits `line` into its non-empty tokens, in order.
///
/// Both the token list and every token grow as needed, so arbitrarily long
/// lines are never truncated. Fails only when memory cannot be obtained.
pub fn split(line: &str) -> Result<Vec<String>, ShellError> {
    let tokens = SplitFSM::new(line).run()?;
    trace!(count = tokens.len(), "split line");
    Ok(tokens)
}
