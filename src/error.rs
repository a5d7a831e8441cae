use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A malformed line in a level description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-based line number, counting section headers and blank lines.
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Failure to turn a level file into a [`crate::Level`].
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid level {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// A `play` call the engine refused. Nothing changes when this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlayError {
    #[error("the game is finished")]
    Finished,
    #[error("invalid move ({dx}, {dy}): expected a single horizontal or vertical step")]
    InvalidMove { dx: i32, dy: i32 },
}
