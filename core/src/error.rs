//! Cursor tracking and diagnostics (component E), and the crate's error
//! type (spec's `BAD_ARG` / `BAD_SYNTAX` / `UNKNOWN` kinds).

use std::fmt;

/// A position in a source document: one-based line and column, matching
/// the cursor the original reader threads through every byte it eats.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct Position {
    pub line: u64,
    pub column: u64,
}

impl Position {
    pub const START: Self = Self { line: 1, column: 1 };

    fn advance(&mut self, byte: u8) {
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A cursor tracking the current position within a named source, used by
/// every byte-eating production to stamp errors and (for Turtle) advance
/// line/column as it consumes the input buffer.
#[derive(Debug, Clone)]
pub struct Cursor {
    pub name: String,
    pub pos: Position,
}

impl Cursor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pos: Position::START,
        }
    }

    pub fn advance(&mut self, byte: u8) {
        self.pos.advance(byte);
    }
}

/// A syntax error located at a single position, formatted the same way the
/// original reader's `error()` helper prints to stderr:
/// `error: <name>:<line>:<column>: <message>`.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    pub name: String,
    pub position: Position,
    pub message: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error: {}:{}: {}",
            self.name, self.position, self.message
        )
    }
}

impl std::error::Error for SyntaxError {}

/// A URI that cannot be interpreted as a `file:` path, returned by
/// `crate::uri::Uri::to_path` (realises spec's `BAD_ARG`).
#[derive(Debug, Clone)]
pub struct NotAFileUri(pub String);

impl fmt::Display for NotAFileUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}' is not a file: URI", self.0)
    }
}

impl std::error::Error for NotAFileUri {}

/// Top-level error type for every fallible operation in this crate.
#[derive(thiserror::Error, Debug)]
pub enum TurtleError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    NotAFileUri(#[from] NotAFileUri),

    /// A sink returned `false`, requesting that parsing stop early.
    #[error("parsing cancelled by sink at {0}")]
    Cancelled(Position),
}

pub type Result<T> = std::result::Result<T, TurtleError>;
