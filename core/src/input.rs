//! Buffered input (component D): a byte-at-a-time cursor over a `Read`
//! source with a few bytes of look-ahead, refilled in 4 KiB pages.
//!
//! The original reader slides a fixed two-page C buffer and recovers
//! look-ahead across a page boundary by copying the not-yet-consumed
//! prefix to a negative offset before refilling. A `Vec<u8>` with an
//! advancing read index and periodic compaction gets the same amortised
//! cost without the pointer arithmetic, since Rust has no use for the
//! fixed-size buffer beyond avoiding an allocation per page.

use crate::error::{Cursor, SyntaxError, TurtleError};
use std::io::Read;

const PAGE_SIZE: usize = 4096;

pub const EOF: u8 = 0;

/// A paged, peekable byte source tracking line/column as it eats bytes.
pub struct PagedReader<R: Read> {
    source: R,
    buf: Vec<u8>,
    pos: usize,
    eof: bool,
    cursor: Cursor,
}

impl<R: Read> PagedReader<R> {
    pub fn new(source: R, name: impl Into<String>) -> Result<Self, TurtleError> {
        let mut reader = Self {
            source,
            buf: Vec::with_capacity(PAGE_SIZE),
            pos: 0,
            eof: false,
            cursor: Cursor::new(name),
        };
        reader.fill(1)?;
        Ok(reader)
    }

    /// Ensures at least `n` bytes are buffered from the current read
    /// position (short of end-of-stream), paging in more as needed.
    fn fill(&mut self, n: usize) -> Result<(), TurtleError> {
        if self.pos > PAGE_SIZE {
            self.buf.drain(0..self.pos);
            self.pos = 0;
        }
        while !self.eof && self.buf.len() - self.pos < n {
            let mut page = [0u8; PAGE_SIZE];
            let read = self.source.read(&mut page)?;
            if read == 0 {
                self.eof = true;
            } else {
                self.buf.extend_from_slice(&page[..read]);
            }
        }
        Ok(())
    }

    /// Current byte without consuming it, or [`EOF`] at end of stream.
    pub fn current(&self) -> u8 {
        self.buf.get(self.pos).copied().unwrap_or(EOF)
    }

    /// Peeks `n` bytes starting at the current position without consuming
    /// any of them, padding with [`EOF`] past the end of the stream.
    pub fn peek(&mut self, n: usize) -> Result<[u8; 6], TurtleError> {
        debug_assert!(n <= 6);
        self.fill(n)?;
        let mut out = [EOF; 6];
        for (i, slot) in out.iter_mut().take(n).enumerate() {
            *slot = self.buf.get(self.pos + i).copied().unwrap_or(EOF);
        }
        Ok(out)
    }

    pub fn is_eof(&self) -> bool {
        self.eof && self.pos >= self.buf.len()
    }

    /// Consumes and returns the current byte, advancing line/column.
    pub fn eat(&mut self) -> Result<u8, TurtleError> {
        let c = self.current();
        if c != EOF {
            self.pos += 1;
            self.cursor.advance(c);
            self.fill(1)?;
        }
        Ok(c)
    }

    /// Consumes the current byte, failing with a syntax error if it isn't
    /// exactly `expected`.
    pub fn eat_expect(&mut self, expected: u8) -> Result<u8, TurtleError> {
        let c = self.current();
        let eaten = self.eat()?;
        if c != expected {
            return Err(self.error(format!(
                "expected `{}', not `{}'",
                expected as char,
                display_byte(c)
            )));
        }
        Ok(eaten)
    }

    pub fn eat_str(&mut self, s: &str) -> Result<(), TurtleError> {
        for b in s.bytes() {
            self.eat_expect(b)?;
        }
        Ok(())
    }

    pub fn position(&self) -> crate::error::Position {
        self.cursor.pos
    }

    pub fn error(&self, message: impl Into<String>) -> TurtleError {
        TurtleError::Syntax(SyntaxError {
            name: self.cursor.name.clone(),
            position: self.cursor.pos,
            message: message.into(),
        })
    }

    pub fn unexpected(&self) -> TurtleError {
        let c = self.current();
        self.error(format!("unexpected character `{}'", display_byte(c)))
    }
}

fn display_byte(c: u8) -> String {
    if c == EOF {
        "<EOF>".to_string()
    } else {
        (c as char).to_string()
    }
}
