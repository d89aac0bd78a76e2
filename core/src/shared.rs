//! Line-oriented byte reader and lexer helpers shared by the N-Triples
//! engine (component I). N-Triples needs none of the Turtle grammar's
//! multi-character lookahead or arena bookkeeping — one line is one
//! statement — so it gets its own small one-byte-of-lookahead reader over
//! plain `Vec<u8>` buffers instead of [`crate::input::PagedReader`] and
//! [`crate::arena::ScratchStack`].

use crate::error::{Position, SyntaxError, TurtleError};
pub use crate::input::EOF;
use std::io::BufRead;
use turtlo_api::flags::LiteralFlags;
use turtlo_api::model::BlankNode;

/// A byte reader that always has exactly one byte of lookahead buffered in
/// `current`, tracking only the line number (N-Triples statements never
/// span a line, so that's all diagnostics need).
pub struct OneLookAheadLineByteReader<R: BufRead> {
    inner: R,
    current: u8,
    line_number: u64,
    name: String,
}

impl<R: BufRead> OneLookAheadLineByteReader<R> {
    pub fn new(mut inner: R, name: impl Into<String>) -> Result<Self, TurtleError> {
        let current = read_one(&mut inner)?;
        Ok(Self {
            inner,
            current,
            line_number: 1,
            name: name.into(),
        })
    }
}

fn read_one(inner: &mut impl BufRead) -> Result<u8, TurtleError> {
    let mut byte = [0u8; 1];
    Ok(if inner.read(&mut byte)? == 0 { EOF } else { byte[0] })
}

/// The operations the N-Triples lexer needs from a byte source: the
/// current lookahead byte, consuming it, and reporting a located error.
pub trait OneLookAheadLineByteRead {
    fn current(&self) -> u8;
    fn consume(&mut self) -> Result<(), TurtleError>;
    fn line_number(&self) -> u64;
    fn error(&self, message: impl Into<String>) -> TurtleError;

    fn check_is_current(&self, expected: u8) -> Result<(), TurtleError> {
        if self.current() == expected {
            Ok(())
        } else {
            Err(self.error(format!(
                "expected `{}', found `{}'",
                display_byte(expected),
                display_byte(self.current())
            )))
        }
    }

    fn unexpected_char_error<T>(&self) -> Result<T, TurtleError> {
        Err(self.error(format!("unexpected character `{}'", display_byte(self.current()))))
    }
}

impl<R: BufRead> OneLookAheadLineByteRead for OneLookAheadLineByteReader<R> {
    fn current(&self) -> u8 {
        self.current
    }

    fn consume(&mut self) -> Result<(), TurtleError> {
        if self.current == b'\n' {
            self.line_number += 1;
        }
        self.current = read_one(&mut self.inner)?;
        Ok(())
    }

    fn line_number(&self) -> u64 {
        self.line_number
    }

    fn error(&self, message: impl Into<String>) -> TurtleError {
        TurtleError::Syntax(SyntaxError {
            name: self.name.clone(),
            position: Position {
                line: self.line_number,
                column: 0,
            },
            message: message.into(),
        })
    }
}

fn display_byte(c: u8) -> String {
    if c == EOF {
        "<EOF>".to_string()
    } else {
        (c as char).to_string()
    }
}

/// Decodes `\uXXXX`/`\UXXXXXXXX` and the simple single-character escapes
/// into UTF-8 bytes appended to `buffer`. Called with the lookahead
/// already past the `\`.
fn push_escape(
    read: &mut impl OneLookAheadLineByteRead,
    buffer: &mut Vec<u8>,
    flags: &mut LiteralFlags,
) -> Result<(), TurtleError> {
    let c = read.current();
    match c {
        b't' => {
            buffer.push(b'\t');
            read.consume()
        }
        b'n' => {
            buffer.push(b'\n');
            flags.insert(LiteralFlags::HAS_NEWLINE);
            read.consume()
        }
        b'r' => {
            buffer.push(b'\r');
            flags.insert(LiteralFlags::HAS_NEWLINE);
            read.consume()
        }
        b'"' => {
            buffer.push(b'"');
            flags.insert(LiteralFlags::HAS_QUOTE);
            read.consume()
        }
        b'\'' => {
            buffer.push(b'\'');
            read.consume()
        }
        b'\\' => {
            buffer.push(b'\\');
            read.consume()
        }
        b'u' => {
            read.consume()?;
            push_hex_escape(read, buffer, 4)
        }
        b'U' => {
            read.consume()?;
            push_hex_escape(read, buffer, 8)
        }
        _ => read.unexpected_char_error(),
    }
}

fn push_hex_escape(
    read: &mut impl OneLookAheadLineByteRead,
    buffer: &mut Vec<u8>,
    digits: u32,
) -> Result<(), TurtleError> {
    let mut value: u32 = 0;
    for _ in 0..digits {
        let c = read.current();
        let digit = (c as char)
            .to_digit(16)
            .ok_or_else(|| read.error(format!("illegal hexadecimal digit `{}'", c as char)))?;
        value = value * 16 + digit;
        read.consume()?;
    }
    let ch = char::from_u32(value).ok_or_else(|| read.error(format!("invalid codepoint U+{:X}", value)))?;
    let mut utf8 = [0u8; 4];
    buffer.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
    Ok(())
}

/// `'"' scharacter* '"'`.
pub fn parse_string_literal_quote(
    read: &mut impl OneLookAheadLineByteRead,
    buffer: &mut Vec<u8>,
) -> Result<LiteralFlags, TurtleError> {
    let mut flags = LiteralFlags::NONE;
    read.check_is_current(b'"')?;
    read.consume()?;
    loop {
        match read.current() {
            b'"' => {
                read.consume()?;
                return Ok(flags);
            }
            b'\\' => {
                read.consume()?;
                push_escape(read, buffer, &mut flags)?;
            }
            EOF | b'\n' | b'\r' => return read.unexpected_char_error(),
            c => {
                buffer.push(c);
                read.consume()?;
            }
        }
    }
}

/// `'<' ucharacter* '>'`.
pub fn parse_iriref_absolute(
    read: &mut impl OneLookAheadLineByteRead,
    buffer: &mut Vec<u8>,
) -> Result<(), TurtleError> {
    read.check_is_current(b'<')?;
    read.consume()?;
    loop {
        match read.current() {
            b'>' => {
                read.consume()?;
                return Ok(());
            }
            b'\\' => {
                read.consume()?;
                push_escape(read, buffer)?;
            }
            EOF | b'\n' | b'\r' | b' ' | b'<' => return read.unexpected_char_error(),
            c => {
                buffer.push(c);
                read.consume()?;
            }
        }
    }
}

/// `'@' [a-z]+ ('-' [a-z0-9]+)*`.
pub fn parse_langtag(
    read: &mut impl OneLookAheadLineByteRead,
    buffer: &mut Vec<u8>,
) -> Result<(), TurtleError> {
    read.check_is_current(b'@')?;
    read.consume()?;
    if !(b'a'..=b'z').contains(&read.current()) {
        return read.unexpected_char_error();
    }
    while (b'a'..=b'z').contains(&read.current()) {
        buffer.push(read.current());
        read.consume()?;
    }
    while read.current() == b'-' {
        buffer.push(read.current());
        read.consume()?;
        if !((b'a'..=b'z').contains(&read.current()) || read.current().is_ascii_digit()) {
            return read.unexpected_char_error();
        }
        while (b'a'..=b'z').contains(&read.current()) || read.current().is_ascii_digit() {
            buffer.push(read.current());
            read.consume()?;
        }
    }
    Ok(())
}

/// `'_:' PN_LOCAL`, kept permissive about which characters make up the
/// label (full `PN_CHARS` Unicode classes are out of scope, see
/// `read_name_char`'s equivalent TODO in the Turtle engine).
pub fn parse_blank_node_label<'a>(
    read: &mut impl OneLookAheadLineByteRead,
    buffer: &'a mut Vec<u8>,
) -> Result<BlankNode<'a>, TurtleError> {
    read.check_is_current(b'_')?;
    read.consume()?;
    read.check_is_current(b':')?;
    read.consume()?;
    if !(read.current().is_ascii_alphanumeric() || read.current() == b'_') {
        return read.unexpected_char_error();
    }
    while read.current().is_ascii_alphanumeric() || matches!(read.current(), b'_' | b'-' | b'.') {
        buffer.push(read.current());
        read.consume()?;
    }
    while buffer.last() == Some(&b'.') {
        buffer.pop();
    }
    Ok(BlankNode {
        id: to_str(read, buffer)?,
    })
}

/// Validates `buffer` as UTF-8 and borrows it, stamping a parse error
/// (located at the reader's current position) if it somehow isn't.
pub fn to_str<'a>(
    read: &impl OneLookAheadLineByteRead,
    buffer: &'a [u8],
) -> Result<&'a str, TurtleError> {
    std::str::from_utf8(buffer).map_err(|_| read.error("invalid UTF-8 in lexical form"))
}
