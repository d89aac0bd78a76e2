//! The [N-Triples](https://www.w3.org/TR/n-triples/) line grammar
//! (component I): one statement per line, so the lexer needs only a single
//! byte of lookahead and no arena — every term's bytes live in one of four
//! reusable `Vec<u8>` buffers, cleared after each line is emitted.

use crate::error::TurtleError;
use crate::shared::{
    parse_blank_node_label, parse_iriref_absolute, parse_langtag, parse_string_literal_quote,
    to_str, OneLookAheadLineByteRead, OneLookAheadLineByteReader, EOF,
};
use std::io::BufRead;
use turtlo_api::flags::StatementFlags;
use turtlo_api::model::{Literal, NamedNode, NamedOrBlankNode, Term, Triple};
use turtlo_api::sink::{RdfSink, TripleParser};

/// A streaming N-Triples parser.
///
/// Memory consumption is linear in the length of the longest line in the
/// document: the four buffers grow to fit the widest term they've seen and
/// are reused (not reallocated) for every subsequent line.
pub struct NTriplesParser<R: BufRead> {
    read: OneLookAheadLineByteReader<R>,
    subject_buf: Vec<u8>,
    predicate_buf: Vec<u8>,
    object_buf: Vec<u8>,
    object_annotation_buf: Vec<u8>,
}

impl<R: BufRead> NTriplesParser<R> {
    pub fn new(reader: R, name: impl Into<String>) -> Result<Self, TurtleError> {
        Ok(Self {
            read: OneLookAheadLineByteReader::new(reader, name)?,
            subject_buf: Vec::default(),
            predicate_buf: Vec::default(),
            object_buf: Vec::default(),
            object_annotation_buf: Vec::default(),
        })
    }
}

impl<R: BufRead> TripleParser for NTriplesParser<R> {
    type Error = TurtleError;

    fn parse_step(&mut self, sink: &mut impl RdfSink) -> Result<(), TurtleError> {
        if let Some(triple) = parse_line(
            &mut self.read,
            &mut self.subject_buf,
            &mut self.predicate_buf,
            &mut self.object_buf,
            &mut self.object_annotation_buf,
        )? {
            let cancelled = !sink.statement(triple, StatementFlags::NONE);
            self.subject_buf.clear();
            self.predicate_buf.clear();
            self.object_buf.clear();
            self.object_annotation_buf.clear();
            if cancelled {
                return Err(TurtleError::Cancelled(crate::error::Position {
                    line: self.read.line_number(),
                    column: 0,
                }));
            }
        }
        Ok(())
    }

    fn is_end(&self) -> bool {
        self.read.current() == EOF
    }
}

fn parse_line<'a>(
    read: &mut impl OneLookAheadLineByteRead,
    subject_buf: &'a mut Vec<u8>,
    predicate_buf: &'a mut Vec<u8>,
    object_buf: &'a mut Vec<u8>,
    object_annotation_buf: &'a mut Vec<u8>,
) -> Result<Option<Triple<'a>>, TurtleError> {
    skip_whitespace(read)?;

    let subject = match read.current() {
        EOF | b'#' | b'\r' | b'\n' => {
            skip_until_eol(read)?;
            return Ok(None);
        }
        _ => parse_named_or_blank_node(read, subject_buf)?,
    };

    skip_whitespace(read)?;
    let predicate = parse_iriref(read, predicate_buf)?;
    skip_whitespace(read)?;
    let object = parse_term(read, object_buf, object_annotation_buf)?;

    skip_whitespace(read)?;
    read.check_is_current(b'.')?;
    read.consume()?;

    skip_whitespace(read)?;
    match read.current() {
        EOF | b'#' | b'\r' | b'\n' => skip_until_eol(read)?,
        _ => return read.unexpected_char_error(),
    }

    Ok(Some(Triple {
        subject,
        predicate,
        object,
    }))
}

fn parse_term<'a>(
    read: &mut impl OneLookAheadLineByteRead,
    buffer: &'a mut Vec<u8>,
    annotation_buffer: &'a mut Vec<u8>,
) -> Result<Term<'a>, TurtleError> {
    match read.current() {
        b'<' => Ok(parse_iriref(read, buffer)?.into()),
        b'_' => Ok(parse_blank_node_label(read, buffer)?.into()),
        b'"' => Ok(parse_literal(read, buffer, annotation_buffer)?.into()),
        _ => read.unexpected_char_error(),
    }
}

fn parse_named_or_blank_node<'a>(
    read: &mut impl OneLookAheadLineByteRead,
    buffer: &'a mut Vec<u8>,
) -> Result<NamedOrBlankNode<'a>, TurtleError> {
    match read.current() {
        b'<' => Ok(parse_iriref(read, buffer)?.into()),
        b'_' => Ok(parse_blank_node_label(read, buffer)?.into()),
        _ => read.unexpected_char_error(),
    }
}

fn parse_literal<'a>(
    read: &mut impl OneLookAheadLineByteRead,
    buffer: &'a mut Vec<u8>,
    annotation_buffer: &'a mut Vec<u8>,
) -> Result<Literal<'a>, TurtleError> {
    let flags = parse_string_literal_quote(read, buffer)?;
    skip_whitespace(read)?;

    match read.current() {
        b'@' => {
            parse_langtag(read, annotation_buffer)?;
            Ok(Literal::LanguageTaggedString {
                value: to_str(read, buffer)?,
                language: to_str(read, annotation_buffer)?,
                flags,
            })
        }
        b'^' => {
            read.consume()?;
            read.check_is_current(b'^')?;
            read.consume()?;
            skip_whitespace(read)?;
            Ok(Literal::Typed {
                value: to_str(read, buffer)?,
                datatype: parse_iriref(read, annotation_buffer)?,
                flags,
            })
        }
        _ => Ok(Literal::Simple {
            value: to_str(read, buffer)?,
            flags,
        }),
    }
}

fn skip_whitespace(read: &mut impl OneLookAheadLineByteRead) -> Result<(), TurtleError> {
    loop {
        match read.current() {
            b' ' | b'\t' => read.consume()?,
            _ => return Ok(()),
        }
    }
}

fn skip_until_eol(read: &mut impl OneLookAheadLineByteRead) -> Result<(), TurtleError> {
    loop {
        match read.current() {
            EOF => return Ok(()),
            b'\n' => {
                read.consume()?;
                return Ok(());
            }
            _ => (),
        }
        read.consume()?;
    }
}

fn parse_iriref<'a>(
    read: &mut impl OneLookAheadLineByteRead,
    buffer: &'a mut Vec<u8>,
) -> Result<NamedNode<'a>, TurtleError> {
    parse_iriref_absolute(read, buffer)?;
    Ok(NamedNode {
        iri: to_str(read, buffer)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Collector {
        statements: RefCell<Vec<String>>,
    }

    impl RdfSink for Collector {
        fn statement(&mut self, triple: Triple<'_>, _flags: StatementFlags) -> bool {
            self.statements.borrow_mut().push(triple.to_string());
            true
        }
    }

    fn parse(src: &str) -> Vec<String> {
        let mut parser = NTriplesParser::new(src.as_bytes(), "(test)").unwrap();
        let mut sink = Collector::default();
        parser.parse_all(&mut sink).unwrap();
        sink.statements.into_inner()
    }

    #[test]
    fn basic_triple() {
        let lines = parse("<http://example.org/s> <http://example.org/p> <http://example.org/o> .\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0],
            "<http://example.org/s> <http://example.org/p> <http://example.org/o> ."
        );
    }

    #[test]
    fn blank_nodes_and_comments() {
        let lines = parse("# a comment\n_:a <http://example.org/p> _:b .\n\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], "_:a <http://example.org/p> _:b .");
    }

    #[test]
    fn literal_with_language_and_datatype() {
        let lines = parse(
            "<http://example.org/s> <http://example.org/p> \"chat\"@en .\n\
             <http://example.org/s> <http://example.org/q> \"1\"^^<http://www.w3.org/2001/XMLSchema#int> .\n",
        );
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "<http://example.org/s> <http://example.org/p> \"chat\"@en .");
        assert_eq!(
            lines[1],
            "<http://example.org/s> <http://example.org/q> \"1\"^^<http://www.w3.org/2001/XMLSchema#int> ."
        );
    }

    #[test]
    fn unicode_escape_in_literal() {
        let lines = parse("<http://example.org/s> <http://example.org/p> \"caf\\u00E9\" .\n");
        assert_eq!(lines[0], "<http://example.org/s> <http://example.org/p> \"caf\u{e9}\" .");
    }
}
