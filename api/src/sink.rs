//! The event sink a parser drives, and the step-driven parser trait itself.

use crate::flags::StatementFlags;
use crate::model::{BlankNode, NamedNode, Triple};

/// Receives the events a reader produces while walking a document.
///
/// Every method returns `bool`; returning `false` cancels parsing (the
/// reader surfaces this as `ParseError::Cancelled` from the step that
/// produced it, the same as a syntax error for unwind purposes).
///
/// Borrowed fields of the event arguments are valid only for the duration
/// of the call: they point into the reader's internal scratch stack, which
/// is free to reuse that memory as soon as the call returns.
pub trait RdfSink {
    /// `@base <uri>` (Turtle only).
    fn base_uri(&mut self, _uri: NamedNode<'_>) -> bool {
        true
    }

    /// `@prefix name: <uri>` (Turtle only).
    fn prefix(&mut self, _name: &str, _uri: NamedNode<'_>) -> bool {
        true
    }

    /// A parsed triple, with flags describing the shorthand it was read
    /// from (see [`StatementFlags`]).
    fn statement(&mut self, triple: Triple<'_>, flags: StatementFlags) -> bool;

    /// The closing `]` of an anonymous node that was previously opened with
    /// `ANON_S_BEGIN`/`ANON_O_BEGIN` and had at least one statement emitted
    /// for it.
    fn end_anon(&mut self, _node: BlankNode<'_>) -> bool {
        true
    }
}

/// A streaming triple parser advanced one step at a time.
///
/// Mirrors the step-driven shape used by the parsers this crate's data
/// model was modelled on: a caller repeatedly calls `parse_step` until
/// `is_end` reports the source is exhausted, each step doing the work of at
/// most one statement's worth of parsing.
pub trait TripleParser {
    type Error;

    /// Parses at most one statement, invoking `sink` for every event it
    /// produces along the way (there may be more than one event per
    /// statement, e.g. a nested anonymous node's own triples).
    fn parse_step(&mut self, sink: &mut impl RdfSink) -> Result<(), Self::Error>;

    /// True once the underlying source is exhausted and no further call to
    /// `parse_step` would make progress.
    fn is_end(&self) -> bool;

    /// Drives `parse_step` until `is_end`.
    fn parse_all(&mut self, sink: &mut impl RdfSink) -> Result<(), Self::Error> {
        while !self.is_end() {
            self.parse_step(sink)?;
        }
        Ok(())
    }
}
