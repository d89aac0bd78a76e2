//! Serialisation (ambient, SPEC_FULL.md component J): an N-Triples writer
//! (one line per triple, no abbreviation) and a Turtle writer that groups
//! consecutive triples sharing a subject (then predicate) with `;`/`,`
//! rather than repeating it — the same "does this triple share the
//! previous one's subject" comparison `AbbrevRdfXmlFormatter::format`
//! makes to decide whether to open a new `rdf:Description`, just driving
//! plain-text punctuation instead of XML events.
//!
//! Both writers expect already-resolved triples (no [`Curie`](turtlo_api::model::Curie)
//! subjects/objects and no relative IRIs) — run a parser's output through
//! [`crate::env::Resolving`] first.

use std::io::{self, Write};
use turtlo_api::model::Triple;

/// Writes one triple per line, the simplest possible serialisation and the
/// only one that needs no abbreviation state at all.
pub struct NTriplesWriter<W: Write> {
    write: W,
}

impl<W: Write> NTriplesWriter<W> {
    pub fn new(write: W) -> Self {
        Self { write }
    }

    pub fn write_triple(&mut self, triple: &Triple<'_>) -> io::Result<()> {
        writeln!(self.write, "{}", triple)
    }

    pub fn finish(self) -> W {
        self.write
    }
}

/// Writes Turtle, abbreviating a run of triples that share a subject with
/// `;` and a run that further shares a predicate with `,`, same as Turtle's
/// own `predicateObjectList`/`objectList` productions allow on the way in.
pub struct TurtleWriter<W: Write> {
    write: W,
    current_subject: Option<String>,
    current_predicate: Option<String>,
}

impl<W: Write> TurtleWriter<W> {
    pub fn new(write: W) -> Self {
        Self {
            write,
            current_subject: None,
            current_predicate: None,
        }
    }

    pub fn write_base(&mut self, iri: &str) -> io::Result<()> {
        self.end_statement()?;
        writeln!(self.write, "@base <{}> .", iri)
    }

    pub fn write_prefix(&mut self, name: &str, iri: &str) -> io::Result<()> {
        self.end_statement()?;
        writeln!(self.write, "@prefix {}: <{}> .", name, iri)
    }

    pub fn write_triple(&mut self, triple: &Triple<'_>) -> io::Result<()> {
        let subject = triple.subject.to_string();
        let predicate = triple.predicate.to_string();

        if self.current_subject.as_deref() == Some(subject.as_str()) {
            if self.current_predicate.as_deref() == Some(predicate.as_str()) {
                write!(self.write, " , {}", triple.object)?;
            } else {
                write!(self.write, " ;\n    {} {}", predicate, triple.object)?;
            }
        } else {
            self.end_statement()?;
            write!(self.write, "{} {} {}", subject, predicate, triple.object)?;
        }

        self.current_subject = Some(subject);
        self.current_predicate = Some(predicate);
        Ok(())
    }

    /// Closes the in-progress statement with `.` if one is open, resetting
    /// the abbreviation state so the next triple starts a fresh line.
    fn end_statement(&mut self) -> io::Result<()> {
        if self.current_subject.take().is_some() {
            writeln!(self.write, " .")?;
        }
        self.current_predicate = None;
        Ok(())
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.end_statement()?;
        Ok(self.write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turtlo_api::flags::LiteralFlags;
    use turtlo_api::model::{BlankNode, Literal, NamedNode, NamedOrBlankNode, Term};

    fn triple<'a>(s: &'a str, p: &'a str, o: &'a str) -> Triple<'a> {
        Triple {
            subject: NamedOrBlankNode::NamedNode(NamedNode { iri: s }),
            predicate: NamedNode { iri: p },
            object: Term::NamedNode(NamedNode { iri: o }),
        }
    }

    #[test]
    fn ntriples_one_line_per_triple() {
        let mut w = NTriplesWriter::new(Vec::new());
        w.write_triple(&triple("http://e/s", "http://e/p", "http://e/o")).unwrap();
        let out = String::from_utf8(w.finish()).unwrap();
        assert_eq!(out, "<http://e/s> <http://e/p> <http://e/o> .\n");
    }

    #[test]
    fn turtle_groups_shared_subject_and_predicate() {
        let mut w = TurtleWriter::new(Vec::new());
        w.write_triple(&triple("http://e/s", "http://e/p", "http://e/o1")).unwrap();
        w.write_triple(&triple("http://e/s", "http://e/p", "http://e/o2")).unwrap();
        w.write_triple(&Triple {
            subject: NamedOrBlankNode::NamedNode(NamedNode { iri: "http://e/s" }),
            predicate: NamedNode { iri: "http://e/q" },
            object: Term::Literal(Literal::Simple { value: "v", flags: LiteralFlags::NONE }),
        })
        .unwrap();
        let out = String::from_utf8(w.finish().unwrap()).unwrap();
        assert_eq!(
            out,
            "<http://e/s> <http://e/p> <http://e/o1> , <http://e/o2> ;\n    <http://e/q> \"v\" .\n"
        );
    }

    #[test]
    fn turtle_starts_new_line_on_new_subject() {
        let mut w = TurtleWriter::new(Vec::new());
        w.write_triple(&triple("http://e/a", "http://e/p", "http://e/o")).unwrap();
        w.write_triple(&triple("http://e/b", "http://e/p", "http://e/o")).unwrap();
        let out = String::from_utf8(w.finish().unwrap()).unwrap();
        assert_eq!(
            out,
            "<http://e/a> <http://e/p> <http://e/o> .\n<http://e/b> <http://e/p> <http://e/o> .\n"
        );
    }

    #[test]
    fn turtle_emits_blank_node_subject() {
        let mut w = TurtleWriter::new(Vec::new());
        w.write_triple(&Triple {
            subject: NamedOrBlankNode::BlankNode(BlankNode { id: "b0" }),
            predicate: NamedNode { iri: "http://e/p" },
            object: Term::NamedNode(NamedNode { iri: "http://e/o" }),
        })
        .unwrap();
        let out = String::from_utf8(w.finish().unwrap()).unwrap();
        assert_eq!(out, "_:b0 <http://e/p> <http://e/o> .\n");
    }
}
