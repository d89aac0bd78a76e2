//! Data model for RDF terms produced by a `turtlo-core` parser.
//!
//! Shapes follow `rio_api::model`, with one addition: a [`Curie`] variant for
//! prefixed names whose namespace has not been resolved against a prefix
//! table. The reader never resolves CURIEs itself; resolution is left to
//! whatever `RdfSink` consumes the events (see `core::uri` for a resolver to
//! build one on top of).

use std::fmt;

use crate::flags::LiteralFlags;

/// An RDF IRI ([RFC 3987](https://www.ietf.org/rfc/rfc3987.txt)).
///
/// Validity of `iri` as an absolute IRI is not checked here; the reader
/// guarantees it only for terms it produced itself from a `<...>` production
/// or from `@base`/`@prefix` resolution (see `core::uri::resolve`).
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct NamedNode<'a> {
    pub iri: &'a str,
}

impl fmt::Display for NamedNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.iri)
    }
}

/// A prefixed name (`prefix:local`) whose namespace has not yet been
/// expanded. `prefix` is empty for the default prefix (`:local`).
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct Curie<'a> {
    pub prefix: &'a str,
    pub local: &'a str,
}

impl fmt::Display for Curie<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.local)
    }
}

/// A blank node, identified by a label unique within the scope of the
/// reader (or of the document, if the label was given explicitly with
/// `_:id`).
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct BlankNode<'a> {
    pub id: &'a str,
}

impl fmt::Display for BlankNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.id)
    }
}

/// An RDF literal.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Literal<'a> {
    /// A literal with no language tag and the `xsd:string` datatype.
    Simple {
        value: &'a str,
        flags: LiteralFlags,
    },
    /// A language-tagged string (`"value"@language`).
    LanguageTaggedString {
        value: &'a str,
        language: &'a str,
        flags: LiteralFlags,
    },
    /// A literal with an explicit datatype other than `xsd:string`.
    Typed {
        value: &'a str,
        datatype: NamedNode<'a>,
        flags: LiteralFlags,
    },
}

impl fmt::Display for Literal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Simple { value, .. } => print_quoted_str(value, f),
            Literal::LanguageTaggedString { value, language, .. } => {
                print_quoted_str(value, f)?;
                write!(f, "@{}", language)
            }
            Literal::Typed { value, datatype, .. } => {
                print_quoted_str(value, f)?;
                write!(f, "^^{}", datatype)
            }
        }
    }
}

fn print_quoted_str(s: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

use std::fmt::Write as FmtWrite;

/// Subject or object position for a named/blank node, i.e. anything but a
/// literal.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum NamedOrBlankNode<'a> {
    NamedNode(NamedNode<'a>),
    Curie(Curie<'a>),
    BlankNode(BlankNode<'a>),
}

impl fmt::Display for NamedOrBlankNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamedOrBlankNode::NamedNode(nn) => nn.fmt(f),
            NamedOrBlankNode::Curie(c) => c.fmt(f),
            NamedOrBlankNode::BlankNode(bn) => bn.fmt(f),
        }
    }
}

impl<'a> From<NamedNode<'a>> for NamedOrBlankNode<'a> {
    fn from(node: NamedNode<'a>) -> Self {
        NamedOrBlankNode::NamedNode(node)
    }
}

impl<'a> From<Curie<'a>> for NamedOrBlankNode<'a> {
    fn from(node: Curie<'a>) -> Self {
        NamedOrBlankNode::Curie(node)
    }
}

impl<'a> From<BlankNode<'a>> for NamedOrBlankNode<'a> {
    fn from(node: BlankNode<'a>) -> Self {
        NamedOrBlankNode::BlankNode(node)
    }
}

/// Any RDF term: subject/object position plus literal.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Term<'a> {
    NamedNode(NamedNode<'a>),
    Curie(Curie<'a>),
    BlankNode(BlankNode<'a>),
    Literal(Literal<'a>),
}

impl fmt::Display for Term<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::NamedNode(nn) => nn.fmt(f),
            Term::Curie(c) => c.fmt(f),
            Term::BlankNode(bn) => bn.fmt(f),
            Term::Literal(l) => l.fmt(f),
        }
    }
}

impl<'a> From<NamedNode<'a>> for Term<'a> {
    fn from(node: NamedNode<'a>) -> Self {
        Term::NamedNode(node)
    }
}

impl<'a> From<Curie<'a>> for Term<'a> {
    fn from(node: Curie<'a>) -> Self {
        Term::Curie(node)
    }
}

impl<'a> From<BlankNode<'a>> for Term<'a> {
    fn from(node: BlankNode<'a>) -> Self {
        Term::BlankNode(node)
    }
}

impl<'a> From<Literal<'a>> for Term<'a> {
    fn from(literal: Literal<'a>) -> Self {
        Term::Literal(literal)
    }
}

impl<'a> From<NamedOrBlankNode<'a>> for Term<'a> {
    fn from(node: NamedOrBlankNode<'a>) -> Self {
        match node {
            NamedOrBlankNode::NamedNode(nn) => Term::NamedNode(nn),
            NamedOrBlankNode::Curie(c) => Term::Curie(c),
            NamedOrBlankNode::BlankNode(bn) => Term::BlankNode(bn),
        }
    }
}

/// A subject/predicate/object triple, as delivered to an `RdfSink`.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct Triple<'a> {
    pub subject: NamedOrBlankNode<'a>,
    pub predicate: NamedNode<'a>,
    pub object: Term<'a>,
}

impl fmt::Display for Triple<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}
