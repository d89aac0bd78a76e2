//! Base URI and prefix tracking (ambient, SPEC_FULL.md component J): the
//! reader never resolves an IRI itself (see the module doc on
//! [`crate::turtle`]) — a [`PrefixTable`] is the layer that does, sitting
//! between a parser and whatever ultimate [`RdfSink`](turtlo_api::sink::RdfSink)
//! wants fully-resolved terms.

use crate::uri;
use std::collections::HashMap;
use turtlo_api::flags::{LiteralFlags, StatementFlags};
use turtlo_api::model::{BlankNode, Curie, NamedNode, NamedOrBlankNode, Term, Triple};
use turtlo_api::sink::RdfSink;

/// Tracks the current `@base` and the `@prefix` declarations seen so far,
/// resolving relative IRIs and expanding CURIEs against them.
#[derive(Debug, Clone, Default)]
pub struct PrefixTable {
    base: Option<String>,
    prefixes: HashMap<String, String>,
}

impl PrefixTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: Some(base.into()),
            prefixes: HashMap::new(),
        }
    }

    /// Records a new `@base`, itself resolved against whatever base was
    /// previously in effect (Turtle lets `@base` be relative to a prior
    /// `@base`).
    pub fn set_base(&mut self, iri: &str) {
        self.base = Some(self.resolve(iri));
    }

    /// Records `@prefix name: <iri>`, resolving `iri` against the current
    /// base first (the same rule `@base` itself follows).
    pub fn set_prefix(&mut self, name: &str, iri: &str) {
        let resolved = self.resolve(iri);
        self.prefixes.insert(name.to_string(), resolved);
    }

    /// Resolves `iri` against the current base, returning it unchanged if
    /// it's already absolute or no base is set.
    pub fn resolve(&self, iri: &str) -> String {
        match &self.base {
            Some(base) if !uri::string_has_scheme(iri) => {
                let base_view = uri::parse(base);
                let r = uri::parse(iri);
                uri::serialise(&uri::resolve(&r, &base_view))
            }
            _ => iri.to_string(),
        }
    }

    /// Expands a CURIE's namespace if `prefix` was declared, returning the
    /// full IRI. `None` if the prefix is undeclared.
    pub fn expand(&self, prefix: &str, local: &str) -> Option<String> {
        self.prefixes.get(prefix).map(|ns| format!("{}{}", ns, local))
    }

    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }
}

/// A sink adapter that resolves every CURIE and relative IRI a parser
/// emits through a [`PrefixTable`] before forwarding the fully-resolved
/// triple on to `inner`.
///
/// `@base`/`@prefix` events update the table and are not forwarded;
/// everything else passes through once resolved.
pub struct Resolving<'a, S> {
    table: &'a mut PrefixTable,
    inner: &'a mut S,
}

impl<'a, S: RdfSink> Resolving<'a, S> {
    pub fn new(table: &'a mut PrefixTable, inner: &'a mut S) -> Self {
        Self { table, inner }
    }

    fn resolve_subject(&self, node: NamedOrBlankNode<'_>) -> ResolvedNode {
        match node {
            NamedOrBlankNode::NamedNode(nn) => ResolvedNode::Named(self.table.resolve(nn.iri)),
            NamedOrBlankNode::Curie(c) => ResolvedNode::Named(
                self.table
                    .expand(c.prefix, c.local)
                    .unwrap_or_else(|| format!("{}:{}", c.prefix, c.local)),
            ),
            NamedOrBlankNode::BlankNode(bn) => ResolvedNode::Blank(bn.id.to_string()),
        }
    }

    fn resolve_term(&self, term: Term<'_>) -> ResolvedTerm {
        match term {
            Term::NamedNode(nn) => ResolvedTerm::Named(self.table.resolve(nn.iri)),
            Term::Curie(c) => ResolvedTerm::Named(
                self.table
                    .expand(c.prefix, c.local)
                    .unwrap_or_else(|| format!("{}:{}", c.prefix, c.local)),
            ),
            Term::BlankNode(bn) => ResolvedTerm::Blank(bn.id.to_string()),
            Term::Literal(l) => ResolvedTerm::Literal(match l {
                turtlo_api::model::Literal::Simple { value, flags } => {
                    OwnedLiteral::Simple(value.to_string(), flags)
                }
                turtlo_api::model::Literal::LanguageTaggedString { value, language, flags } => {
                    OwnedLiteral::Lang(value.to_string(), language.to_string(), flags)
                }
                turtlo_api::model::Literal::Typed { value, datatype, flags } => {
                    OwnedLiteral::Typed(value.to_string(), self.table.resolve(datatype.iri), flags)
                }
            }),
        }
    }
}

enum ResolvedNode {
    Named(String),
    Blank(String),
}

enum ResolvedTerm {
    Named(String),
    Blank(String),
    Literal(OwnedLiteral),
}

enum OwnedLiteral {
    Simple(String, LiteralFlags),
    Lang(String, String, LiteralFlags),
    Typed(String, String, LiteralFlags),
}

impl<S: RdfSink> RdfSink for Resolving<'_, S> {
    fn base_uri(&mut self, uri: NamedNode<'_>) -> bool {
        self.table.set_base(uri.iri);
        true
    }

    fn prefix(&mut self, name: &str, uri: NamedNode<'_>) -> bool {
        self.table.set_prefix(name, uri.iri);
        true
    }

    fn statement(&mut self, triple: Triple<'_>, flags: StatementFlags) -> bool {
        let subject = self.resolve_subject(triple.subject);
        let predicate = self.table.resolve(triple.predicate.iri);
        let object = self.resolve_term(triple.object);

        let subject_node = match &subject {
            ResolvedNode::Named(s) => NamedOrBlankNode::NamedNode(NamedNode { iri: s }),
            ResolvedNode::Blank(s) => NamedOrBlankNode::BlankNode(BlankNode { id: s }),
        };
        let object_term = match &object {
            ResolvedTerm::Named(s) => Term::NamedNode(NamedNode { iri: s }),
            ResolvedTerm::Blank(s) => Term::BlankNode(BlankNode { id: s }),
            ResolvedTerm::Literal(OwnedLiteral::Simple(v, flags)) => {
                Term::Literal(turtlo_api::model::Literal::Simple { value: v, flags: *flags })
            }
            ResolvedTerm::Literal(OwnedLiteral::Lang(v, lang, flags)) => {
                Term::Literal(turtlo_api::model::Literal::LanguageTaggedString {
                    value: v,
                    language: lang,
                    flags: *flags,
                })
            }
            ResolvedTerm::Literal(OwnedLiteral::Typed(v, dt, flags)) => {
                Term::Literal(turtlo_api::model::Literal::Typed {
                    value: v,
                    datatype: NamedNode { iri: dt },
                    flags: *flags,
                })
            }
        };

        self.inner.statement(
            Triple {
                subject: subject_node,
                predicate: NamedNode { iri: &predicate },
                object: object_term,
            },
            flags,
        )
    }

    fn end_anon(&mut self, node: BlankNode<'_>) -> bool {
        self.inner.end_anon(node)
    }
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

    #[test]
    fn resolves_relative_iri_against_base() {
        let mut table = PrefixTable::with_base("http://example.org/a/b");
        let mut sink = Collector::default();
        {
            let mut resolving = Resolving::new(&mut table, &mut sink);
            resolving.statement(
                Triple {
                    subject: NamedOrBlankNode::NamedNode(NamedNode { iri: "s" }),
                    predicate: NamedNode { iri: "../p" },
                    object: Term::NamedNode(NamedNode { iri: "o" }),
                },
                StatementFlags::NONE,
            );
        }
        assert_eq!(
            sink.statements.borrow()[0],
            "<http://example.org/a/s> <http://example.org/p> <http://example.org/a/o> ."
        );
    }

    #[test]
    fn expands_known_curie() {
        let mut table = PrefixTable::new();
        table.set_prefix("ex", "http://example.org/");
        let mut sink = Collector::default();
        {
            let mut resolving = Resolving::new(&mut table, &mut sink);
            resolving.statement(
                Triple {
                    subject: NamedOrBlankNode::Curie(Curie { prefix: "ex", local: "s" }),
                    predicate: NamedNode { iri: "http://example.org/p" },
                    object: Term::Curie(Curie { prefix: "ex", local: "o" }),
                },
                StatementFlags::NONE,
            );
        }
        assert_eq!(
            sink.statements.borrow()[0],
            "<http://example.org/s> <http://example.org/p> <http://example.org/o> ."
        );
    }
}
