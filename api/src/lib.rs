//! Data structures and traits shared by `turtlo-core`'s parsers and by any
//! sink consuming their output: the RDF term types (component H's public
//! node shapes), the statement/literal flag bitsets, and the `RdfSink` /
//! `TripleParser` traits tying a reader to its consumer.

pub mod flags;
pub mod model;
pub mod sink;

pub use flags::{LiteralFlags, StatementFlags};
pub use model::{BlankNode, Curie, Literal, NamedNode, NamedOrBlankNode, Term, Triple};
pub use sink::{RdfSink, TripleParser};
