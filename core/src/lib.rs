//! Streaming RDF parsing and writing: a Turtle engine (the full grammar,
//! [`turtle::TurtleParser`]) and an N-Triples engine
//! ([`ntriples::NTriplesParser`]), plus the RFC 3986 URI machinery
//! ([`uri`]) and prefix/base tracking ([`env`]) a consumer needs to turn
//! the raw, unresolved terms either engine emits into fully resolved RDF.

pub mod arena;
pub mod chars;
pub mod env;
pub mod error;
pub mod input;
pub mod ntriples;
mod shared;
pub mod turtle;
pub mod uri;
pub mod writer;

pub use error::{Position, TurtleError};
pub use ntriples::NTriplesParser;
pub use turtle::TurtleParser;
