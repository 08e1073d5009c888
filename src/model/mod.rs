//! RDF data model: terms, statements, and query patterns.
//!
//! Terms wrap the `oxrdf` primitives, which supply IRI validation,
//! structural equality, hashing, and canonical N-Triples display.

mod statement;
mod term;

pub use statement::{Pattern, Statement};
pub use term::{BlankNode, Literal, NamedNode, Object, Subject, TermError, TermResult};
