//! Quarry
//!
//! A transactional RDF quad store: a repository of
//! subject–predicate–object–graph statements with buffered transactions,
//! point-in-time snapshots, and durability across process restarts.
//!
//! # Architecture
//!
//! - [`model`] — terms (wrapping `oxrdf`), statements, and query patterns
//! - [`store`] — the engine: [`Repository`], [`Changeset`], [`Transaction`],
//!   [`Snapshot`]
//! - [`persistence`] — append-only journal plus compressed checkpoints
//!   backing durable repositories
//! - [`ntriples`] — N-Triples fixture reader/writer
//!
//! Mutating a repository directly takes effect immediately; mutating through
//! a transaction stages a changeset that lands atomically on execute. A
//! snapshot freezes the repository's contents at a point in time and is
//! immune to everything that happens afterwards. A repository opened on a
//! directory journals every committed mutation and restores itself on
//! reopen.
//!
//! # Example
//!
//! ```rust
//! use quarry::{NamedNode, Literal, Pattern, Repository, Statement, Transaction};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = Repository::new();
//!
//! let alice = NamedNode::new("http://example.org/alice")?;
//! let name = NamedNode::new("http://xmlns.com/foaf/0.1/name")?;
//! let statement = Statement::new(alice, name, Literal::simple("Alice"));
//!
//! let mut tx = Transaction::mutable(&repository);
//! tx.insert(statement.clone())?;
//! assert!(repository.is_empty());
//!
//! tx.execute()?;
//! assert!(repository.contains(&statement));
//! assert_eq!(repository.query(&Pattern::any()).count(), 1);
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod model;
pub mod ntriples;
pub mod persistence;
pub mod store;

// Re-export main types for convenience
pub use model::{
    BlankNode, Literal, NamedNode, Object, Pattern, Statement, Subject, TermError, TermResult,
};

pub use store::{
    Changeset, Feature, Matches, Repository, RepositoryOptions, Snapshot, StoreError, StoreResult,
    Transaction,
};

pub use persistence::{Journal, JournalEntry, JournalError, JournalResult};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
