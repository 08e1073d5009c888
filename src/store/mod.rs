//! The storage and transaction engine
//!
//! [`Repository`] is the mutable, queryable store of statements.
//! [`Changeset`] stages inserts and deletes and applies them atomically.
//! [`Transaction`] buffers a changeset against one repository.
//! [`Snapshot`] is a point-in-time view immune to later mutation.

mod changeset;
mod repository;
mod snapshot;
mod transaction;

pub use changeset::Changeset;
pub use repository::{Matches, Repository, RepositoryOptions};
pub use snapshot::Snapshot;
pub use transaction::Transaction;

use crate::model::Statement;
use crate::persistence::JournalError;
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use std::fmt;
use thiserror::Error;

/// The statement set backing repositories and snapshots
///
/// Insertion-ordered, so iteration and query results are deterministic.
pub(crate) type StatementSet = IndexSet<Statement, FxBuildHasher>;

/// Optional repository capabilities
///
/// Resolved at construction time; query with [`Repository::supports`] before
/// relying on an optional operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Statements with distinct graph names are distinct entries
    GraphNames,
    /// Point-in-time snapshots
    Snapshots,
    /// Content survives a close/reopen cycle
    Durability,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::GraphNames => write!(f, "graph names"),
            Feature::Snapshots => write!(f, "snapshots"),
            Feature::Durability => write!(f, "durability"),
        }
    }
}

/// Store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Write attempted on a read-only target
    #[error("Repository is not writable")]
    NotWritable,

    /// Optional capability invoked on a repository that lacks it
    #[error("Repository does not support {0}")]
    Unsupported(Feature),

    /// Durable-layer failure
    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),
}

pub type StoreResult<T> = Result<T, StoreError>;
