//! Staged inserts and deletes with atomic application

use super::repository::Repository;
use super::{StatementSet, StoreResult};
use crate::model::Statement;

/// A pair of staged statement sets applied to a repository in one atomic
/// step
///
/// Deletes apply before inserts, so a statement staged in both sets is
/// present after [`Changeset::apply`].
#[derive(Debug, Clone, Default)]
pub struct Changeset {
    inserts: StatementSet,
    deletes: StatementSet,
}

impl Changeset {
    /// Create an empty changeset
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage one statement for insertion
    pub fn insert(&mut self, statement: Statement) {
        self.inserts.insert(statement);
    }

    /// Stage a finite sequence of statements for insertion
    pub fn insert_all(&mut self, statements: impl IntoIterator<Item = Statement>) {
        self.inserts.extend(statements);
    }

    /// Stage one statement for deletion
    pub fn delete(&mut self, statement: Statement) {
        self.deletes.insert(statement);
    }

    /// Stage a finite sequence of statements for deletion
    pub fn delete_all(&mut self, statements: impl IntoIterator<Item = Statement>) {
        self.deletes.extend(statements);
    }

    /// True iff both staged sets are empty
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.deletes.is_empty()
    }

    /// Iterate over the statements staged for insertion
    pub fn inserts(&self) -> impl Iterator<Item = &Statement> {
        self.inserts.iter()
    }

    /// Iterate over the statements staged for deletion
    pub fn deletes(&self) -> impl Iterator<Item = &Statement> {
        self.deletes.iter()
    }

    /// Apply the staged deletes and inserts to a repository atomically
    ///
    /// Either the whole changeset takes effect or, on failure, the
    /// repository is left exactly as before the call. Concurrent readers
    /// never observe a partially-applied state.
    pub fn apply(&self, repository: &Repository) -> StoreResult<()> {
        repository.apply(self)
    }
}
