//! Buffered transactions over a repository
//!
//! A transaction is a deliberately narrow staging mechanism: it can stage
//! inserts and deletes, and nothing else. Repository-level operations such
//! as clear or bulk reload are not part of the type, so reaching for them
//! through a transaction is a compile error rather than a runtime surprise.

use super::changeset::Changeset;
use super::repository::Repository;
use super::{StoreError, StoreResult};
use crate::model::Statement;

/// A buffering front-end over one repository
///
/// Insert/delete calls accumulate in a [`Changeset`]; the repository is
/// untouched until [`Transaction::execute`], which applies the whole
/// changeset atomically. `execute` consumes the transaction, so a second
/// execute of the same buffer cannot be expressed.
pub struct Transaction<'repo> {
    repository: &'repo Repository,
    mutable: bool,
    changes: Changeset,
}

impl<'repo> Transaction<'repo> {
    /// Begin a read-only transaction
    ///
    /// Read-only is the default; insert and delete fail before anything is
    /// buffered.
    pub fn new(repository: &'repo Repository) -> Self {
        Self {
            repository,
            mutable: false,
            changes: Changeset::new(),
        }
    }

    /// Begin a mutable transaction
    pub fn mutable(repository: &'repo Repository) -> Self {
        Self {
            repository,
            mutable: true,
            changes: Changeset::new(),
        }
    }

    /// The bound target repository
    pub fn repository(&self) -> &Repository {
        self.repository
    }

    /// The construction-time mutability flag
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// The staged changeset; inspecting it does not apply it
    pub fn changes(&self) -> &Changeset {
        &self.changes
    }

    /// True iff anything has been staged but not yet executed
    pub fn is_buffered(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Stage one statement for insertion
    pub fn insert(&mut self, statement: Statement) -> StoreResult<()> {
        self.check_mutable()?;
        self.changes.insert(statement);
        Ok(())
    }

    /// Stage a finite sequence of statements for insertion
    pub fn insert_all(
        &mut self,
        statements: impl IntoIterator<Item = Statement>,
    ) -> StoreResult<()> {
        self.check_mutable()?;
        self.changes.insert_all(statements);
        Ok(())
    }

    /// Stage one statement for deletion
    pub fn delete(&mut self, statement: Statement) -> StoreResult<()> {
        self.check_mutable()?;
        self.changes.delete(statement);
        Ok(())
    }

    /// Stage a finite sequence of statements for deletion
    pub fn delete_all(
        &mut self,
        statements: impl IntoIterator<Item = Statement>,
    ) -> StoreResult<()> {
        self.check_mutable()?;
        self.changes.delete_all(statements);
        Ok(())
    }

    /// Apply the staged changeset to the repository atomically
    pub fn execute(self) -> StoreResult<()> {
        self.changes.apply(self.repository)
    }

    fn check_mutable(&self) -> StoreResult<()> {
        if self.mutable {
            Ok(())
        } else {
            Err(StoreError::NotWritable)
        }
    }
}
