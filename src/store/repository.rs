//! The mutable, queryable, optionally durable statement store

use super::changeset::Changeset;
use super::snapshot::Snapshot;
use super::{Feature, StatementSet, StoreError, StoreResult};
use crate::model::{Pattern, Statement};
use crate::persistence::Backing;
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};
use tracing::warn;

/// Construction-time repository options
///
/// Feature flags answer [`Repository::supports`] for the repository's whole
/// lifetime; durability is implied by opening a path rather than configured
/// here.
#[derive(Debug, Clone)]
pub struct RepositoryOptions {
    /// Accept insert/delete/clear (false makes every write fail)
    pub writable: bool,
    /// Keep statements with distinct graph names distinct; when disabled,
    /// graph names collapse to the default graph on the way in
    pub graph_names: bool,
    /// Allow point-in-time snapshots
    pub snapshots: bool,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        Self {
            writable: true,
            graph_names: true,
            snapshots: true,
        }
    }
}

/// A set of statements, keyed by full structural equality including graph
/// name
///
/// The set lives behind a reader-writer lock as a shared [`Arc`]; mutation
/// goes through [`Arc::make_mut`], so snapshots and in-flight queries keep
/// the version they started from while the repository moves on. Every write
/// takes the lock for the whole operation, which is what makes
/// [`Changeset::apply`] atomic for concurrent readers. Readers only hold the
/// lock long enough to clone the `Arc`.
///
/// Iteration and query results follow insertion order.
pub struct Repository {
    state: RwLock<Arc<StatementSet>>,
    options: RepositoryOptions,
    backing: Option<Mutex<Backing>>,
}

impl Repository {
    /// Create an empty in-memory repository with default options
    pub fn new() -> Self {
        Self::with_options(RepositoryOptions::default())
    }

    /// Create an empty in-memory repository
    pub fn with_options(options: RepositoryOptions) -> Self {
        Self {
            state: RwLock::new(Arc::new(StatementSet::default())),
            options,
            backing: None,
        }
    }

    /// Open a durable repository with default options
    ///
    /// The directory is created if missing; otherwise the last
    /// durably-committed state at that location is restored.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with_options(path, RepositoryOptions::default())
    }

    /// Open a durable repository
    pub fn open_with_options(
        path: impl AsRef<Path>,
        options: RepositoryOptions,
    ) -> StoreResult<Self> {
        let (backing, restored) = Backing::open(path.as_ref())?;
        let statements = if options.graph_names {
            restored
        } else {
            restored
                .into_iter()
                .map(|statement| Statement {
                    graph: None,
                    ..statement
                })
                .collect()
        };
        Ok(Self {
            state: RwLock::new(Arc::new(statements)),
            options,
            backing: Some(Mutex::new(backing)),
        })
    }

    /// Whether the repository accepts writes
    pub fn is_writable(&self) -> bool {
        self.options.writable
    }

    /// Capability query for optional features
    pub fn supports(&self, feature: Feature) -> bool {
        match feature {
            Feature::GraphNames => self.options.graph_names,
            Feature::Snapshots => self.options.snapshots,
            Feature::Durability => self.backing.is_some(),
        }
    }

    /// Number of distinct statements
    pub fn len(&self) -> usize {
        self.state.read().unwrap().len()
    }

    /// Whether the repository holds no statements
    pub fn is_empty(&self) -> bool {
        self.state.read().unwrap().is_empty()
    }

    /// Whether an exact structural match is present
    pub fn contains(&self, statement: &Statement) -> bool {
        let state = self.state.read().unwrap();
        if self.options.graph_names || statement.graph.is_none() {
            state.contains(statement)
        } else {
            state.contains(&statement.in_graph(None))
        }
    }

    /// Insert one statement
    ///
    /// Inserting a statement already present is a no-op.
    pub fn insert(&self, statement: Statement) -> StoreResult<()> {
        self.insert_all(std::iter::once(statement))
    }

    /// Insert a finite sequence of statements
    pub fn insert_all(
        &self,
        statements: impl IntoIterator<Item = Statement>,
    ) -> StoreResult<()> {
        self.check_writable()?;

        let mut state = self.state.write().unwrap();

        let mut fresh = StatementSet::default();
        for statement in statements {
            let statement = self.normalize(statement);
            if !state.contains(&statement) {
                fresh.insert(statement);
            }
        }
        if fresh.is_empty() {
            return Ok(());
        }

        if let Some(backing) = &self.backing {
            backing.lock().unwrap().record_insert(fresh.iter())?;
        }

        Arc::make_mut(&mut state).extend(fresh);
        Ok(())
    }

    /// Delete one statement
    ///
    /// Deleting a statement that is not present is a no-op, not an error.
    pub fn delete(&self, statement: &Statement) -> StoreResult<()> {
        self.delete_all(std::iter::once(statement.clone()))
    }

    /// Delete a finite sequence of statements
    pub fn delete_all(
        &self,
        statements: impl IntoIterator<Item = Statement>,
    ) -> StoreResult<()> {
        self.check_writable()?;

        let mut state = self.state.write().unwrap();

        let mut present = StatementSet::default();
        for statement in statements {
            let statement = self.normalize(statement);
            if state.contains(&statement) {
                present.insert(statement);
            }
        }
        if present.is_empty() {
            return Ok(());
        }

        if let Some(backing) = &self.backing {
            backing.lock().unwrap().record_delete(present.iter())?;
        }

        let set = Arc::make_mut(&mut state);
        for statement in &present {
            set.shift_remove(statement);
        }
        Ok(())
    }

    /// Remove all statements
    ///
    /// The durable location, if any, is kept and can start a fresh cycle.
    pub fn clear(&self) -> StoreResult<()> {
        self.check_writable()?;

        let mut state = self.state.write().unwrap();
        if state.is_empty() {
            return Ok(());
        }

        if let Some(backing) = &self.backing {
            backing.lock().unwrap().record_clear()?;
        }

        *state = Arc::new(StatementSet::default());
        Ok(())
    }

    /// Query statements matching a pattern
    ///
    /// The returned iterator runs over the statement set as of this call;
    /// querying again picks up later mutations.
    pub fn query(&self, pattern: &Pattern) -> Matches {
        let statements = Arc::clone(&self.state.read().unwrap());
        Matches::new(statements, pattern.clone())
    }

    /// Iterate over all statements
    pub fn iter(&self) -> Matches {
        self.query(&Pattern::any())
    }

    /// Take a point-in-time snapshot
    ///
    /// Fails with [`StoreError::Unsupported`] when the capability is
    /// disabled.
    pub fn snapshot(&self) -> StoreResult<Snapshot> {
        if !self.supports(Feature::Snapshots) {
            return Err(StoreError::Unsupported(Feature::Snapshots));
        }
        Ok(Snapshot::new(Arc::clone(&self.state.read().unwrap())))
    }

    /// Force journaled mutations to disk; a no-op for in-memory repositories
    pub fn flush(&self) -> StoreResult<()> {
        if let Some(backing) = &self.backing {
            backing.lock().unwrap().flush()?;
        }
        Ok(())
    }

    /// Close the repository, compacting the journal into a checkpoint
    ///
    /// A no-op for in-memory repositories.
    pub fn close(self) -> StoreResult<()> {
        if let Some(backing) = &self.backing {
            let state = self.state.read().unwrap();
            backing.lock().unwrap().checkpoint(&state)?;
        }
        Ok(())
    }

    /// Apply a changeset: all staged deletes, then all staged inserts, in
    /// one write-lock critical section
    pub(crate) fn apply(&self, changes: &Changeset) -> StoreResult<()> {
        self.check_writable()?;

        let mut state = self.state.write().unwrap();

        let deletes: StatementSet = changes
            .deletes()
            .map(|statement| self.normalize(statement.clone()))
            .filter(|statement| state.contains(statement))
            .collect();
        let inserts: StatementSet = changes
            .inserts()
            .map(|statement| self.normalize(statement.clone()))
            .filter(|statement| deletes.contains(statement) || !state.contains(statement))
            .collect();
        if deletes.is_empty() && inserts.is_empty() {
            return Ok(());
        }

        if let Some(backing) = &self.backing {
            backing.lock().unwrap().record_apply(&deletes, &inserts)?;
        }

        let set = Arc::make_mut(&mut state);
        for statement in &deletes {
            set.shift_remove(statement);
        }
        set.extend(inserts);
        Ok(())
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.options.writable {
            Ok(())
        } else {
            Err(StoreError::NotWritable)
        }
    }

    fn normalize(&self, statement: Statement) -> Statement {
        if self.options.graph_names || statement.graph.is_none() {
            statement
        } else {
            Statement {
                graph: None,
                ..statement
            }
        }
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Repository {
    fn drop(&mut self) {
        if let Some(backing) = &self.backing {
            if let Ok(mut backing) = backing.lock() {
                if let Err(e) = backing.flush() {
                    warn!("Failed to flush journal on drop: {}", e);
                }
            }
        }
    }
}

/// Lazy iterator over the statements matching a pattern
///
/// Holds the statement-set version current when the query was made, so
/// iteration is unaffected by concurrent mutation and never blocks writers.
pub struct Matches {
    statements: Arc<StatementSet>,
    pattern: Pattern,
    position: usize,
}

impl Matches {
    pub(crate) fn new(statements: Arc<StatementSet>, pattern: Pattern) -> Self {
        Self {
            statements,
            pattern,
            position: 0,
        }
    }
}

impl Iterator for Matches {
    type Item = Statement;

    fn next(&mut self) -> Option<Statement> {
        while let Some(statement) = self.statements.get_index(self.position) {
            self.position += 1;
            if self.pattern.matches(statement) {
                return Some(statement.clone());
            }
        }
        None
    }
}
