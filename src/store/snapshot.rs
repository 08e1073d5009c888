//! Point-in-time repository views

use super::repository::Matches;
use super::StatementSet;
use crate::model::{Pattern, Statement};
use std::sync::Arc;

/// An immutable view of a repository frozen at a point in time
///
/// The snapshot keeps the statement-set version that was current when it was
/// taken; repository mutation after that point copies the set before
/// changing it, so the snapshot's answers never change. There is no
/// mutation surface.
#[derive(Clone)]
pub struct Snapshot {
    statements: Arc<StatementSet>,
}

impl Snapshot {
    pub(crate) fn new(statements: Arc<StatementSet>) -> Self {
        Self { statements }
    }

    /// Query statements matching a pattern, as of snapshot time
    pub fn query(&self, pattern: &Pattern) -> Matches {
        Matches::new(Arc::clone(&self.statements), pattern.clone())
    }

    /// Iterate over all statements in the snapshot
    pub fn iter(&self) -> Matches {
        self.query(&Pattern::any())
    }

    /// Number of statements in the snapshot
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether the snapshot holds no statements
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Whether an exact structural match is present
    pub fn contains(&self, statement: &Statement) -> bool {
        self.statements.contains(statement)
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::Repository;
    use crate::model::{Literal, NamedNode, Pattern, Statement};

    fn statement(name: &str) -> Statement {
        Statement::new(
            NamedNode::new(format!("http://example.org/{}", name)).unwrap(),
            NamedNode::new("http://xmlns.com/foaf/0.1/name").unwrap(),
            Literal::simple(name.to_string()),
        )
    }

    #[test]
    fn test_snapshot_is_accurate_at_creation() {
        let repository = Repository::new();
        repository.insert(statement("a")).unwrap();
        repository.insert(statement("b")).unwrap();

        let snapshot = repository.snapshot().unwrap();

        let from_snapshot: Vec<Statement> = snapshot.query(&Pattern::any()).collect();
        let from_repository: Vec<Statement> = repository.query(&Pattern::any()).collect();
        assert_eq!(from_snapshot, from_repository);
    }

    #[test]
    fn test_snapshot_survives_clear() {
        let repository = Repository::new();
        repository.insert(statement("a")).unwrap();

        let snapshot = repository.snapshot().unwrap();
        repository.clear().unwrap();

        assert!(repository.is_empty());
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains(&statement("a")));
        assert_eq!(snapshot.query(&Pattern::any()).count(), 1);
    }

    #[test]
    fn test_snapshot_unaffected_by_later_inserts_and_deletes() {
        let repository = Repository::new();
        repository.insert(statement("a")).unwrap();

        let snapshot = repository.snapshot().unwrap();
        repository.insert(statement("b")).unwrap();
        repository.delete(&statement("a")).unwrap();

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains(&statement("a")));
        assert!(!snapshot.contains(&statement("b")));
    }

    #[test]
    fn test_snapshot_outlives_repository() {
        let snapshot = {
            let repository = Repository::new();
            repository.insert(statement("a")).unwrap();
            repository.snapshot().unwrap()
        };
        assert_eq!(snapshot.len(), 1);
    }
}
