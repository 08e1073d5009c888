//! Repository contract tests driven by the N-Triples fixture

use quarry::{
    ntriples, Feature, NamedNode, Pattern, Repository, RepositoryOptions, Statement, StoreError,
};
use std::path::PathBuf;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/triples.nt")
}

fn fixture_statements() -> Vec<Statement> {
    ntriples::read_file(fixture_path()).unwrap()
}

/// The first fixture statement whose terms are all IRIs
fn uri_statement() -> Statement {
    fixture_statements()
        .into_iter()
        .find(|st| {
            st.subject.is_named_node() && st.object.is_named_node()
        })
        .unwrap()
}

#[test]
fn inserts_fixture_without_loss() {
    let statements = fixture_statements();
    let count = statements.len();

    let repository = Repository::new();
    repository.insert_all(statements.clone()).unwrap();

    assert_eq!(repository.len(), count);
    for statement in &statements {
        assert!(repository.contains(statement));
    }
}

#[test]
fn does_not_insert_a_statement_twice() {
    let repository = Repository::new();
    let statement = uri_statement();

    repository.insert(statement.clone()).unwrap();
    repository.insert(statement).unwrap();

    assert_eq!(repository.len(), 1);
}

#[test]
fn reinserting_the_fixture_changes_nothing() {
    let statements = fixture_statements();

    let repository = Repository::new();
    repository.insert_all(statements.clone()).unwrap();
    let count = repository.len();

    repository.insert_all(statements).unwrap();
    assert_eq!(repository.len(), count);
}

#[test]
fn treats_statements_with_different_graph_names_as_distinct() {
    let repository = Repository::new();
    let statement = uri_statement();

    repository.insert(statement.clone()).unwrap();
    repository
        .insert(statement.in_graph(Some(NamedNode::new("urn:context:1").unwrap())))
        .unwrap();
    repository
        .insert(statement.in_graph(Some(NamedNode::new("urn:context:2").unwrap())))
        .unwrap();

    assert_eq!(repository.len(), 3);
}

#[test]
fn collapses_graph_names_when_unsupported() {
    let repository = Repository::with_options(RepositoryOptions {
        graph_names: false,
        ..RepositoryOptions::default()
    });
    let statement = uri_statement();

    repository.insert(statement.clone()).unwrap();
    repository
        .insert(statement.in_graph(Some(NamedNode::new("urn:context:1").unwrap())))
        .unwrap();
    repository
        .insert(statement.in_graph(Some(NamedNode::new("urn:context:2").unwrap())))
        .unwrap();

    assert_eq!(repository.len(), 1);
}

#[test]
fn queries_by_pattern() {
    let repository = Repository::new();
    repository.insert_all(fixture_statements()).unwrap();

    let alice: quarry::Subject = NamedNode::new("http://example.org/alice").unwrap().into();
    let by_subject = Pattern::new(Some(alice), None, None, None);
    assert_eq!(repository.query(&by_subject).count(), 3);

    let name = NamedNode::new("http://xmlns.com/foaf/0.1/name").unwrap();
    let by_predicate = Pattern::new(None, Some(name), None, None);
    assert_eq!(repository.query(&by_predicate).count(), 3);

    let nobody: quarry::Subject = NamedNode::new("http://example.org/nobody").unwrap().into();
    let no_match = Pattern::new(Some(nobody), None, None, None);
    assert_eq!(repository.query(&no_match).count(), 0);
}

#[test]
fn query_results_are_deterministic() {
    let statements = fixture_statements();
    let repository = Repository::new();
    repository.insert_all(statements.clone()).unwrap();

    let first: Vec<Statement> = repository.query(&Pattern::any()).collect();
    let second: Vec<Statement> = repository.query(&Pattern::any()).collect();

    assert_eq!(first, statements);
    assert_eq!(first, second);
}

#[test]
fn deleting_missing_statement_is_not_an_error() {
    let repository = Repository::new();
    repository.insert_all(fixture_statements()).unwrap();
    let count = repository.len();

    let ghost = Statement::new(
        NamedNode::new("http://example.org/nobody").unwrap(),
        NamedNode::new("http://xmlns.com/foaf/0.1/name").unwrap(),
        quarry::Literal::simple("Nobody"),
    );
    repository.delete(&ghost).unwrap();

    assert_eq!(repository.len(), count);
}

#[test]
fn clear_empties_the_repository() {
    let repository = Repository::new();
    repository.insert_all(fixture_statements()).unwrap();
    assert!(!repository.is_empty());

    repository.clear().unwrap();
    assert!(repository.is_empty());
    assert_eq!(repository.query(&Pattern::any()).count(), 0);
}

#[test]
fn read_only_repository_is_untouched_by_rejected_writes() {
    let repository = Repository::with_options(RepositoryOptions {
        writable: false,
        ..RepositoryOptions::default()
    });

    assert!(!repository.is_writable());
    assert!(matches!(
        repository.insert(uri_statement()),
        Err(StoreError::NotWritable)
    ));
    assert!(repository.is_empty());
}

#[test]
fn capabilities_answer_without_erroring() {
    let repository = Repository::new();
    assert!(repository.supports(Feature::GraphNames));
    assert!(repository.supports(Feature::Snapshots));
    assert!(!repository.supports(Feature::Durability));

    let limited = Repository::with_options(RepositoryOptions {
        graph_names: false,
        snapshots: false,
        ..RepositoryOptions::default()
    });
    assert!(!limited.supports(Feature::GraphNames));
    assert!(!limited.supports(Feature::Snapshots));
}
