//! Durability tests: content must survive close/reopen cycles

use quarry::{
    Feature, Literal, NamedNode, Pattern, Repository, RepositoryOptions, Statement, Transaction,
};
use tempfile::TempDir;

fn statement(name: &str) -> Statement {
    Statement::new(
        NamedNode::new(format!("http://example.org/{}", name)).unwrap(),
        NamedNode::new("http://xmlns.com/foaf/0.1/name").unwrap(),
        Literal::simple(name.to_string()),
    )
}

#[test]
fn durable_repository_reports_capability() {
    let temp_dir = TempDir::new().unwrap();
    let repository = Repository::open(temp_dir.path()).unwrap();
    assert!(repository.supports(Feature::Durability));
}

#[test]
fn content_survives_close_and_reopen() {
    let temp_dir = TempDir::new().unwrap();

    {
        let repository = Repository::open(temp_dir.path()).unwrap();
        repository
            .insert_all([statement("x"), statement("y")])
            .unwrap();
        repository.close().unwrap();
    }

    let repository = Repository::open(temp_dir.path()).unwrap();
    assert_eq!(repository.len(), 2);
    assert!(repository.contains(&statement("x")));
    assert!(repository.contains(&statement("y")));
}

#[test]
fn content_survives_drop_without_close() {
    let temp_dir = TempDir::new().unwrap();

    {
        let repository = Repository::open(temp_dir.path()).unwrap();
        repository.insert(statement("x")).unwrap();
        // Dropped without close; the journal already has the insert
    }

    let repository = Repository::open(temp_dir.path()).unwrap();
    assert_eq!(repository.len(), 1);
}

#[test]
fn deletes_and_clears_are_durable() {
    let temp_dir = TempDir::new().unwrap();

    {
        let repository = Repository::open(temp_dir.path()).unwrap();
        repository
            .insert_all([statement("a"), statement("b")])
            .unwrap();
        repository.delete(&statement("a")).unwrap();
        repository.close().unwrap();
    }

    {
        let repository = Repository::open(temp_dir.path()).unwrap();
        assert_eq!(repository.len(), 1);
        repository.clear().unwrap();
        repository.close().unwrap();
    }

    let repository = Repository::open(temp_dir.path()).unwrap();
    assert!(repository.is_empty());
}

#[test]
fn clear_starts_a_fresh_durability_cycle() {
    let temp_dir = TempDir::new().unwrap();

    {
        let repository = Repository::open(temp_dir.path()).unwrap();
        repository.insert(statement("old")).unwrap();
        repository.clear().unwrap();
        repository.insert(statement("new")).unwrap();
        repository.close().unwrap();
    }

    let repository = Repository::open(temp_dir.path()).unwrap();
    assert_eq!(repository.len(), 1);
    assert!(repository.contains(&statement("new")));
}

#[test]
fn transactions_are_durable() {
    let temp_dir = TempDir::new().unwrap();

    {
        let repository = Repository::open(temp_dir.path()).unwrap();
        repository.insert(statement("c")).unwrap();

        let mut tx = Transaction::mutable(&repository);
        tx.insert_all([statement("a"), statement("b")]).unwrap();
        tx.delete(statement("c")).unwrap();
        tx.execute().unwrap();
        repository.close().unwrap();
    }

    let repository = Repository::open(temp_dir.path()).unwrap();
    let result: Vec<Statement> = repository.query(&Pattern::any()).collect();
    assert_eq!(result, vec![statement("a"), statement("b")]);
}

#[test]
fn repeated_cycles_without_close_accumulate_journal_tail() {
    let temp_dir = TempDir::new().unwrap();

    for i in 0..3 {
        let repository = Repository::open(temp_dir.path()).unwrap();
        assert_eq!(repository.len(), i);
        repository.insert(statement(&format!("s{}", i))).unwrap();
        // No close: the next open replays the journal tail
    }

    let repository = Repository::open(temp_dir.path()).unwrap();
    assert_eq!(repository.len(), 3);
}

#[test]
fn graph_names_survive_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let named = statement("x").in_graph(Some(NamedNode::new("urn:context:1").unwrap()));

    {
        let repository = Repository::open(temp_dir.path()).unwrap();
        repository.insert(statement("x")).unwrap();
        repository.insert(named.clone()).unwrap();
        repository.close().unwrap();
    }

    let repository = Repository::open(temp_dir.path()).unwrap();
    assert_eq!(repository.len(), 2);
    assert!(repository.contains(&named));
}

#[test]
fn read_only_durable_repository_serves_existing_content() {
    let temp_dir = TempDir::new().unwrap();

    {
        let repository = Repository::open(temp_dir.path()).unwrap();
        repository.insert(statement("x")).unwrap();
        repository.close().unwrap();
    }

    let repository = Repository::open_with_options(
        temp_dir.path(),
        RepositoryOptions {
            writable: false,
            ..RepositoryOptions::default()
        },
    )
    .unwrap();

    assert_eq!(repository.len(), 1);
    assert!(repository.insert(statement("y")).is_err());
    assert_eq!(repository.len(), 1);
}
