//! Statements and query patterns
//!
//! A [`Statement`] is one quad: subject, predicate, object, plus an optional
//! graph name. The graph name is a distinguishing dimension of the value, not
//! a filter: two statements that differ only in graph name are distinct.

use super::term::{NamedNode, Object, Subject};
use std::fmt;

/// An immutable RDF statement (quad)
///
/// `graph == None` places the statement in the default graph. Statements
/// never change after construction; [`Statement::in_graph`] derives a new
/// value instead of mutating.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement {
    /// Subject
    pub subject: Subject,
    /// Predicate
    pub predicate: NamedNode,
    /// Object
    pub object: Object,
    /// Named graph (None = default graph)
    pub graph: Option<NamedNode>,
}

impl Statement {
    /// Create a new statement in the default graph
    pub fn new(subject: impl Into<Subject>, predicate: NamedNode, object: impl Into<Object>) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
            graph: None,
        }
    }

    /// Create a new statement with an explicit graph name
    pub fn with_graph(
        subject: impl Into<Subject>,
        predicate: NamedNode,
        object: impl Into<Object>,
        graph: Option<NamedNode>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
            graph,
        }
    }

    /// Derive a statement with the same triple part in another graph
    pub fn in_graph(&self, graph: Option<NamedNode>) -> Self {
        Self {
            subject: self.subject.clone(),
            predicate: self.predicate.clone(),
            object: self.object.clone(),
            graph,
        }
    }

    /// Check whether the statement lives in the default graph
    pub fn is_in_default_graph(&self) -> bool {
        self.graph.is_none()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(graph) = &self.graph {
            write!(
                f,
                "{} {} {} {} .",
                self.subject, self.predicate, self.object, graph
            )
        } else {
            write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
        }
    }
}

/// Statement pattern for retrieval
///
/// Each slot is either an exact value or a wildcard (`None`). The graph slot
/// is doubly optional: `None` matches any graph, `Some(None)` matches only
/// the default graph, `Some(Some(g))` matches only graph `g`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    /// Subject (None = wildcard)
    pub subject: Option<Subject>,
    /// Predicate (None = wildcard)
    pub predicate: Option<NamedNode>,
    /// Object (None = wildcard)
    pub object: Option<Object>,
    /// Graph (None = wildcard, Some(None) = default graph)
    pub graph: Option<Option<NamedNode>>,
}

impl Pattern {
    /// Create a new pattern
    pub fn new(
        subject: Option<Subject>,
        predicate: Option<NamedNode>,
        object: Option<Object>,
        graph: Option<Option<NamedNode>>,
    ) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph,
        }
    }

    /// The all-wildcard pattern, matching every statement
    pub fn any() -> Self {
        Self::default()
    }

    /// Check if a statement matches this pattern
    pub fn matches(&self, statement: &Statement) -> bool {
        if let Some(ref s) = self.subject {
            if s != &statement.subject {
                return false;
            }
        }
        if let Some(ref p) = self.predicate {
            if p != &statement.predicate {
                return false;
            }
        }
        if let Some(ref o) = self.object {
            if o != &statement.object {
                return false;
            }
        }
        if let Some(ref g) = self.graph {
            if g != &statement.graph {
                return false;
            }
        }
        true
    }
}
