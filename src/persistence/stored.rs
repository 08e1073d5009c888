//! Primitive on-disk representation of statements
//!
//! Journal records and checkpoints carry statements in this plain-string
//! form so the disk format stays independent of the in-memory term types.
//! Decoding re-validates IRIs and blank node labels.

use super::journal::{JournalError, JournalResult};
use crate::model::{BlankNode, Literal, NamedNode, Object, Statement, Subject, TermError};
use serde::{Deserialize, Serialize};

/// Serialized term for storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoredTerm {
    /// Named node IRI
    Iri(String),
    /// Blank node label
    Blank(String),
    /// Literal with optional language tag or datatype IRI
    Literal {
        value: String,
        language: Option<String>,
        datatype: Option<String>,
    },
}

/// Serialized statement for storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredStatement {
    pub subject: StoredTerm,
    pub predicate: String,
    pub object: StoredTerm,
    pub graph: Option<String>,
}

impl From<&Statement> for StoredStatement {
    fn from(statement: &Statement) -> Self {
        let subject = match &statement.subject {
            Subject::NamedNode(n) => StoredTerm::Iri(n.as_str().to_string()),
            Subject::BlankNode(b) => StoredTerm::Blank(b.as_str().to_string()),
        };
        let object = match &statement.object {
            Object::NamedNode(n) => StoredTerm::Iri(n.as_str().to_string()),
            Object::BlankNode(b) => StoredTerm::Blank(b.as_str().to_string()),
            Object::Literal(l) => StoredTerm::Literal {
                value: l.value().to_string(),
                language: l.language().map(str::to_string),
                datatype: match l.language() {
                    Some(_) => None,
                    None => Some(l.datatype().as_str().to_string()),
                },
            },
        };
        Self {
            subject,
            predicate: statement.predicate.as_str().to_string(),
            object,
            graph: statement.graph.as_ref().map(|g| g.as_str().to_string()),
        }
    }
}

impl StoredStatement {
    /// Rebuild the in-memory statement, re-validating every term
    pub fn decode(&self) -> JournalResult<Statement> {
        let subject = match &self.subject {
            StoredTerm::Iri(iri) => Subject::NamedNode(named(iri)?),
            StoredTerm::Blank(id) => {
                Subject::BlankNode(BlankNode::with_id(id.clone()).map_err(invalid)?)
            }
            StoredTerm::Literal { .. } => {
                return Err(JournalError::InvalidEntry(
                    "literal in subject position".to_string(),
                ))
            }
        };
        let object = match &self.object {
            StoredTerm::Iri(iri) => Object::NamedNode(named(iri)?),
            StoredTerm::Blank(id) => {
                Object::BlankNode(BlankNode::with_id(id.clone()).map_err(invalid)?)
            }
            StoredTerm::Literal {
                value,
                language,
                datatype,
            } => Object::Literal(match (language, datatype) {
                (Some(language), _) => {
                    Literal::with_language(value.clone(), language.clone()).map_err(invalid)?
                }
                (None, Some(datatype)) => Literal::typed(value.clone(), named(datatype)?),
                (None, None) => Literal::simple(value.clone()),
            }),
        };
        let graph = match &self.graph {
            Some(iri) => Some(named(iri)?),
            None => None,
        };
        Ok(Statement::with_graph(
            subject,
            named(&self.predicate)?,
            object,
            graph,
        ))
    }
}

fn named(iri: &str) -> JournalResult<NamedNode> {
    NamedNode::new(iri).map_err(invalid)
}

fn invalid(e: TermError) -> JournalError {
    JournalError::InvalidEntry(e.to_string())
}
