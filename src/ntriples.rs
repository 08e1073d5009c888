//! N-Triples reader and writer
//!
//! Line-based plain text, one `<subject> <predicate> <object> .` statement
//! per line. Parsing is delegated to `rio_turtle`; this module only converts
//! between rio's borrowed model and the crate's owned terms. Used to load
//! fixtures and exchange small data sets, not as a storage format.

use crate::model::{BlankNode, Literal, NamedNode, Object, Statement, Subject, TermError};
use rio_api::model as rio;
use rio_api::parser::TriplesParser;
use rio_turtle::{NTriplesParser, TurtleError};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

/// Parse errors
#[derive(Error, Debug)]
pub enum ParseError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Syntax error
    #[error("Parse error: {0}")]
    Syntax(#[from] TurtleError),

    /// A parsed term failed validation
    #[error("Invalid term: {0}")]
    Term(#[from] TermError),

    /// A term kind the store does not model
    #[error("Unsupported term: {0}")]
    Unsupported(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse N-Triples from a reader
pub fn read(reader: impl BufRead) -> ParseResult<Vec<Statement>> {
    let mut statements = Vec::new();
    NTriplesParser::new(reader).parse_all(&mut |triple| -> ParseResult<()> {
        statements.push(convert(triple)?);
        Ok(())
    })?;
    Ok(statements)
}

/// Parse N-Triples from a string
pub fn read_str(input: &str) -> ParseResult<Vec<Statement>> {
    read(input.as_bytes())
}

/// Parse an N-Triples file
pub fn read_file(path: impl AsRef<Path>) -> ParseResult<Vec<Statement>> {
    read(BufReader::new(File::open(path)?))
}

/// Write statements as N-Triples lines
///
/// Statements carrying a graph name serialize with the graph as a fourth
/// term (N-Quads form).
pub fn write<'a, W: Write>(
    writer: &mut W,
    statements: impl IntoIterator<Item = &'a Statement>,
) -> io::Result<()> {
    for statement in statements {
        writeln!(writer, "{}", statement)?;
    }
    Ok(())
}

/// Serialize statements to an N-Triples string
pub fn to_string<'a>(statements: impl IntoIterator<Item = &'a Statement>) -> String {
    use std::fmt::Write as _;
    let mut out = String::new();
    for statement in statements {
        let _ = writeln!(out, "{}", statement);
    }
    out
}

fn convert(triple: rio::Triple<'_>) -> ParseResult<Statement> {
    let subject = match triple.subject {
        rio::Subject::NamedNode(n) => Subject::NamedNode(NamedNode::new(n.iri)?),
        rio::Subject::BlankNode(b) => Subject::BlankNode(BlankNode::with_id(b.id)?),
        #[allow(unreachable_patterns)]
        other => return Err(ParseError::Unsupported(other.to_string())),
    };
    let predicate = NamedNode::new(triple.predicate.iri)?;
    let object = match triple.object {
        rio::Term::NamedNode(n) => Object::NamedNode(NamedNode::new(n.iri)?),
        rio::Term::BlankNode(b) => Object::BlankNode(BlankNode::with_id(b.id)?),
        rio::Term::Literal(l) => Object::Literal(convert_literal(l)?),
        #[allow(unreachable_patterns)]
        other => return Err(ParseError::Unsupported(other.to_string())),
    };
    Ok(Statement::new(subject, predicate, object))
}

fn convert_literal(literal: rio::Literal<'_>) -> ParseResult<Literal> {
    Ok(match literal {
        rio::Literal::Simple { value } => Literal::simple(value),
        rio::Literal::LanguageTaggedString { value, language } => {
            Literal::with_language(value, language)?
        }
        rio::Literal::Typed { value, datatype } => {
            Literal::typed(value, NamedNode::new(datatype.iri)?)
        }
    })
}
