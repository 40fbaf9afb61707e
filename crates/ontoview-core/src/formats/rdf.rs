//! Statement parsing through Sophia.
//!
//! Sophia's parsers hand back terms whose `Display` is the N-Triples form, so
//! each term is rendered and read back with [`Term::parse`]. That keeps the
//! CORE independent of Sophia's term types.

use super::RdfFormat;
use crate::{Iri, OntoError, Term};
use sophia::api::prelude::*;
use std::io::BufRead;

/// One parsed statement, not yet tagged with provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub subject: Term,
    pub predicate: Iri,
    pub object: Term,
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
struct TermSyntaxError {
    message: String,
}

impl From<OntoError> for TermSyntaxError {
    fn from(value: OntoError) -> Self {
        Self {
            message: value.to_string(),
        }
    }
}

fn push_statement(
    out: &mut Vec<Statement>,
    subject: String,
    predicate: String,
    object: String,
) -> Result<(), TermSyntaxError> {
    let subject = Term::parse(&subject)?;
    let Term::Iri(predicate) = Term::parse(&predicate)? else {
        // generalized RDF; predicates must be IRIs here
        return Ok(());
    };
    let object = Term::parse(&object)?;
    out.push(Statement {
        subject,
        predicate,
        object,
    });
    Ok(())
}

/// Parse every statement of a document.
///
/// The error is the parser's own message, unsanitized; the loader scrubs it
/// before it leaves the CORE.
pub fn parse_statements<R: BufRead>(reader: R, format: RdfFormat) -> Result<Vec<Statement>, String> {
    let mut out: Vec<Statement> = Vec::new();

    match format {
        RdfFormat::Turtle => {
            let mut parser = sophia::turtle::parser::turtle::parse_bufread(reader);
            parser
                .try_for_each_triple(|t| {
                    push_statement(
                        &mut out,
                        t.s().to_string(),
                        t.p().to_string(),
                        t.o().to_string(),
                    )
                })
                .map_err(|e| format!("failed to parse Turtle: {e}"))?;
        }
        RdfFormat::NTriples => {
            let mut parser = sophia::turtle::parser::nt::parse_bufread(reader);
            parser
                .try_for_each_triple(|t| {
                    push_statement(
                        &mut out,
                        t.s().to_string(),
                        t.p().to_string(),
                        t.o().to_string(),
                    )
                })
                .map_err(|e| format!("failed to parse N-Triples: {e}"))?;
        }
        RdfFormat::RdfXml => {
            let mut parser = sophia::xml::parser::parse_bufread(reader);
            parser
                .try_for_each_triple(|t| {
                    push_statement(
                        &mut out,
                        t.s().to_string(),
                        t.p().to_string(),
                        t.o().to_string(),
                    )
                })
                .map_err(|e| format!("failed to parse RDF/XML: {e}"))?;
        }
    }

    Ok(out)
}
