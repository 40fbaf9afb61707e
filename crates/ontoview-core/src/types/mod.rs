//! # Core Type Definitions
//!
//! This module contains the value types shared by every pipeline stage:
//! - Identifiers (`Iri`)
//! - Terms and facts (`Term`, `Literal`, `Fact`)
//! - Loaded documents (`Document`)
//! - Errors and warnings (`OntoError`, `ResolutionWarning`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Implement `Ord` so collections of them can be sorted canonically
//! - Are plain values with no identity beyond their fields
//! - Hold no references into the documents they were parsed from

mod error;

pub use error::{OntoError, ResolutionWarning, sanitize_message, sanitize_with_home};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

// =============================================================================
// IRI
// =============================================================================

/// A globally unique identifier naming a document or an entity.
///
/// The CORE does not validate IRI syntax; that is the parser's job. An `Iri`
/// is only ever compared, hashed and ordered as a string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(pub String);

impl Iri {
    /// Create a new IRI from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the IRI as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Iri {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// =============================================================================
// TERMS
// =============================================================================

/// A literal value with optional datatype IRI and language tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Literal {
    /// The lexical form.
    pub value: String,
    /// Datatype IRI, if the literal is typed.
    pub datatype: Option<Iri>,
    /// Language tag, if the literal is language-tagged.
    pub language: Option<String>,
}

impl Literal {
    /// A plain literal with neither datatype nor language.
    #[must_use]
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    /// A typed literal.
    #[must_use]
    pub fn typed(value: impl Into<String>, datatype: Iri) -> Self {
        Self {
            value: value.into(),
            datatype: Some(datatype),
            language: None,
        }
    }

    /// A language-tagged literal.
    #[must_use]
    pub fn tagged(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }
}

/// A term in subject, predicate or object position.
///
/// Closed sum type: every consumer matches all three variants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Term {
    /// A named resource.
    Iri(Iri),
    /// A resource with only a document-local identifier.
    AnonymousNode(String),
    /// A literal value.
    Literal(Literal),
}

impl Term {
    /// Convenience constructor for an IRI term.
    #[must_use]
    pub fn iri(s: impl Into<String>) -> Self {
        Self::Iri(Iri::new(s))
    }

    /// Convenience constructor for an anonymous node.
    #[must_use]
    pub fn anonymous(id: impl Into<String>) -> Self {
        Self::AnonymousNode(id.into())
    }

    /// Convenience constructor for a plain literal.
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(Literal::plain(value))
    }

    /// The IRI, if this term is one.
    #[must_use]
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Self::Iri(iri) => Some(iri),
            Self::AnonymousNode(_) | Self::Literal(_) => None,
        }
    }

    /// Check if this term is an anonymous node.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::AnonymousNode(_))
    }

    /// Parse a term from its N-Triples form.
    ///
    /// Accepts `<iri>`, `_:id` and `"lexical"` optionally followed by
    /// `@lang` or `^^<datatype>`. A bare string that is none of those is
    /// taken as an IRI, which is what command-line callers usually type.
    pub fn parse(text: &str) -> Result<Self, OntoError> {
        let s = text.trim();
        if s.is_empty() {
            return Err(OntoError::InvalidTerm(text.to_string()));
        }

        if let Some(rest) = s.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
            return Ok(Self::iri(rest));
        }

        if let Some(rest) = s.strip_prefix("_:") {
            return Ok(Self::anonymous(rest));
        }

        if s.starts_with('"') {
            return parse_literal(s).map(Self::Literal);
        }

        Ok(Self::iri(s))
    }
}

fn parse_literal(s: &str) -> Result<Literal, OntoError> {
    let mut end_quote = None;
    let mut escaped = false;
    for (i, ch) in s.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => {
                end_quote = Some(i);
                break;
            }
            _ => {}
        }
    }
    let Some(end) = end_quote else {
        return Err(OntoError::InvalidTerm(s.to_string()));
    };

    let value = unescape(&s[1..end]);
    let rest = s[end + 1..].trim();

    if rest.is_empty() {
        return Ok(Literal::plain(value));
    }
    if let Some(lang) = rest.strip_prefix('@') {
        return Ok(Literal::tagged(value, lang));
    }
    if let Some(dt) = rest.strip_prefix("^^") {
        let dt = dt.trim();
        let dt = dt
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .unwrap_or(dt);
        return Ok(Literal::typed(value, Iri::new(dt)));
    }

    Err(OntoError::InvalidTerm(s.to_string()))
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            other => out.push(other),
        }
    }
    out
}

impl fmt::Display for Term {
    /// N-Triples form; `Term::parse` reads it back.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => write!(f, "<{}>", iri),
            Self::AnonymousNode(id) => write!(f, "_:{}", id),
            Self::Literal(lit) => {
                write!(f, "\"{}\"", escape(&lit.value))?;
                if let Some(lang) = &lit.language {
                    write!(f, "@{}", lang)
                } else if let Some(dt) = &lit.datatype {
                    write!(f, "^^<{}>", dt)
                } else {
                    Ok(())
                }
            }
        }
    }
}

// =============================================================================
// FACT
// =============================================================================

/// A (subject, predicate, object) assertion tagged with the document that
/// asserted it.
///
/// Fields are private so the positional invariants hold for every value:
/// the subject is never a literal and the predicate is always an IRI.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fact {
    subject: Term,
    predicate: Iri,
    object: Term,
    provenance: Iri,
}

impl Fact {
    /// Create a new fact.
    ///
    /// Returns `OntoError::LiteralSubject` if the subject is a literal.
    pub fn new(
        subject: Term,
        predicate: Iri,
        object: Term,
        provenance: Iri,
    ) -> Result<Self, OntoError> {
        match subject {
            Term::Literal(_) => Err(OntoError::LiteralSubject {
                predicate: predicate.0,
            }),
            Term::Iri(_) | Term::AnonymousNode(_) => Ok(Self {
                subject,
                predicate,
                object,
                provenance,
            }),
        }
    }

    /// The subject term (IRI or anonymous node).
    #[must_use]
    pub fn subject(&self) -> &Term {
        &self.subject
    }

    /// The predicate IRI.
    #[must_use]
    pub fn predicate(&self) -> &Iri {
        &self.predicate
    }

    /// The object term.
    #[must_use]
    pub fn object(&self) -> &Term {
        &self.object
    }

    /// IRI of the document that asserted this fact.
    #[must_use]
    pub fn provenance(&self) -> &Iri {
        &self.provenance
    }

    /// Rebuild the fact with subject and object passed through `f`.
    ///
    /// Predicate and provenance are untouched. `f` must not turn the subject
    /// into a literal; the normalizer only ever maps anonymous nodes to
    /// anonymous nodes.
    #[must_use]
    pub fn map_nodes(self, mut f: impl FnMut(Term) -> Term) -> Self {
        Self {
            subject: f(self.subject),
            predicate: self.predicate,
            object: f(self.object),
            provenance: self.provenance,
        }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} <{}> {} .",
            self.subject, self.predicate, self.object
        )
    }
}

// =============================================================================
// DOCUMENT
// =============================================================================

/// One parsed document.
///
/// Created once by the loader; the resolver only stamps its depth before
/// moving it into the document map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Where the document was read from.
    pub location: PathBuf,
    /// The document's identity IRI (the provenance of its facts).
    pub declared_iri: Iri,
    /// Namespace prefix bindings declared in the document (prefix -> IRI).
    pub prefix_bindings: BTreeMap<String, String>,
    /// Facts asserted by the document, in parse order.
    pub facts: Vec<Fact>,
    /// Import targets declared by the document, in declaration order.
    pub declared_imports: Vec<Iri>,
    /// Distance from the root document (root = 0).
    pub resolution_depth: usize,
}

impl Document {
    /// Return the document stamped with the given resolution depth.
    #[must_use]
    pub fn at_depth(mut self, depth: usize) -> Self {
        self.resolution_depth = depth;
        self
    }

    /// Check if the document asserted no facts at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
