//! # Serialization Formats
//!
//! Format detection and parsing for the document serializations the loader
//! accepts. Parsing itself is delegated to Sophia; this module only turns its
//! output into CORE terms.
//!
//! | Extension | Format |
//! |-----------|--------|
//! | `.ttl`, `.turtle` | Turtle |
//! | `.nt`, `.ntriples` | N-Triples |
//! | `.rdf`, `.owl`, `.xml` | RDF/XML |
//!
//! Anything else is parsed as Turtle, and the loader reports a warning.

mod prefixes;
mod rdf;

pub use prefixes::extract_prefixes;
pub use rdf::{Statement, parse_statements};

use std::path::Path;

/// A supported document serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    Turtle,
    NTriples,
    RdfXml,
}

impl RdfFormat {
    /// Detect the format from a file extension (case-insensitive).
    ///
    /// Returns `None` for unknown or missing extensions.
    #[must_use]
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "ttl" | "turtle" => Some(Self::Turtle),
            "nt" | "ntriples" => Some(Self::NTriples),
            "rdf" | "owl" | "xml" => Some(Self::RdfXml),
            _ => None,
        }
    }

    /// File extensions probed, in order, when guessing a location from an IRI.
    #[must_use]
    pub fn probe_extensions() -> &'static [&'static str] {
        &["ttl", "owl", "rdf", "nt"]
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Turtle => "Turtle",
            Self::NTriples => "N-Triples",
            Self::RdfXml => "RDF/XML",
        }
    }
}
