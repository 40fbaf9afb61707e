//! # Innate Primitives
//!
//! Compiled-in defaults and vocabulary for the OntoView CORE.
//!
//! Every limit here is only a default: hosts override them through
//! [`ResolveOptions`](crate::options::ResolveOptions). The vocabulary IRIs are
//! fixed.

// =============================================================================
// RESOLUTION LIMITS
// =============================================================================

/// Default maximum import recursion depth. The root document is depth 0.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Default maximum number of documents loaded across one import closure.
pub const DEFAULT_MAX_TOTAL_DOCUMENTS: usize = 100;

/// Default maximum number of imports a single document may declare.
pub const DEFAULT_MAX_IMPORTS_PER_DOCUMENT: usize = 20;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Default maximum document size (10 MiB).
///
/// Larger files are rejected before any byte is read.
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Default size above which documents are parsed from a buffered stream
/// instead of being read into memory first (5 MiB).
pub const DEFAULT_STREAM_THRESHOLD_BYTES: u64 = 5 * 1024 * 1024;

// =============================================================================
// VOCABULARY
// =============================================================================

/// `rdf:type`
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// `owl:Ontology`
pub const OWL_ONTOLOGY: &str = "http://www.w3.org/2002/07/owl#Ontology";

/// `owl:imports`
pub const OWL_IMPORTS: &str = "http://www.w3.org/2002/07/owl#imports";

/// Prefix for identities generated when a document declares none.
pub const FALLBACK_IRI_PREFIX: &str = "urn:ontoview:document:";

// =============================================================================
// CANONICALIZATION
// =============================================================================

/// Separator between the document IRI and the counter of a stable
/// anonymous-node id: `{document_iri}_bn{counter}`.
pub const STABLE_BNODE_MARKER: &str = "_bn";

/// Zero-padding width of the stable anonymous-node counter.
pub const STABLE_BNODE_WIDTH: usize = 4;

/// Placeholder substituted for filesystem locations in sanitized messages.
pub const REDACTED_PATH: &str = "[path]";

/// Placeholder substituted for the home directory in sanitized messages.
pub const REDACTED_HOME: &str = "~";
