//! # Canonical Export Module
//!
//! Deterministic, bit-exact serialization of a fact store.
//!
//! Store order follows resolution and parse order, which is stable for a
//! given input but not canonical. The export sorts every fact first, so two
//! stores holding the same facts export to identical bytes and the same
//! digest regardless of how they were built.
//!
//! Export is one-way. [`verify_canonical`] checks an export's header and
//! checksum; nothing reads an export back into a store.

use crate::store::CanonicalFactStore;
use crate::{Fact, OntoError, Term};
use serde::{Deserialize, Serialize};

// =============================================================================
// CANONICAL FORMAT
// =============================================================================

/// Magic bytes for canonical export format.
pub const CANONICAL_MAGIC: [u8; 4] = *b"ONTX"; // OntoView eXport

/// Current canonical format version.
pub const CANONICAL_VERSION: u8 = 1;

/// Header for canonical export files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalHeader {
    /// Magic bytes to identify the format.
    pub magic: [u8; 4],

    /// Format version for compatibility.
    pub version: u8,

    /// Number of facts in the export.
    pub fact_count: u64,

    /// Number of provenance documents in the export.
    pub document_count: u64,

    /// First 8 bytes of the BLAKE3 hash of the data section.
    pub checksum: u64,
}

impl CanonicalHeader {
    /// Create a new header with the given counts.
    #[must_use]
    pub fn new(fact_count: u64, document_count: u64, checksum: u64) -> Self {
        Self {
            magic: CANONICAL_MAGIC,
            version: CANONICAL_VERSION,
            fact_count,
            document_count,
            checksum,
        }
    }

    /// Validate magic and version.
    ///
    /// Messages stay generic so they reveal nothing about the format.
    pub fn validate(&self) -> Result<(), OntoError> {
        if self.magic != CANONICAL_MAGIC {
            return Err(OntoError::SerializationError(
                "Invalid file format".to_string(),
            ));
        }
        if self.version != CANONICAL_VERSION {
            return Err(OntoError::SerializationError(
                "Unsupported file version".to_string(),
            ));
        }
        Ok(())
    }
}

/// The facts of a store in canonical order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalFactSet {
    /// Facts sorted by (subject, predicate, object, provenance).
    pub facts: Vec<Fact>,
}

impl CanonicalFactSet {
    /// Collect and sort the facts of a store.
    #[must_use]
    pub fn from_store(store: &CanonicalFactStore) -> Self {
        let mut facts = store.facts().to_vec();
        facts.sort();
        Self { facts }
    }

    /// Number of distinct provenance documents.
    #[must_use]
    pub fn document_count(&self) -> usize {
        let mut docs: Vec<_> = self.facts.iter().map(Fact::provenance).collect();
        docs.sort();
        docs.dedup();
        docs.len()
    }
}

fn data_checksum(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut first = [0u8; 8];
    first.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(first)
}

// =============================================================================
// EXPORT FUNCTIONS
// =============================================================================

/// Export a store to canonical postcard format.
///
/// Format:
/// ```text
/// [header_len: u32 LE] [CanonicalHeader (postcard)] [CanonicalFactSet (postcard)]
/// ```
pub fn export_canonical(store: &CanonicalFactStore) -> Result<Vec<u8>, OntoError> {
    let canonical = CanonicalFactSet::from_store(store);

    let data_bytes = postcard::to_allocvec(&canonical)
        .map_err(|e| OntoError::SerializationError(format!("Data: {}", e)))?;

    let header = CanonicalHeader::new(
        canonical.facts.len() as u64,
        canonical.document_count() as u64,
        data_checksum(&data_bytes),
    );
    let header_bytes = postcard::to_allocvec(&header)
        .map_err(|e| OntoError::SerializationError(format!("Header: {}", e)))?;

    let mut result = Vec::with_capacity(4 + header_bytes.len() + data_bytes.len());
    result.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
    result.extend_from_slice(&header_bytes);
    result.extend_from_slice(&data_bytes);

    Ok(result)
}

/// BLAKE3 hex digest of the canonical export.
///
/// Equal digests mean equal fact sets; use it to compare runs.
pub fn canonical_digest(store: &CanonicalFactStore) -> Result<String, OntoError> {
    let bytes = export_canonical(store)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

/// Check an export's header and data checksum.
///
/// Returns the header on success.
pub fn verify_canonical(data: &[u8]) -> Result<CanonicalHeader, OntoError> {
    let too_short = || OntoError::SerializationError("Data too short".to_string());

    let len_bytes: [u8; 4] = data
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(too_short)?;
    let header_len = u32::from_le_bytes(len_bytes) as usize;

    let header_bytes = data.get(4..4 + header_len).ok_or_else(too_short)?;
    let header: CanonicalHeader = postcard::from_bytes(header_bytes)
        .map_err(|e| OntoError::SerializationError(format!("Header: {}", e)))?;
    header.validate()?;

    let data_bytes = data.get(4 + header_len..).ok_or_else(too_short)?;
    if data_checksum(data_bytes) != header.checksum {
        return Err(OntoError::SerializationError(
            "Checksum mismatch".to_string(),
        ));
    }

    Ok(header)
}

// =============================================================================
// TEXT EXPORT
// =============================================================================

/// Render the store as N-Triples in canonical order, one line per fact.
///
/// Provenance is not part of N-Triples, so facts that differ only in
/// provenance collapse into one line. Stable anonymous-node ids embed an
/// IRI and are not valid blank node labels as-is; they are encoded with
/// every byte outside `[A-Za-z0-9]` written as `_XX`.
#[must_use]
pub fn export_ntriples(store: &CanonicalFactStore) -> String {
    let canonical = CanonicalFactSet::from_store(store);
    let mut lines: Vec<String> = canonical
        .facts
        .iter()
        .map(|f| {
            format!(
                "{} <{}> {} .",
                ntriples_term(f.subject()),
                f.predicate(),
                ntriples_term(f.object())
            )
        })
        .collect();
    lines.dedup();

    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn ntriples_term(term: &Term) -> String {
    match term {
        Term::AnonymousNode(id) => {
            let mut label = String::from("_:b");
            for byte in id.bytes() {
                if byte.is_ascii_alphanumeric() {
                    label.push(byte as char);
                } else {
                    label.push_str(&format!("_{:02X}", byte));
                }
            }
            label
        }
        Term::Iri(_) | Term::Literal(_) => term.to_string(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
