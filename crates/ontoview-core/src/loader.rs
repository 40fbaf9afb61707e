//! # Loader Module
//!
//! Document validation and loading for OntoView CORE.
//!
//! - Validate the location before reading a single byte
//! - Reject symlinks, directories, special files and oversized files
//! - Parse into facts tagged with the document's identity
//! - Extract declared imports and prefix bindings
//! - No global state: the same location always loads the same way

use crate::formats::{RdfFormat, Statement, extract_prefixes, parse_statements};
use crate::options::LoadOptions;
use crate::primitives::{FALLBACK_IRI_PREFIX, OWL_IMPORTS, OWL_ONTOLOGY, RDF_TYPE};
use crate::{Document, Fact, Iri, OntoError, ResolutionWarning, sanitize_message};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};

// =============================================================================
// LOADER TRAIT
// =============================================================================

/// A document together with the non-fatal conditions seen while loading it.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub document: Document,
    pub warnings: Vec<ResolutionWarning>,
}

/// The DocumentLoader trait is the seam between storage and the resolver.
///
/// Implementations must be stateless with respect to the resolution: the
/// resolver decides what to load and when, the loader only loads.
pub trait DocumentLoader {
    /// Load and parse the document at `location`.
    fn load(&self, location: &Path, options: &LoadOptions) -> Result<LoadedDocument, OntoError>;
}

impl<L: DocumentLoader + ?Sized> DocumentLoader for &L {
    fn load(&self, location: &Path, options: &LoadOptions) -> Result<LoadedDocument, OntoError> {
        (**self).load(location, options)
    }
}

// =============================================================================
// FILE LOADER
// =============================================================================

/// Loads documents from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoader;

impl FileLoader {
    /// Create a new file loader.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Validate a location.
    ///
    /// A location is valid if:
    /// - It exists and is readable
    /// - It is not a symbolic link (checked without following it)
    /// - It is a regular file
    /// - Its size is within `max_file_size_bytes`
    ///
    /// Returns the file size on success.
    pub fn validate(location: &Path, options: &LoadOptions) -> Result<u64, OntoError> {
        let metadata =
            std::fs::symlink_metadata(location).map_err(|e| io_error(location, &e))?;

        if metadata.file_type().is_symlink() {
            return Err(OntoError::SymlinkRejected {
                location: location.to_path_buf(),
            });
        }

        if !metadata.is_file() {
            return Err(OntoError::NotRegularFile {
                location: location.to_path_buf(),
            });
        }

        let size = metadata.len();
        if size > options.max_file_size_bytes {
            return Err(OntoError::FileTooLarge {
                location: location.to_path_buf(),
                size,
                limit: options.max_file_size_bytes,
            });
        }

        Ok(size)
    }
}

impl DocumentLoader for FileLoader {
    fn load(&self, location: &Path, options: &LoadOptions) -> Result<LoadedDocument, OntoError> {
        let size = Self::validate(location, options)?;
        let mut warnings = Vec::new();

        let format = match RdfFormat::from_extension(location) {
            Some(format) => format,
            None => {
                let warning = ResolutionWarning::ExtensionMismatch {
                    location: location.to_path_buf(),
                    extension: location
                        .extension()
                        .map(|e| e.to_string_lossy().into_owned()),
                };
                tracing::warn!("{}", warning);
                warnings.push(warning);
                RdfFormat::Turtle
            }
        };

        let mut prefix_bindings = BTreeMap::new();
        let statements = if size > options.stream_threshold_bytes {
            tracing::debug!(
                location = %location.display(),
                size,
                "streaming document"
            );
            let file = File::open(location).map_err(|e| io_error(location, &e))?;
            for line in BufReader::new(file).lines() {
                let line = line.map_err(|e| io_error(location, &e))?;
                extract_prefixes(&line, format, &mut prefix_bindings);
            }
            let file = File::open(location).map_err(|e| io_error(location, &e))?;
            parse_statements(BufReader::new(file), format)
        } else {
            let bytes = std::fs::read(location).map_err(|e| io_error(location, &e))?;
            extract_prefixes(&String::from_utf8_lossy(&bytes), format, &mut prefix_bindings);
            parse_statements(Cursor::new(bytes), format)
        }
        .map_err(|message| OntoError::Parse {
            location: location.to_path_buf(),
            message: sanitize_message(&message),
        })?;

        let ontology = declared_identity(&statements);
        let declared_imports = declared_imports(&statements, ontology.as_ref());

        let declared_iri = match &options.iri_override {
            Some(iri) => Iri::new(iri.as_str()),
            None => ontology.unwrap_or_else(|| fallback_iri(location)),
        };

        let facts = statements
            .into_iter()
            .map(|st| Fact::new(st.subject, st.predicate, st.object, declared_iri.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        if facts.is_empty() {
            let warning = ResolutionWarning::EmptyDocument {
                iri: declared_iri.clone(),
            };
            tracing::warn!("{}", warning);
            warnings.push(warning);
        }

        tracing::debug!(
            iri = %declared_iri,
            format = format.name(),
            facts = facts.len(),
            imports = declared_imports.len(),
            "document loaded"
        );

        Ok(LoadedDocument {
            document: Document {
                location: location.to_path_buf(),
                declared_iri,
                prefix_bindings,
                facts,
                declared_imports,
                resolution_depth: 0,
            },
            warnings,
        })
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn io_error(location: &Path, err: &std::io::Error) -> OntoError {
    let location = location.to_path_buf();
    match err.kind() {
        std::io::ErrorKind::NotFound => OntoError::NotFound { location },
        std::io::ErrorKind::PermissionDenied => OntoError::PermissionDenied { location },
        _ => OntoError::Io {
            location,
            message: sanitize_message(&err.to_string()),
        },
    }
}

/// The first IRI declared `rdf:type owl:Ontology`, in document order.
fn declared_identity(statements: &[Statement]) -> Option<Iri> {
    statements.iter().find_map(|st| {
        let is_ontology = st.predicate.as_str() == RDF_TYPE
            && st.object.as_iri().is_some_and(|o| o.as_str() == OWL_ONTOLOGY);
        if is_ontology {
            st.subject.as_iri().cloned()
        } else {
            None
        }
    })
}

/// Every `owl:imports` target with an IRI object, deduplicated, in
/// declaration order.
///
/// Only the ontology's own imports count; without an ontology declaration
/// any subject does.
fn declared_imports(statements: &[Statement], ontology: Option<&Iri>) -> Vec<Iri> {
    let mut seen = BTreeSet::new();
    statements
        .iter()
        .filter(|st| st.predicate.as_str() == OWL_IMPORTS)
        .filter(|st| ontology.is_none_or(|o| st.subject.as_iri() == Some(o)))
        .filter_map(|st| st.object.as_iri())
        .filter(|iri| seen.insert((*iri).clone()))
        .cloned()
        .collect()
}

/// Identity for a document that declares none.
///
/// Derived from the canonical location, so loading the same file twice
/// yields the same identity and distinct files never share one.
fn fallback_iri(location: &Path) -> Iri {
    let canonical: PathBuf = location
        .canonicalize()
        .unwrap_or_else(|_| location.to_path_buf());
    let digest = blake3::hash(canonical.to_string_lossy().as_bytes());
    let hex = digest.to_hex();
    Iri::new(format!("{}{}", FALLBACK_IRI_PREFIX, &hex.as_str()[..16]))
}

// =============================================================================
// TESTS
// =============================================================================
