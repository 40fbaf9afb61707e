//! # Options
//!
//! Host-supplied configuration for loading and resolution.
//!
//! The CORE never reads configuration from disk. Hosts build these values in
//! code or deserialize them from whatever source they like; every field has a
//! serde default so partial configurations are accepted.

use crate::OntoError;
use crate::primitives::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_FILE_SIZE_BYTES, DEFAULT_MAX_IMPORTS_PER_DOCUMENT,
    DEFAULT_MAX_TOTAL_DOCUMENTS, DEFAULT_STREAM_THRESHOLD_BYTES,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Options for loading a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Documents larger than this are rejected.
    pub max_file_size_bytes: u64,
    /// Documents larger than this are parsed from a buffered stream.
    pub stream_threshold_bytes: u64,
    /// Identity to use instead of the one declared in the document.
    pub iri_override: Option<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            stream_threshold_bytes: DEFAULT_STREAM_THRESHOLD_BYTES,
            iri_override: None,
        }
    }
}

/// Options for resolving an import closure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    /// Maximum import depth; the root is depth 0.
    pub max_depth: usize,
    /// Maximum number of documents loaded across the closure.
    pub max_total_documents: usize,
    /// Maximum number of imports declared by any single document.
    pub max_imports_per_document: usize,
    /// Explicit IRI -> location mapping. Relative locations are taken
    /// relative to the base directory.
    pub iri_location_map: BTreeMap<String, PathBuf>,
    /// Search root for convention-based lookup and sandbox for `file:`
    /// imports. Defaults to the root document's directory.
    pub base_directory: Option<PathBuf>,
    /// Per-document loading options. `iri_override` applies to the root only.
    pub load: LoadOptions,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_total_documents: DEFAULT_MAX_TOTAL_DOCUMENTS,
            max_imports_per_document: DEFAULT_MAX_IMPORTS_PER_DOCUMENT,
            iri_location_map: BTreeMap::new(),
            base_directory: None,
            load: LoadOptions::default(),
        }
    }
}

impl ResolveOptions {
    /// Create options with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum import depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the maximum number of documents in the closure.
    #[must_use]
    pub fn with_max_total_documents(mut self, max_total_documents: usize) -> Self {
        self.max_total_documents = max_total_documents;
        self
    }

    /// Set the maximum number of imports per document.
    #[must_use]
    pub fn with_max_imports_per_document(mut self, max_imports: usize) -> Self {
        self.max_imports_per_document = max_imports;
        self
    }

    /// Set the base directory.
    #[must_use]
    pub fn with_base_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_directory = Some(dir.into());
        self
    }

    /// Map an IRI to an explicit location.
    #[must_use]
    pub fn with_location(mut self, iri: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        self.iri_location_map.insert(iri.into(), location.into());
        self
    }

    /// Check the options for internal consistency.
    pub fn validate(&self) -> Result<(), OntoError> {
        if self.load.stream_threshold_bytes > self.load.max_file_size_bytes {
            return Err(OntoError::InvalidOptions(format!(
                "stream threshold {} exceeds maximum file size {}",
                self.load.stream_threshold_bytes, self.load.max_file_size_bytes
            )));
        }
        if self.iri_location_map.keys().any(|iri| iri.trim().is_empty()) {
            return Err(OntoError::InvalidOptions(
                "IRI location map contains an empty IRI".to_string(),
            ));
        }
        Ok(())
    }

    /// The base directory, falling back to the root document's parent.
    #[must_use]
    pub fn base_directory_for(&self, root: &Path) -> PathBuf {
        match &self.base_directory {
            Some(dir) => dir.clone(),
            None => root
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    /// Loading options for imported documents (never carries the override).
    #[must_use]
    pub fn import_load_options(&self) -> LoadOptions {
        LoadOptions {
            iri_override: None,
            ..self.load.clone()
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
