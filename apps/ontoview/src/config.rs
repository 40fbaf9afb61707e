//! # Configuration
//!
//! TOML configuration for the command-line host.
//!
//! ```toml
//! base_directory = "ontologies"
//!
//! [limits]
//! max_depth = 10
//! max_total_documents = 100
//! max_imports_per_document = 20
//!
//! [load]
//! max_file_size_bytes = 10485760
//! stream_threshold_bytes = 5242880
//!
//! [locations]
//! "http://qudt.org/schema/qudt" = "vendor/qudt.ttl"
//! ```
//!
//! Every key is optional. Relative paths are taken relative to the
//! directory holding the configuration file.

use ontoview_core::{FileLoader, LoadOptions, OntoError, ResolveOptions};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Maximum configuration file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Resolution limits section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    pub max_depth: Option<usize>,
    pub max_total_documents: Option<usize>,
    pub max_imports_per_document: Option<usize>,
}

/// Document loading section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadConfig {
    pub max_file_size_bytes: Option<u64>,
    pub stream_threshold_bytes: Option<u64>,
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub base_directory: Option<PathBuf>,
    pub limits: LimitsConfig,
    pub load: LoadConfig,
    /// IRI -> document location.
    pub locations: BTreeMap<String, PathBuf>,
}

impl Config {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, OntoError> {
        toml::from_str(text).map_err(|e| OntoError::InvalidOptions(e.to_string()))
    }

    /// Read and parse a configuration file.
    ///
    /// The file goes through the same validation as a document: no
    /// symlinks, no special files, bounded size.
    pub fn load(path: &Path) -> Result<Self, OntoError> {
        let limits = LoadOptions {
            max_file_size_bytes: MAX_CONFIG_FILE_SIZE,
            stream_threshold_bytes: MAX_CONFIG_FILE_SIZE,
            iri_override: None,
        };
        FileLoader::validate(path, &limits)?;

        let text = std::fs::read_to_string(path).map_err(|e| OntoError::Io {
            location: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml_str(&text)?;

        tracing::debug!(path = %path.display(), "configuration loaded");

        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        Ok(match dir {
            Some(dir) => config.relative_to(dir),
            None => config,
        })
    }

    /// Anchor relative paths at `dir`.
    #[must_use]
    pub fn relative_to(mut self, dir: &Path) -> Self {
        let anchor = |p: PathBuf| if p.is_absolute() { p } else { dir.join(p) };
        self.base_directory = self.base_directory.map(anchor);
        self.locations = self
            .locations
            .into_iter()
            .map(|(iri, p)| (iri, anchor(p)))
            .collect();
        self
    }

    /// Layer this configuration over the defaults.
    #[must_use]
    pub fn into_options(self) -> ResolveOptions {
        let mut options = ResolveOptions::default();

        if let Some(v) = self.limits.max_depth {
            options.max_depth = v;
        }
        if let Some(v) = self.limits.max_total_documents {
            options.max_total_documents = v;
        }
        if let Some(v) = self.limits.max_imports_per_document {
            options.max_imports_per_document = v;
        }
        if let Some(v) = self.load.max_file_size_bytes {
            options.load.max_file_size_bytes = v;
        }
        if let Some(v) = self.load.stream_threshold_bytes {
            options.load.stream_threshold_bytes = v;
        }
        options.base_directory = self.base_directory;
        options.iri_location_map = self.locations;

        options
    }
}

// =============================================================================
// TESTS
// =============================================================================
