//! # Pipeline
//!
//! Resolve, normalize, index: the whole CORE in one call.

use crate::loader::{DocumentLoader, FileLoader};
use crate::normalizer::normalize_documents;
use crate::options::ResolveOptions;
use crate::resolver::{ImportChain, Resolver};
use crate::store::CanonicalFactStore;
use crate::{Document, Iri, OntoError, ResolutionWarning};
use std::collections::BTreeMap;
use std::path::Path;

/// A fully ingested import closure.
#[derive(Debug, Clone)]
pub struct Ingestion {
    pub store: CanonicalFactStore,
    pub chain: ImportChain,
    pub warnings: Vec<ResolutionWarning>,
    /// Prefix bindings per document, for display.
    pub prefixes: BTreeMap<Iri, BTreeMap<String, String>>,
}

/// Ingest the closure rooted at `root` through `loader`.
pub fn ingest<L: DocumentLoader>(
    loader: L,
    root: &Path,
    options: &ResolveOptions,
) -> Result<Ingestion, OntoError> {
    let resolution = Resolver::new(loader, options.clone()).resolve(root)?;

    let facts = normalize_documents(resolution.documents.values());
    let store = CanonicalFactStore::build(facts);

    let prefixes = resolution
        .documents
        .values()
        .map(|doc: &Document| (doc.declared_iri.clone(), doc.prefix_bindings.clone()))
        .collect();

    tracing::info!(
        root = %resolution.chain.root_iri,
        documents = resolution.documents.len(),
        facts = store.count(),
        "ingestion complete"
    );

    Ok(Ingestion {
        store,
        chain: resolution.chain,
        warnings: resolution.warnings,
        prefixes,
    })
}

/// Ingest from the local filesystem.
pub fn ingest_file(root: &Path, options: &ResolveOptions) -> Result<Ingestion, OntoError> {
    ingest(FileLoader::new(), root, options)
}
