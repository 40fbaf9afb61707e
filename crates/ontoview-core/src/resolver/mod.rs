//! # Resolver Module
//!
//! Computes the transitive import closure of a root document.
//!
//! Depth-first: validate limits, load the node, read its imports, check each
//! against the active branch for cycles, then recurse into the ones not yet
//! loaded. All state lives in a [`ResolutionContext`] threaded through the
//! recursion, so independent resolutions share nothing.
//!
//! ## Failure Model
//!
//! - Limit violations and cycles abort the whole resolution
//! - An input error on the root, or on a located import, aborts it too
//! - An import that cannot be located is a warning and is skipped

mod chain;
mod locate;

pub use chain::{ChainEntry, ChainImport, ImportChain};
pub use locate::IriLocator;

use crate::loader::{DocumentLoader, FileLoader};
use crate::options::{LoadOptions, ResolveOptions};
use crate::{Document, Iri, OntoError, ResolutionWarning};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Outcome of a successful resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Every loaded document, keyed by identity IRI.
    pub documents: BTreeMap<Iri, Document>,
    pub chain: ImportChain,
    pub warnings: Vec<ResolutionWarning>,
}

impl Resolution {
    /// The root document.
    #[must_use]
    pub fn root(&self) -> Option<&Document> {
        self.documents.get(&self.chain.root_iri)
    }

    /// Total facts across all documents, before normalization.
    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.documents.values().map(|d| d.facts.len()).sum()
    }
}

/// Mutable state of one resolution attempt.
#[derive(Debug, Default)]
struct ResolutionContext {
    /// Identities on the current branch, root first.
    path: Vec<Iri>,
    /// Identities already loaded anywhere in the closure.
    visited: BTreeSet<Iri>,
    /// Import IRI -> identity of the document it led to.
    aliases: BTreeMap<Iri, Iri>,
    /// Canonical location -> identity loaded from it.
    by_location: BTreeMap<PathBuf, Iri>,
    documents: BTreeMap<Iri, Document>,
    warnings: Vec<ResolutionWarning>,
    loads: usize,
}

impl ResolutionContext {
    /// Decide what to do with an import whose identity is already known.
    ///
    /// Cycle check first: an identity on the active branch is fatal even
    /// though it is also visited.
    fn check_known(&self, identity: &Iri) -> Result<(), OntoError> {
        if self.path.contains(identity) {
            return Err(OntoError::CircularDependency {
                path: self.path.clone(),
                closing: identity.clone(),
            });
        }
        Ok(())
    }
}

/// Resolve the import closure of `root` from the local filesystem.
pub fn resolve(root: &Path, options: &ResolveOptions) -> Result<Resolution, OntoError> {
    Resolver::new(FileLoader::new(), options.clone()).resolve(root)
}

/// Import resolver over any [`DocumentLoader`].
#[derive(Debug, Clone)]
pub struct Resolver<L> {
    loader: L,
    options: ResolveOptions,
}

impl<L: DocumentLoader> Resolver<L> {
    /// Create a resolver.
    #[must_use]
    pub fn new(loader: L, options: ResolveOptions) -> Self {
        Self { loader, options }
    }

    /// The options this resolver runs with.
    #[must_use]
    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolve the closure rooted at `root`.
    ///
    /// Partial results are never returned: either the whole closure
    /// resolved, or the first fatal error is.
    pub fn resolve(&self, root: &Path) -> Result<Resolution, OntoError> {
        self.options.validate()?;

        let locator = IriLocator::new(&self.options, root);
        let mut ctx = ResolutionContext::default();

        tracing::debug!(
            root = %root.display(),
            base = %locator.base_directory().display(),
            "resolution started"
        );

        let root_iri = self.visit(&mut ctx, &locator, root, 0, None)?;
        let chain = ImportChain::from_documents(&root_iri, &ctx.documents, &ctx.aliases);

        tracing::info!(
            root = %root_iri,
            documents = ctx.documents.len(),
            max_depth = chain.max_depth_reached,
            warnings = ctx.warnings.len(),
            "resolution complete"
        );

        Ok(Resolution {
            documents: ctx.documents,
            chain,
            warnings: ctx.warnings,
        })
    }

    /// Load one node and recurse into its imports. Returns its identity.
    fn visit(
        &self,
        ctx: &mut ResolutionContext,
        locator: &IriLocator,
        location: &Path,
        depth: usize,
        target: Option<&Iri>,
    ) -> Result<Iri, OntoError> {
        if ctx.loads >= self.options.max_total_documents {
            return Err(OntoError::MaxTotalDocumentsExceeded {
                count: ctx.loads + 1,
                limit: self.options.max_total_documents,
            });
        }

        let load_options: LoadOptions = if target.is_none() {
            self.options.load.clone()
        } else {
            self.options.import_load_options()
        };
        let loaded = self.loader.load(location, &load_options)?;
        ctx.loads += 1;
        ctx.warnings.extend(loaded.warnings);

        let document = loaded.document.at_depth(depth);
        let identity = document.declared_iri.clone();

        if let Some(target) = target {
            ctx.aliases.insert(target.clone(), identity.clone());
        }
        ctx.by_location
            .insert(location_key(location), identity.clone());

        ctx.check_known(&identity)?;
        if !ctx.visited.insert(identity.clone()) {
            // two locations declaring one identity: first one wins
            tracing::debug!(
                iri = %identity,
                location = %location.display(),
                "identity already loaded, skipping"
            );
            return Ok(identity);
        }
        ctx.aliases.insert(identity.clone(), identity.clone());

        let imports = document.declared_imports.clone();
        if imports.len() > self.options.max_imports_per_document {
            return Err(OntoError::MaxImportsExceeded {
                iri: identity,
                count: imports.len(),
                limit: self.options.max_imports_per_document,
            });
        }

        tracing::debug!(
            iri = %identity,
            depth,
            imports = imports.len(),
            "document resolved"
        );

        ctx.path.push(identity.clone());
        for import in &imports {
            self.follow(ctx, locator, &identity, import, depth)?;
        }
        ctx.path.pop();

        ctx.documents.insert(identity.clone(), document);
        Ok(identity)
    }

    /// Handle one declared import of `importer`, which sits at `depth`.
    fn follow(
        &self,
        ctx: &mut ResolutionContext,
        locator: &IriLocator,
        importer: &Iri,
        import: &Iri,
        depth: usize,
    ) -> Result<(), OntoError> {
        if let Some(identity) = ctx.aliases.get(import) {
            ctx.check_known(identity)?;
            tracing::trace!(iri = %import, "already loaded");
            return Ok(());
        }

        let Some(location) = locator.locate(import, importer, &mut ctx.warnings) else {
            let warning = ResolutionWarning::UnresolvedImport {
                importer: importer.clone(),
                target: import.clone(),
            };
            tracing::warn!("{}", warning);
            ctx.warnings.push(warning);
            return Ok(());
        };

        if let Some(identity) = ctx.by_location.get(&location_key(&location)).cloned() {
            ctx.check_known(&identity)?;
            ctx.aliases.insert(import.clone(), identity);
            return Ok(());
        }

        let child_depth = depth + 1;
        if child_depth > self.options.max_depth {
            return Err(OntoError::MaxDepthExceeded {
                iri: import.clone(),
                depth: child_depth,
                limit: self.options.max_depth,
            });
        }

        self.visit(ctx, locator, &location, child_depth, Some(import))?;
        Ok(())
    }
}

/// Key for "same file" checks; falls back to the path as given.
fn location_key(location: &Path) -> PathBuf {
    location
        .canonicalize()
        .unwrap_or_else(|_| location.to_path_buf())
}

// =============================================================================
// TESTS
// =============================================================================
