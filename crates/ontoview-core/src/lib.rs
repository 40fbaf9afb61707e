//! # ontoview-core
//!
//! The ontology import resolution engine for OntoView - THE LOGIC.
//!
//! Given one root document, this crate computes its transitive import
//! closure, stabilizes anonymous nodes across the closure, and builds an
//! indexed, immutable store of provenance-tagged facts.
//!
//! ## Pipeline
//!
//! ```text
//! loader -> resolver -> normalizer -> store
//! ```
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Never reads configuration from disk; hosts pass options in
//! - Keeps no global state: every resolution owns its context
//! - Never exposes a partial resolution
//! - Has NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod export;
pub mod formats;
pub mod loader;
pub mod normalizer;
pub mod options;
pub mod pipeline;
pub mod primitives;
pub mod query;
pub mod resolver;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Document, Fact, Iri, Literal, OntoError, ResolutionWarning, Term, sanitize_message,
    sanitize_with_home,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use export::{
    CanonicalFactSet, CanonicalHeader, canonical_digest, export_canonical, export_ntriples,
    verify_canonical,
};
pub use formats::RdfFormat;
pub use loader::{DocumentLoader, FileLoader, LoadedDocument};
pub use normalizer::{AnonymousNodeMap, normalize};
pub use options::{LoadOptions, ResolveOptions};
pub use pipeline::{Ingestion, ingest, ingest_file};
pub use query::FactPattern;
pub use resolver::{ChainEntry, ChainImport, ImportChain, Resolution, Resolver, resolve};
pub use store::{CanonicalFactStore, StoreStats};
