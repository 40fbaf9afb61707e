//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::ExportFormat;
use ontoview_core::{
    CanonicalFactSet, Fact, FactPattern, ImportChain, Ingestion, Iri, OntoError, ResolveOptions,
    Term, canonical_digest, export_canonical, export_ntriples, ingest_file,
};
use std::path::{Path, PathBuf};

// =============================================================================
// HELPERS
// =============================================================================

/// Validate output path.
///
/// The parent directory must exist; the returned path is the canonical
/// parent joined with the original file name.
fn validate_output_path(path: &Path) -> Result<PathBuf, OntoError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let canonical_parent = parent.canonicalize().map_err(|e| OntoError::Io {
        location: parent.to_path_buf(),
        message: format!("Invalid output directory: {}", e),
    })?;

    if !canonical_parent.is_dir() {
        return Err(OntoError::Io {
            location: parent.to_path_buf(),
            message: "Output parent is not a directory".to_string(),
        });
    }

    let filename = path.file_name().ok_or_else(|| {
        OntoError::InvalidOptions("Output path has no filename".to_string())
    })?;

    Ok(canonical_parent.join(filename))
}

fn load(root: &Path, options: &ResolveOptions) -> Result<Ingestion, OntoError> {
    let ingestion = ingest_file(root, options)?;
    for warning in &ingestion.warnings {
        tracing::warn!("{}", warning.sanitized());
    }
    Ok(ingestion)
}

/// JSON view of a fact with every term in N-Triples form.
fn fact_json(fact: &Fact) -> serde_json::Value {
    serde_json::json!({
        "subject": fact.subject().to_string(),
        "predicate": fact.predicate().as_str(),
        "object": fact.object().to_string(),
        "provenance": fact.provenance().as_str(),
    })
}

/// JSON summary of an ingestion. Warnings go out sanitized.
fn resolve_json(ingestion: &Ingestion) -> serde_json::Value {
    let warnings: Vec<String> = ingestion.warnings.iter().map(|w| w.sanitized()).collect();
    serde_json::json!({
        "root": ingestion.chain.root_iri,
        "documents": ingestion.chain.len(),
        "max_depth_reached": ingestion.chain.max_depth_reached,
        "stats": ingestion.store.stats(),
        "prefixes": ingestion.prefixes.values().map(|p| p.len()).sum::<usize>(),
        "warnings": warnings,
    })
}

/// JSON view of the chain; locations are reduced to their file names.
fn chain_json(chain: &ImportChain) -> serde_json::Value {
    let documents: Vec<serde_json::Value> = chain
        .documents
        .iter()
        .map(|entry| {
            serde_json::json!({
                "iri": entry.iri,
                "file": entry.location.file_name().map(|n| n.to_string_lossy()),
                "imports": entry.imports,
                "depth": entry.depth,
            })
        })
        .collect();
    serde_json::json!({
        "root_iri": chain.root_iri,
        "documents": documents,
        "max_depth_reached": chain.max_depth_reached,
    })
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// RESOLVE COMMAND
// =============================================================================

/// Resolve and summarize the closure.
pub fn cmd_resolve(root: &Path, options: &ResolveOptions, json_mode: bool) -> Result<(), OntoError> {
    let ingestion = load(root, options)?;

    if json_mode {
        print_json(&resolve_json(&ingestion));
        return Ok(());
    }

    let stats = ingestion.store.stats();
    let prefix_count: usize = ingestion.prefixes.values().map(|p| p.len()).sum();
    let warnings: Vec<String> = ingestion.warnings.iter().map(|w| w.sanitized()).collect();

    println!("OntoView Resolution");
    println!("===================");
    println!("Root:      {}", ingestion.chain.root_iri);
    println!("Documents: {}", ingestion.chain.len());
    println!("Max Depth: {}", ingestion.chain.max_depth_reached);
    println!();
    println!("Facts:      {}", stats.facts);
    println!("Subjects:   {}", stats.distinct_subjects);
    println!("Predicates: {}", stats.distinct_predicates);
    println!("Objects:    {}", stats.distinct_objects);
    println!("Anonymous:  {}", stats.anonymous_nodes);
    println!("Prefixes:   {}", prefix_count);

    if !warnings.is_empty() {
        println!();
        println!("Warnings ({}):", warnings.len());
        for warning in &warnings {
            println!("  - {}", warning);
        }
    }

    Ok(())
}

// =============================================================================
// CHAIN COMMAND
// =============================================================================

/// Show the import chain.
pub fn cmd_chain(root: &Path, options: &ResolveOptions, json_mode: bool) -> Result<(), OntoError> {
    let ingestion = load(root, options)?;

    if json_mode {
        print_json(&chain_json(&ingestion.chain));
        return Ok(());
    }

    print!("{}", ingestion.chain.render_tree());
    Ok(())
}

// =============================================================================
// QUERY COMMAND
// =============================================================================

/// Parse the optional pattern fields given on the command line.
pub fn parse_pattern(
    subject: Option<&str>,
    predicate: Option<&str>,
    object: Option<&str>,
) -> Result<FactPattern, OntoError> {
    let mut pattern = FactPattern::any();

    if let Some(s) = subject {
        pattern = pattern.with_subject(Term::parse(s)?);
    }
    if let Some(p) = predicate {
        match Term::parse(p)? {
            Term::Iri(iri) => pattern = pattern.with_predicate(iri),
            Term::AnonymousNode(_) | Term::Literal(_) => {
                return Err(OntoError::InvalidTerm(format!(
                    "predicate must be an IRI: {}",
                    p
                )));
            }
        }
    }
    if let Some(o) = object {
        pattern = pattern.with_object(Term::parse(o)?);
    }

    Ok(pattern)
}

/// Print facts matching a pattern.
pub fn cmd_query(
    root: &Path,
    options: &ResolveOptions,
    json_mode: bool,
    subject: Option<&str>,
    predicate: Option<&str>,
    object: Option<&str>,
) -> Result<(), OntoError> {
    let pattern = parse_pattern(subject, predicate, object)?;
    let ingestion = load(root, options)?;
    let hits = pattern.evaluate(&ingestion.store);

    if json_mode {
        let facts: Vec<serde_json::Value> = hits.iter().map(|f| fact_json(f)).collect();
        let output = serde_json::json!({
            "count": facts.len(),
            "facts": facts,
        });
        print_json(&output);
        return Ok(());
    }

    let mut current: Option<&Iri> = None;
    for fact in &hits {
        if current != Some(fact.provenance()) {
            current = Some(fact.provenance());
            println!("# {}", fact.provenance());
        }
        println!("{}", fact);
    }
    println!();
    println!("{} fact(s)", hits.len());

    Ok(())
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Export the store.
pub fn cmd_export(
    root: &Path,
    options: &ResolveOptions,
    output: &Path,
    format: ExportFormat,
) -> Result<(), OntoError> {
    let validated_output = validate_output_path(output)?;
    let ingestion = load(root, options)?;

    let data = match format {
        ExportFormat::Canonical => {
            let data = export_canonical(&ingestion.store)?;
            println!("Digest: {}", canonical_digest(&ingestion.store)?);
            data
        }
        ExportFormat::Json => {
            let canonical = CanonicalFactSet::from_store(&ingestion.store);
            let facts: Vec<serde_json::Value> = canonical.facts.iter().map(fact_json).collect();
            serde_json::to_vec_pretty(&facts)
                .map_err(|e| OntoError::SerializationError(e.to_string()))?
        }
        ExportFormat::Ntriples => export_ntriples(&ingestion.store).into_bytes(),
    };

    std::fs::write(&validated_output, &data).map_err(|e| OntoError::Io {
        location: validated_output.clone(),
        message: e.to_string(),
    })?;

    println!("Exported {} bytes to {}", data.len(), validated_output.display());

    Ok(())
}

// =============================================================================
// HASH COMMAND
// =============================================================================

/// Print the BLAKE3 digest of the canonical export.
pub fn cmd_hash(root: &Path, options: &ResolveOptions, json_mode: bool) -> Result<(), OntoError> {
    let ingestion = load(root, options)?;
    let digest = canonical_digest(&ingestion.store)?;

    if json_mode {
        let output = serde_json::json!({
            "algorithm": "blake3",
            "digest": digest,
            "facts": ingestion.store.count(),
            "documents": ingestion.chain.len(),
        });
        print_json(&output);
        return Ok(());
    }

    println!("BLAKE3: {}", digest);
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
