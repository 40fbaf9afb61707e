//! # OntoView CLI Module
//!
//! This module implements the CLI interface for OntoView.
//!
//! ## Available Commands
//!
//! - `resolve` - Resolve a root document and summarize the closure
//! - `chain` - Show the import chain as a tree
//! - `query` - Match facts by subject, predicate and object
//! - `export` - Export the fact store to a file
//! - `hash` - Compute the BLAKE3 digest of the canonical export

mod commands;

use crate::config::Config;
use clap::{Parser, Subcommand, ValueEnum};
use ontoview_core::{OntoError, ResolveOptions};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// OntoView - ontology import resolver
///
/// Resolves the transitive imports of a root ontology and answers
/// questions about the merged, provenance-tagged facts.
#[derive(Parser, Debug)]
#[command(name = "ontoview")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Maximum import depth (root = 0)
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,

    /// Maximum number of documents in the closure
    #[arg(long, global = true)]
    pub max_documents: Option<usize>,

    /// Maximum number of imports per document
    #[arg(long, global = true)]
    pub max_imports: Option<usize>,

    /// Base directory for import lookup (defaults to the root's directory)
    #[arg(short = 'B', long, global = true)]
    pub base_dir: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the import closure and print a summary
    Resolve {
        /// Root document
        root: PathBuf,
    },

    /// Show the import chain
    Chain {
        /// Root document
        root: PathBuf,
    },

    /// Match facts against a pattern
    Query {
        /// Root document
        root: PathBuf,

        /// Subject term (`<iri>`, `_:id` or a bare IRI)
        #[arg(short, long)]
        subject: Option<String>,

        /// Predicate IRI
        #[arg(short, long)]
        predicate: Option<String>,

        /// Object term (`<iri>`, `_:id`, `"literal"` or a bare IRI)
        #[arg(short, long)]
        object: Option<String>,
    },

    /// Export the fact store
    Export {
        /// Root document
        root: PathBuf,

        /// Output file path
        #[arg(long)]
        output: PathBuf,

        /// Export format
        #[arg(short = 't', long, value_enum, default_value_t = ExportFormat::Canonical)]
        format: ExportFormat,
    },

    /// Compute BLAKE3 digest of the canonical export
    Hash {
        /// Root document
        root: PathBuf,
    },
}

/// Export file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Bit-exact postcard stream with header
    Canonical,
    /// Facts as a JSON array
    Json,
    /// N-Triples, provenance dropped
    Ntriples,
}

// =============================================================================
// OPTIONS
// =============================================================================

impl Cli {
    /// Build resolution options: defaults, then the config file, then flags.
    pub fn resolve_options(&self) -> Result<ResolveOptions, OntoError> {
        let mut options = match &self.config {
            Some(path) => Config::load(path)?.into_options(),
            None => ResolveOptions::default(),
        };

        if let Some(v) = self.max_depth {
            options.max_depth = v;
        }
        if let Some(v) = self.max_documents {
            options.max_total_documents = v;
        }
        if let Some(v) = self.max_imports {
            options.max_imports_per_document = v;
        }
        if let Some(dir) = &self.base_dir {
            options.base_directory = Some(dir.clone());
        }

        options.validate()?;
        Ok(options)
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), OntoError> {
    let options = cli.resolve_options()?;
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Resolve { root } => cmd_resolve(&root, &options, json_mode),
        Commands::Chain { root } => cmd_chain(&root, &options, json_mode),
        Commands::Query {
            root,
            subject,
            predicate,
            object,
        } => cmd_query(
            &root,
            &options,
            json_mode,
            subject.as_deref(),
            predicate.as_deref(),
            object.as_deref(),
        ),
        Commands::Export {
            root,
            output,
            format,
        } => cmd_export(&root, &options, &output, format),
        Commands::Hash { root } => cmd_hash(&root, &options, json_mode),
    }
}
