//! # OntoView - Ontology Import Resolver
//!
//! The command-line binary for the OntoView resolution engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │          apps/ontoview (THE BINARY)           │
//! │                                               │
//! │   ┌─────────────┐      ┌──────────────────┐   │
//! │   │    CLI      │      │   Config (TOML)  │   │
//! │   │   (clap)    │      │                  │   │
//! │   └──────┬──────┘      └────────┬─────────┘   │
//! │          └───────────┬──────────┘             │
//! │                      ▼                        │
//! │              ┌───────────────┐                │
//! │              │ ontoview-core │                │
//! │              │  (THE LOGIC)  │                │
//! │              └───────────────┘                │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! ontoview resolve ontologies/root.ttl
//! ontoview chain ontologies/root.ttl --max-depth 4
//! ontoview query ontologies/root.ttl -p http://www.w3.org/2000/01/rdf-schema#subClassOf
//! ontoview export ontologies/root.ttl --output closure.ontx
//! ontoview hash ontologies/root.ttl
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = ontoview::cli::Cli::parse();

    // ONTOVIEW_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("ONTOVIEW_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "ontoview=debug,ontoview_core=debug"
    } else {
        "ontoview=info,ontoview_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so command output stays pipeable.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if let Err(e) = ontoview::cli::execute(cli) {
        tracing::debug!(kind = e.kind(), "raw error: {}", e);
        tracing::error!("Error: {}", e.sanitized());
        std::process::exit(1);
    }
}
