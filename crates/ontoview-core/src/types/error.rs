//! # Errors and Warnings
//!
//! - Input errors are scoped to one document (not found, symlink, too large, ...)
//! - Resolution errors abort the whole attempt (limits, cycles)
//! - Warnings never abort anything and are returned next to the result
//!
//! `Display` renders the full internal detail, including filesystem
//! locations. Anything crossing to an untrusted caller goes through
//! [`OntoError::sanitized`] instead.

use super::Iri;
use crate::primitives::{REDACTED_HOME, REDACTED_PATH};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;
use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while loading, resolving or exporting.
///
/// - No silent failures
/// - Every variant carries the structured context needed for a precise message
/// - The CORE never panics; all errors are returned
#[derive(Debug, Error)]
pub enum OntoError {
    /// The document location does not exist.
    #[error("Document not found: {}", .location.display())]
    NotFound { location: PathBuf },

    /// The document location exists but cannot be read.
    #[error("Permission denied: {}", .location.display())]
    PermissionDenied { location: PathBuf },

    /// The location is a directory or special file.
    #[error("Not a regular file: {}", .location.display())]
    NotRegularFile { location: PathBuf },

    /// The location is a symbolic link.
    #[error("Symbolic link rejected: {}", .location.display())]
    SymlinkRejected { location: PathBuf },

    /// The document exceeds the configured maximum size.
    #[error("File too large: {} is {size} bytes (limit {limit})", .location.display())]
    FileTooLarge {
        location: PathBuf,
        size: u64,
        limit: u64,
    },

    /// The document is not valid in its serialization syntax.
    ///
    /// `message` is already sanitized when the error is built.
    #[error("Parse error in {}: {message}", .location.display())]
    Parse { location: PathBuf, message: String },

    /// Any other I/O failure while reading a document.
    #[error("I/O error on {}: {message}", .location.display())]
    Io { location: PathBuf, message: String },

    /// A document sits deeper in the import graph than allowed.
    #[error("Maximum import depth exceeded at {iri}: depth {depth} exceeds limit {limit}")]
    MaxDepthExceeded { iri: Iri, depth: usize, limit: usize },

    /// Loading one more document would exceed the closure budget.
    #[error("Maximum total documents exceeded: {count} exceeds limit {limit}")]
    MaxTotalDocumentsExceeded { count: usize, limit: usize },

    /// A single document declares more imports than allowed.
    #[error("Too many imports in {iri}: {count} exceeds limit {limit}")]
    MaxImportsExceeded { iri: Iri, count: usize, limit: usize },

    /// An import closes a cycle on the active resolution branch.
    ///
    /// `path` is the branch from the root to the importing document;
    /// `closing` is the import target already on that branch.
    #[error("Circular dependency: {}", format_cycle(.path, .closing))]
    CircularDependency { path: Vec<Iri>, closing: Iri },

    /// A parsed statement had a literal in subject position.
    #[error("Literal in subject position (predicate {predicate})")]
    LiteralSubject { predicate: String },

    /// A term could not be parsed from its textual form.
    #[error("Invalid term: {0}")]
    InvalidTerm(String),

    /// The host supplied inconsistent options.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// A serialization or export error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

fn format_cycle(path: &[Iri], closing: &Iri) -> String {
    let mut out = String::new();
    for iri in path {
        out.push_str(iri.as_str());
        out.push_str(" → ");
    }
    out.push_str("[CYCLE] ");
    out.push_str(closing.as_str());
    out
}

impl OntoError {
    /// Short machine-readable name of the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::PermissionDenied { .. } => "permission_denied",
            Self::NotRegularFile { .. } => "not_regular_file",
            Self::SymlinkRejected { .. } => "symlink_rejected",
            Self::FileTooLarge { .. } => "file_too_large",
            Self::Parse { .. } => "parse_error",
            Self::Io { .. } => "io_error",
            Self::MaxDepthExceeded { .. } => "max_depth_exceeded",
            Self::MaxTotalDocumentsExceeded { .. } => "max_total_documents_exceeded",
            Self::MaxImportsExceeded { .. } => "max_imports_exceeded",
            Self::CircularDependency { .. } => "circular_dependency",
            Self::LiteralSubject { .. } => "literal_subject",
            Self::InvalidTerm(_) => "invalid_term",
            Self::InvalidOptions(_) => "invalid_options",
            Self::SerializationError(_) => "serialization_error",
        }
    }

    /// Errors scoped to a single document.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::PermissionDenied { .. }
                | Self::NotRegularFile { .. }
                | Self::SymlinkRejected { .. }
                | Self::FileTooLarge { .. }
                | Self::Parse { .. }
                | Self::Io { .. }
        )
    }

    /// Errors raised by the resolver itself (limits and cycles).
    #[must_use]
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::MaxDepthExceeded { .. }
                | Self::MaxTotalDocumentsExceeded { .. }
                | Self::MaxImportsExceeded { .. }
                | Self::CircularDependency { .. }
        )
    }

    /// The cycle itself for a `CircularDependency`: starts and ends at the
    /// closing IRI. `None` for every other kind.
    #[must_use]
    pub fn cycle_trace(&self) -> Option<Vec<Iri>> {
        let Self::CircularDependency { path, closing } = self else {
            return None;
        };
        let start = path.iter().position(|iri| iri == closing).unwrap_or(0);
        let mut trace: Vec<Iri> = path[start..].to_vec();
        trace.push(closing.clone());
        Some(trace)
    }

    /// Number of distinct documents in the cycle.
    #[must_use]
    pub fn cycle_len(&self) -> Option<usize> {
        self.cycle_trace().map(|trace| trace.len().saturating_sub(1))
    }

    /// Render the error for an untrusted caller.
    ///
    /// Filesystem locations become a placeholder, free text is scrubbed of
    /// absolute paths and the home directory. Limits, counts and IRIs stay.
    #[must_use]
    pub fn sanitized(&self) -> String {
        match self {
            Self::NotFound { .. } => format!("Document not found: {}", REDACTED_PATH),
            Self::PermissionDenied { .. } => format!("Permission denied: {}", REDACTED_PATH),
            Self::NotRegularFile { .. } => format!("Not a regular file: {}", REDACTED_PATH),
            Self::SymlinkRejected { .. } => {
                format!("Symbolic link rejected: {}", REDACTED_PATH)
            }
            Self::FileTooLarge { size, limit, .. } => format!(
                "File too large: {} is {} bytes (limit {})",
                REDACTED_PATH, size, limit
            ),
            Self::Parse { message, .. } => format!(
                "Parse error in {}: {}",
                REDACTED_PATH,
                sanitize_message(message)
            ),
            Self::Io { message, .. } => format!(
                "I/O error on {}: {}",
                REDACTED_PATH,
                sanitize_message(message)
            ),
            other => sanitize_message(&other.to_string()),
        }
    }
}

// =============================================================================
// SANITIZATION
// =============================================================================

static FILE_IRI: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"file://[^\s'<>]*").ok());

static ABSOLUTE_PATH: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(^|[\s'"(\[=,])((?:~|[A-Za-z]:)?[/\\][^\s'"()\[\],]*)"#).ok()
});

/// Scrub filesystem paths and home-directory references from free text.
///
/// `http(s)://` IRIs are left alone; `file://` IRIs are redacted because they
/// are paths.
#[must_use]
pub fn sanitize_message(message: &str) -> String {
    sanitize_with_home(message, home_dir().as_deref())
}

/// [`sanitize_message`] with an explicit home directory.
#[must_use]
pub fn sanitize_with_home(message: &str, home: Option<&str>) -> String {
    let mut out = match home {
        Some(home) if home.len() > 1 => replace_home(message, home),
        _ => message.to_string(),
    };

    if let Some(re) = FILE_IRI.as_ref() {
        out = re
            .replace_all(&out, format!("file://{}", REDACTED_PATH).as_str())
            .into_owned();
    }

    if let Some(re) = ABSOLUTE_PATH.as_ref() {
        out = re
            .replace_all(&out, format!("${{1}}{}", REDACTED_PATH).as_str())
            .into_owned();
    }

    out
}

/// Replace `home` where it is a whole path prefix, not the start of a
/// longer directory name (`/root` must not touch `/rootfs`).
fn replace_home(message: &str, home: &str) -> String {
    let home = home.trim_end_matches(['/', '\\']);
    if home.is_empty() {
        return message.to_string();
    }

    let mut out = String::with_capacity(message.len());
    let mut rest = message;
    while let Some(pos) = rest.find(home) {
        let after = &rest[pos + home.len()..];
        let boundary = after
            .chars()
            .next()
            .is_none_or(|c| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.')));
        out.push_str(&rest[..pos]);
        out.push_str(if boundary { REDACTED_HOME } else { home });
        rest = after;
    }
    out.push_str(rest);
    out
}

fn home_dir() -> Option<String> {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .ok()
        .filter(|h| !h.is_empty())
}

// =============================================================================
// WARNINGS
// =============================================================================

/// Non-fatal conditions observed during a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionWarning {
    /// No location strategy could find the import target; it was skipped.
    UnresolvedImport { importer: Iri, target: Iri },
    /// A `file:` import pointed outside the base directory and was refused.
    PathTraversalRejected { importer: Iri, target: Iri },
    /// The document parsed successfully but asserted no facts.
    EmptyDocument { iri: Iri },
    /// The file extension is not one of the recognized serializations.
    ExtensionMismatch {
        location: PathBuf,
        extension: Option<String>,
    },
}

impl ResolutionWarning {
    /// Render the warning for an untrusted caller.
    #[must_use]
    pub fn sanitized(&self) -> String {
        match self {
            Self::ExtensionMismatch { extension, .. } => format!(
                "Unrecognized file extension {} on {}; parsed as Turtle",
                extension.as_deref().unwrap_or("(none)"),
                REDACTED_PATH
            ),
            other => sanitize_message(&other.to_string()),
        }
    }
}

impl fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedImport { importer, target } => {
                write!(f, "Unresolved import {} (declared by {})", target, importer)
            }
            Self::PathTraversalRejected { importer, target } => write!(
                f,
                "Import {} escapes the base directory (declared by {})",
                target, importer
            ),
            Self::EmptyDocument { iri } => write!(f, "Document {} contains no facts", iri),
            Self::ExtensionMismatch {
                location,
                extension,
            } => write!(
                f,
                "Unrecognized file extension {} on {}; parsed as Turtle",
                extension.as_deref().unwrap_or("(none)"),
                location.display()
            ),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
