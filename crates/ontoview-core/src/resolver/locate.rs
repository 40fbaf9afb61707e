//! IRI to location resolution.
//!
//! Strategies are tried in order and the first hit wins:
//! 1. `file:` IRIs, sandboxed to the base directory
//! 2. The explicit IRI -> location map
//! 3. Convention: the IRI's last path segment or fragment, probed against
//!    the base directory with known extensions and case variants

use crate::formats::RdfFormat;
use crate::options::ResolveOptions;
use crate::{Iri, ResolutionWarning};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Maps import IRIs to document locations for one resolution.
#[derive(Debug, Clone)]
pub struct IriLocator {
    base_directory: PathBuf,
    canonical_base: Option<PathBuf>,
    location_map: BTreeMap<String, PathBuf>,
}

impl IriLocator {
    /// Build a locator for a resolution rooted at `root`.
    #[must_use]
    pub fn new(options: &ResolveOptions, root: &Path) -> Self {
        let base_directory = options.base_directory_for(root);
        let canonical_base = base_directory.canonicalize().ok();
        Self {
            base_directory,
            canonical_base,
            location_map: options.iri_location_map.clone(),
        }
    }

    /// The directory convention lookups and relative map entries start from.
    #[must_use]
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Find the location of `target`, imported by `importer`.
    ///
    /// Rejected `file:` IRIs are recorded in `warnings` and the remaining
    /// strategies are still tried. `None` means the import is unresolved.
    pub fn locate(
        &self,
        target: &Iri,
        importer: &Iri,
        warnings: &mut Vec<ResolutionWarning>,
    ) -> Option<PathBuf> {
        if let Some(path) = file_iri_path(target.as_str()) {
            match self.sandboxed(&path) {
                Sandboxed::Inside(location) => return Some(location),
                Sandboxed::Escapes => {
                    let warning = ResolutionWarning::PathTraversalRejected {
                        importer: importer.clone(),
                        target: target.clone(),
                    };
                    tracing::warn!("{}", warning);
                    warnings.push(warning);
                }
                Sandboxed::Missing => {}
            }
        }

        if let Some(mapped) = self.location_map.get(target.as_str()) {
            let location = self.relative_to_base(mapped);
            if exists(&location) {
                return Some(location);
            }
            tracing::debug!(
                iri = %target,
                location = %location.display(),
                "mapped location does not exist"
            );
        }

        self.by_convention(target.as_str())
    }

    fn relative_to_base(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_directory.join(path)
        }
    }

    fn sandboxed(&self, path: &Path) -> Sandboxed {
        let Ok(canonical) = self.relative_to_base(path).canonicalize() else {
            return Sandboxed::Missing;
        };
        match &self.canonical_base {
            Some(base) if canonical.starts_with(base) => Sandboxed::Inside(canonical),
            _ => Sandboxed::Escapes,
        }
    }

    fn by_convention(&self, iri: &str) -> Option<PathBuf> {
        for stem in name_candidates(iri) {
            for variant in case_variants(&stem) {
                for ext in RdfFormat::probe_extensions() {
                    let candidate = self.base_directory.join(format!("{}.{}", variant, ext));
                    if exists(&candidate) {
                        return Some(candidate);
                    }
                }
            }
        }
        None
    }
}

enum Sandboxed {
    Inside(PathBuf),
    Escapes,
    Missing,
}

/// Existence without following symlinks, so the loader gets to reject them.
fn exists(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

/// Path part of a `file:` IRI, percent-decoded. `None` for other schemes.
fn file_iri_path(iri: &str) -> Option<PathBuf> {
    let rest = iri.strip_prefix("file:")?;
    let rest = match rest.strip_prefix("//") {
        Some(authority_and_path) => {
            // file://host/path; only an empty host or localhost is local
            let slash = authority_and_path.find('/')?;
            let (host, path) = authority_and_path.split_at(slash);
            if !host.is_empty() && !host.eq_ignore_ascii_case("localhost") {
                return None;
            }
            path
        }
        None => rest,
    };
    let rest = rest.split(['#', '?']).next().unwrap_or(rest);
    if rest.is_empty() {
        return None;
    }
    Some(PathBuf::from(percent_decode(rest)))
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let decoded = s
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(byte) = decoded {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Candidate file stems for an IRI: fragment first, then the last path
/// segment, each with and without its own extension.
fn name_candidates(iri: &str) -> Vec<String> {
    let (without_fragment, fragment) = match iri.split_once('#') {
        Some((head, frag)) => (head, Some(frag)),
        None => (iri, None),
    };
    let segment = without_fragment
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .filter(|s| !s.is_empty());

    let mut out: Vec<String> = Vec::new();
    for name in fragment.into_iter().chain(segment) {
        if name.is_empty() {
            continue;
        }
        let stem = match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => name,
        };
        for candidate in [stem, name] {
            if !out.iter().any(|c| c == candidate) {
                out.push(candidate.to_string());
            }
        }
    }
    out
}

/// The name as written, lowercased, and capitalized.
fn case_variants(name: &str) -> Vec<String> {
    let lower = name.to_lowercase();
    let mut chars = lower.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };

    let mut out = vec![name.to_string()];
    for variant in [lower, capitalized] {
        if !variant.is_empty() && !out.contains(&variant) {
            out.push(variant);
        }
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================
