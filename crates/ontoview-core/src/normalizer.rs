//! # Normalizer Module
//!
//! Replaces parser-assigned anonymous-node ids with stable ones.
//!
//! Three passes over the merged facts:
//! 1. Detect: raw ids in subject/object position, per provenance document
//! 2. Generate: per document, sorted raw ids become `{document}_bn{0001..}`
//! 3. Apply: every fact is rewritten through its document's mapping
//!
//! Stable ids are unique across documents because they embed the document
//! IRI, and consistent within one because the mapping is a function.

use crate::primitives::{STABLE_BNODE_MARKER, STABLE_BNODE_WIDTH};
use crate::{Document, Fact, Iri, Term};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Raw id -> stable id, per provenance document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnonymousNodeMap {
    by_document: BTreeMap<Iri, BTreeMap<String, String>>,
}

impl AnonymousNodeMap {
    /// Detect every raw anonymous id, grouped by provenance.
    #[must_use]
    pub fn detect(facts: &[Fact]) -> BTreeMap<Iri, BTreeSet<String>> {
        let mut detected: BTreeMap<Iri, BTreeSet<String>> = BTreeMap::new();
        for fact in facts {
            for term in [fact.subject(), fact.object()] {
                if let Term::AnonymousNode(id) = term {
                    detected
                        .entry(fact.provenance().clone())
                        .or_default()
                        .insert(id.clone());
                }
            }
        }
        detected
    }

    /// Assign stable ids. Raw ids are already sorted by the `BTreeSet`.
    #[must_use]
    pub fn generate(detected: &BTreeMap<Iri, BTreeSet<String>>) -> Self {
        let by_document = detected
            .iter()
            .map(|(document, raw_ids)| {
                let mapping = raw_ids
                    .iter()
                    .enumerate()
                    .map(|(i, raw)| (raw.clone(), stable_id(document, i + 1)))
                    .collect();
                (document.clone(), mapping)
            })
            .collect();
        Self { by_document }
    }

    /// Build the map for a set of facts.
    #[must_use]
    pub fn for_facts(facts: &[Fact]) -> Self {
        Self::generate(&Self::detect(facts))
    }

    /// The stable id of `raw` in `document`, if it was detected.
    #[must_use]
    pub fn get(&self, document: &Iri, raw: &str) -> Option<&str> {
        self.by_document
            .get(document)
            .and_then(|m| m.get(raw))
            .map(String::as_str)
    }

    /// Total number of mapped nodes across documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_document.values().map(BTreeMap::len).sum()
    }

    /// Check if no anonymous nodes were detected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_document.is_empty()
    }

    /// Rewrite a fact's subject and object through its document's mapping.
    #[must_use]
    pub fn apply(&self, fact: Fact) -> Fact {
        let Some(mapping) = self.by_document.get(fact.provenance()) else {
            return fact;
        };
        fact.map_nodes(|term| match term {
            Term::AnonymousNode(raw) => match mapping.get(&raw) {
                Some(stable) => Term::AnonymousNode(stable.clone()),
                None => Term::AnonymousNode(raw),
            },
            other @ (Term::Iri(_) | Term::Literal(_)) => other,
        })
    }
}

/// `{document}_bn{counter}`, counter starting at 1.
fn stable_id(document: &Iri, counter: usize) -> String {
    format!(
        "{}{}{:0width$}",
        document,
        STABLE_BNODE_MARKER,
        counter,
        width = STABLE_BNODE_WIDTH
    )
}

/// Stabilize anonymous nodes and drop exact duplicates.
///
/// Order is preserved: the first occurrence of a duplicate is kept.
#[must_use]
pub fn normalize(facts: Vec<Fact>) -> Vec<Fact> {
    let map = AnonymousNodeMap::for_facts(&facts);
    tracing::debug!(
        facts = facts.len(),
        anonymous_nodes = map.len(),
        "normalizing facts"
    );

    let mut seen = HashSet::with_capacity(facts.len());
    let mut out = Vec::with_capacity(facts.len());
    for fact in facts {
        let fact = map.apply(fact);
        if seen.insert(fact.clone()) {
            out.push(fact);
        }
    }
    out
}

/// Merge the facts of every document, in identity order, and normalize them.
#[must_use]
pub fn normalize_documents<'a>(documents: impl IntoIterator<Item = &'a Document>) -> Vec<Fact> {
    let merged: Vec<Fact> = documents
        .into_iter()
        .flat_map(|doc| doc.facts.iter().cloned())
        .collect();
    normalize(merged)
}

// =============================================================================
// TESTS
// =============================================================================
