//! # Store Module
//!
//! The canonical fact store: every normalized fact of one resolution plus
//! three single-field indices.
//!
//! - Built once from a fact list, never updated
//! - Lookups by subject, predicate or object are one hash probe plus a walk
//!   of the matching postings
//! - No composite index; conjunctive queries go through
//!   [`FactPattern`](crate::query::FactPattern), which intersects
//! - Immutable after `build`, so shared reads need no locking

use crate::{Fact, Iri, Term};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Indexed, read-only view over the facts of one import closure.
#[derive(Debug, Clone, Default)]
pub struct CanonicalFactStore {
    facts: Vec<Fact>,
    subject_index: HashMap<Term, Vec<usize>>,
    predicate_index: HashMap<Iri, Vec<usize>>,
    object_index: HashMap<Term, Vec<usize>>,
    provenance_index: BTreeMap<Iri, Vec<usize>>,
}

impl CanonicalFactStore {
    /// Build the store and its indices.
    ///
    /// Facts keep the order they were given in; every lookup returns them
    /// in that order.
    #[must_use]
    pub fn build(facts: Vec<Fact>) -> Self {
        let mut store = Self {
            facts: Vec::new(),
            subject_index: HashMap::new(),
            predicate_index: HashMap::new(),
            object_index: HashMap::new(),
            provenance_index: BTreeMap::new(),
        };

        for (i, fact) in facts.iter().enumerate() {
            store
                .subject_index
                .entry(fact.subject().clone())
                .or_default()
                .push(i);
            store
                .predicate_index
                .entry(fact.predicate().clone())
                .or_default()
                .push(i);
            store
                .object_index
                .entry(fact.object().clone())
                .or_default()
                .push(i);
            store
                .provenance_index
                .entry(fact.provenance().clone())
                .or_default()
                .push(i);
        }
        store.facts = facts;

        tracing::debug!(
            facts = store.facts.len(),
            subjects = store.subject_index.len(),
            predicates = store.predicate_index.len(),
            documents = store.provenance_index.len(),
            "fact store built"
        );

        store
    }

    /// All facts, in build order.
    #[must_use]
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    /// Total number of facts.
    #[must_use]
    pub fn count(&self) -> usize {
        self.facts.len()
    }

    /// Check if the store holds no facts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Facts asserted by one document.
    #[must_use]
    pub fn facts_from(&self, provenance: &Iri) -> Vec<&Fact> {
        self.resolve(self.provenance_index.get(provenance))
    }

    /// Facts with the given subject.
    #[must_use]
    pub fn by_subject(&self, subject: &Term) -> Vec<&Fact> {
        self.resolve(self.subject_index.get(subject))
    }

    /// Facts with the given predicate.
    #[must_use]
    pub fn by_predicate(&self, predicate: &Iri) -> Vec<&Fact> {
        self.resolve(self.predicate_index.get(predicate))
    }

    /// Facts with the given object.
    #[must_use]
    pub fn by_object(&self, object: &Term) -> Vec<&Fact> {
        self.resolve(self.object_index.get(object))
    }

    /// Identities of every document that contributed at least one fact.
    #[must_use]
    pub fn known_provenance_iris(&self) -> BTreeSet<&Iri> {
        self.provenance_index.keys().collect()
    }

    /// Summary counts.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        let anonymous: BTreeSet<&Term> = self
            .subject_index
            .keys()
            .chain(self.object_index.keys())
            .filter(|t| t.is_anonymous())
            .collect();

        StoreStats {
            facts: self.facts.len(),
            documents: self.provenance_index.len(),
            distinct_subjects: self.subject_index.len(),
            distinct_predicates: self.predicate_index.len(),
            distinct_objects: self.object_index.len(),
            anonymous_nodes: anonymous.len(),
        }
    }

    pub(crate) fn subject_postings(&self, subject: &Term) -> &[usize] {
        self.subject_index.get(subject).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn predicate_postings(&self, predicate: &Iri) -> &[usize] {
        self.predicate_index.get(predicate).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn object_postings(&self, object: &Term) -> &[usize] {
        self.object_index.get(object).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn fact_at(&self, index: usize) -> Option<&Fact> {
        self.facts.get(index)
    }

    fn resolve(&self, postings: Option<&Vec<usize>>) -> Vec<&Fact> {
        postings
            .map(|ids| ids.iter().filter_map(|&i| self.facts.get(i)).collect())
            .unwrap_or_default()
    }
}

/// Summary counts for a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub facts: usize,
    /// Documents that contributed at least one fact.
    pub documents: usize,
    pub distinct_subjects: usize,
    pub distinct_predicates: usize,
    pub distinct_objects: usize,
    /// Distinct anonymous nodes in subject or object position.
    pub anonymous_nodes: usize,
}

// =============================================================================
// TESTS
// =============================================================================
