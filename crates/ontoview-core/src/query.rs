//! # Query Module
//!
//! Conjunctive fact patterns over a [`CanonicalFactStore`].
//!
//! - Each bound field narrows the match; unbound fields match anything
//! - Evaluation walks the smallest single-field posting list and filters
//! - Results come back in store order, so the same pattern over the same
//!   store always answers identically

use crate::store::CanonicalFactStore;
use crate::{Fact, Iri, Term};
use serde::{Deserialize, Serialize};

/// A fact pattern with optional subject, predicate and object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactPattern {
    pub subject: Option<Term>,
    pub predicate: Option<Iri>,
    pub object: Option<Term>,
}

impl FactPattern {
    /// A pattern matching every fact.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Bind the subject.
    #[must_use]
    pub fn with_subject(mut self, subject: Term) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Bind the predicate.
    #[must_use]
    pub fn with_predicate(mut self, predicate: Iri) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Bind the object.
    #[must_use]
    pub fn with_object(mut self, object: Term) -> Self {
        self.object = Some(object);
        self
    }

    /// Check if no field is bound.
    #[must_use]
    pub fn is_unbound(&self) -> bool {
        self.subject.is_none() && self.predicate.is_none() && self.object.is_none()
    }

    /// Check a single fact against the pattern.
    #[must_use]
    pub fn matches(&self, fact: &Fact) -> bool {
        self.subject.as_ref().is_none_or(|s| s == fact.subject())
            && self.predicate.as_ref().is_none_or(|p| p == fact.predicate())
            && self.object.as_ref().is_none_or(|o| o == fact.object())
    }

    /// Evaluate the pattern against a store.
    #[must_use]
    pub fn evaluate<'a>(&self, store: &'a CanonicalFactStore) -> Vec<&'a Fact> {
        let candidates = [
            self.subject.as_ref().map(|s| store.subject_postings(s)),
            self.predicate.as_ref().map(|p| store.predicate_postings(p)),
            self.object.as_ref().map(|o| store.object_postings(o)),
        ];

        let Some(smallest) = candidates.into_iter().flatten().min_by_key(|p| p.len()) else {
            return store.facts().iter().collect();
        };

        smallest
            .iter()
            .filter_map(|&i| store.fact_at(i))
            .filter(|fact| self.matches(fact))
            .collect()
    }
}
