//! The import chain: what was loaded, from where, and at which depth.

use crate::{Document, Iri};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// One declared import and the document it led to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainImport {
    /// The IRI as written in the importing document.
    pub iri: Iri,
    /// Identity of the loaded target; `None` when it was never located.
    pub resolved: Option<Iri>,
}

/// One resolved document in the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainEntry {
    pub iri: Iri,
    pub location: PathBuf,
    /// Imports declared by the document, resolved or not.
    pub imports: Vec<ChainImport>,
    pub depth: usize,
}

/// Resolution metadata for one closure, sorted by depth then IRI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportChain {
    pub root_iri: Iri,
    pub documents: Vec<ChainEntry>,
    pub max_depth_reached: usize,
}

impl ImportChain {
    /// Build the chain from a resolved document map.
    ///
    /// `aliases` maps each followed import IRI to the identity of the
    /// document it loaded; imports missing from it are unresolved.
    #[must_use]
    pub fn from_documents(
        root_iri: &Iri,
        documents: &BTreeMap<Iri, Document>,
        aliases: &BTreeMap<Iri, Iri>,
    ) -> Self {
        let mut entries: Vec<ChainEntry> = documents
            .values()
            .map(|doc| ChainEntry {
                iri: doc.declared_iri.clone(),
                location: doc.location.clone(),
                imports: doc
                    .declared_imports
                    .iter()
                    .map(|import| ChainImport {
                        iri: import.clone(),
                        resolved: aliases
                            .get(import)
                            .filter(|identity| documents.contains_key(*identity))
                            .cloned(),
                    })
                    .collect(),
                depth: doc.resolution_depth,
            })
            .collect();
        entries.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.iri.cmp(&b.iri)));

        let max_depth_reached = entries.iter().map(|e| e.depth).max().unwrap_or(0);

        Self {
            root_iri: root_iri.clone(),
            documents: entries,
            max_depth_reached,
        }
    }

    /// Number of documents in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Look up an entry by IRI.
    #[must_use]
    pub fn get(&self, iri: &Iri) -> Option<&ChainEntry> {
        self.documents.iter().find(|e| &e.iri == iri)
    }

    /// Entries at exactly `depth`.
    pub fn at_depth(&self, depth: usize) -> impl Iterator<Item = &ChainEntry> {
        self.documents.iter().filter(move |e| e.depth == depth)
    }

    /// Render the chain as an indented tree rooted at the root document.
    ///
    /// A document reached twice is listed in full once and marked
    /// `(shared)` afterwards; imports that were never loaded are marked
    /// `(unresolved)`. An import written differently from the identity it
    /// loaded shows both as `import => identity`.
    #[must_use]
    pub fn render_tree(&self) -> String {
        let by_iri: BTreeMap<&Iri, &ChainEntry> =
            self.documents.iter().map(|e| (&e.iri, e)).collect();
        let mut shown = BTreeSet::new();
        let mut out = String::new();
        render_node(&self.root_iri, String::new(), 0, &by_iri, &mut shown, &mut out);
        out
    }
}

fn render_node<'a>(
    iri: &'a Iri,
    label: String,
    indent: usize,
    by_iri: &BTreeMap<&'a Iri, &'a ChainEntry>,
    shown: &mut BTreeSet<&'a Iri>,
    out: &mut String,
) {
    let pad = "  ".repeat(indent);
    let Some(&entry) = by_iri.get(iri) else {
        out.push_str(&format!("{}{}{} (unresolved)\n", pad, label, iri));
        return;
    };
    if !shown.insert(iri) {
        out.push_str(&format!("{}{}{} (shared)\n", pad, label, iri));
        return;
    }
    out.push_str(&format!("{}{}{} [depth {}]\n", pad, label, iri, entry.depth));
    for import in &entry.imports {
        match &import.resolved {
            Some(identity) if identity != &import.iri => {
                let label = format!("{} => ", import.iri);
                render_node(identity, label, indent + 1, by_iri, shown, out);
            }
            Some(identity) => render_node(identity, String::new(), indent + 1, by_iri, shown, out),
            None => render_node(&import.iri, String::new(), indent + 1, by_iri, shown, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(iri: &str, imports: &[&str], depth: usize) -> Document {
        Document {
            location: PathBuf::from(format!("{}.ttl", depth)),
            declared_iri: Iri::new(iri),
            prefix_bindings: BTreeMap::new(),
            facts: Vec::new(),
            declared_imports: imports.iter().map(|i| Iri::new(*i)).collect(),
            resolution_depth: depth,
        }
    }

    /// Every identity aliases itself, as after a resolution.
    fn identities(docs: &BTreeMap<Iri, Document>) -> BTreeMap<Iri, Iri> {
        docs.keys().map(|iri| (iri.clone(), iri.clone())).collect()
    }

    fn diamond() -> BTreeMap<Iri, Document> {
        [
            doc("urn:a", &["urn:c", "urn:b"], 0),
            doc("urn:b", &["urn:d"], 1),
            doc("urn:c", &["urn:d", "urn:gone"], 1),
            doc("urn:d", &[], 2),
        ]
        .into_iter()
        .map(|d| (d.declared_iri.clone(), d))
        .collect()
    }

    #[test]
    fn sorted_by_depth_then_iri() {
        let docs = diamond();
        let chain = ImportChain::from_documents(&Iri::new("urn:a"), &docs, &identities(&docs));
        let order: Vec<&str> = chain.documents.iter().map(|e| e.iri.as_str()).collect();
        assert_eq!(order, vec!["urn:a", "urn:b", "urn:c", "urn:d"]);
        assert_eq!(chain.max_depth_reached, 2);
        assert_eq!(chain.at_depth(1).count(), 2);
        assert_eq!(chain.get(&Iri::new("urn:d")).map(|e| e.depth), Some(2));
    }

    #[test]
    fn tree_marks_shared_and_unresolved() {
        let docs = diamond();
        let chain = ImportChain::from_documents(&Iri::new("urn:a"), &docs, &identities(&docs));
        let tree = chain.render_tree();
        assert_eq!(
            tree,
            "urn:a [depth 0]\n\
             \x20 urn:c [depth 1]\n\
             \x20   urn:d [depth 2]\n\
             \x20   urn:gone (unresolved)\n\
             \x20 urn:b [depth 1]\n\
             \x20   urn:d (shared)\n"
        );
    }

    #[test]
    fn aliased_import_links_to_loaded_document() {
        let docs: BTreeMap<Iri, Document> = [
            doc("http://ex.org/root", &["file:child.ttl", "urn:missing"], 0),
            doc("http://ex.org/child", &[], 1),
        ]
        .into_iter()
        .map(|d| (d.declared_iri.clone(), d))
        .collect();
        let mut aliases = identities(&docs);
        aliases.insert(Iri::new("file:child.ttl"), Iri::new("http://ex.org/child"));

        let chain = ImportChain::from_documents(&Iri::new("http://ex.org/root"), &docs, &aliases);
        let root = chain.get(&Iri::new("http://ex.org/root")).expect("root");
        assert_eq!(
            root.imports,
            vec![
                ChainImport {
                    iri: Iri::new("file:child.ttl"),
                    resolved: Some(Iri::new("http://ex.org/child")),
                },
                ChainImport {
                    iri: Iri::new("urn:missing"),
                    resolved: None,
                },
            ]
        );
        assert_eq!(
            chain.render_tree(),
            "http://ex.org/root [depth 0]\n\
             \x20 file:child.ttl => http://ex.org/child [depth 1]\n\
             \x20 urn:missing (unresolved)\n"
        );
    }
}
