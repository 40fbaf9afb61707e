//! # Validation Tier Tests (T0-T3)
//!
//! End-to-end checks against real files on disk.
//!
//! ## Tiers
//! - T0: Document Input Validation
//! - T1: Import Resolution
//! - T2: Anonymous-Node Stabilization
//! - T3: Canonical Store

use ontoview_core::primitives::{OWL_IMPORTS, RDF_TYPE};
use ontoview_core::{
    DocumentLoader, FileLoader, Iri, LoadOptions, LoadedDocument, OntoError, ResolutionWarning,
    ResolveOptions, Resolver, Term, canonical_digest, ingest, ingest_file, resolve,
};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// FIXTURES
// =============================================================================

const EX: &str = "http://ex.org/";

/// Turtle for an ontology `ex:{name}` importing `ex:{import}` for each import.
fn ontology(name: &str, imports: &[&str], body: &str) -> String {
    let mut out = String::from(
        "@prefix owl: <http://www.w3.org/2002/07/owl#> .\n\
         @prefix ex: <http://ex.org/> .\n",
    );
    out.push_str(&format!("<{}{}> a owl:Ontology .\n", EX, name));
    for import in imports {
        out.push_str(&format!("<{}{}> owl:imports <{}{}> .\n", EX, name, EX, import));
    }
    out.push_str(body);
    out
}

/// `count` class declarations named `{prefix}0..`.
fn classes(prefix: &str, count: usize) -> String {
    (0..count)
        .map(|i| format!("ex:{}{} a owl:Class .\n", prefix, i))
        .collect()
}

fn write(dir: &Path, file: &str, text: &str) -> PathBuf {
    let path = dir.join(file);
    fs::write(&path, text).expect("write fixture");
    path
}

fn iri(name: &str) -> Iri {
    Iri::new(format!("{}{}", EX, name))
}

/// Wraps the file loader and records every location it loads.
#[derive(Default)]
struct CountingLoader {
    loads: RefCell<Vec<PathBuf>>,
}

impl CountingLoader {
    fn count_of(&self, file: &str) -> usize {
        self.loads
            .borrow()
            .iter()
            .filter(|p| p.file_name().is_some_and(|n| n == file))
            .count()
    }
}

impl DocumentLoader for CountingLoader {
    fn load(&self, location: &Path, options: &LoadOptions) -> Result<LoadedDocument, OntoError> {
        self.loads.borrow_mut().push(location.to_path_buf());
        FileLoader::new().load(location, options)
    }
}

// =============================================================================
// TIER T0: DOCUMENT INPUT VALIDATION
// =============================================================================

mod t0_input_validation {
    use super::*;

    /// T0.1: A missing root aborts with NotFound.
    #[test]
    fn missing_root_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let err = resolve(&dir.path().join("absent.ttl"), &ResolveOptions::default())
            .expect_err("missing");
        assert!(matches!(err, OntoError::NotFound { .. }));
        assert!(err.is_input_error());
    }

    /// T0.2: A symlinked root is rejected without being followed.
    #[cfg(unix)]
    #[test]
    fn symlinked_root_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let real = write(dir.path(), "real.ttl", &ontology("real", &[], ""));
        let link = dir.path().join("link.ttl");
        std::os::unix::fs::symlink(&real, &link).expect("symlink");

        let err = resolve(&link, &ResolveOptions::default()).expect_err("symlink");
        assert!(matches!(err, OntoError::SymlinkRejected { .. }));
    }

    /// T0.3: An oversized root is rejected with size and limit.
    #[test]
    fn oversized_root_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let root = write(dir.path(), "root.ttl", &ontology("root", &[], &classes("C", 50)));
        let mut options = ResolveOptions::default();
        options.load.max_file_size_bytes = 64;
        options.load.stream_threshold_bytes = 32;

        let err = resolve(&root, &options).expect_err("too large");
        let OntoError::FileTooLarge { size, limit, .. } = &err else {
            unreachable!("expected FileTooLarge, got {err:?}");
        };
        assert!(*size > 64);
        assert_eq!(*limit, 64);
    }

    /// T0.4: A located import with bad syntax aborts the resolution.
    #[test]
    fn located_import_syntax_error_is_fatal() {
        let dir = TempDir::new().expect("tempdir");
        let root = write(dir.path(), "root.ttl", &ontology("root", &["broken"], ""));
        write(dir.path(), "broken.ttl", "<http://ex.org/a> <http://ex.org/p> .\n");

        let err = resolve(&root, &ResolveOptions::default()).expect_err("parse");
        assert_eq!(err.kind(), "parse_error");
        assert!(!err.sanitized().contains(&dir.path().display().to_string()));
    }

    /// T0.5: Streaming and in-memory loading agree.
    #[test]
    fn streaming_matches_in_memory() {
        let dir = TempDir::new().expect("tempdir");
        let root = write(dir.path(), "root.ttl", &ontology("root", &[], &classes("C", 30)));

        let normal = ingest_file(&root, &ResolveOptions::default()).expect("ingest");
        let mut streamed_options = ResolveOptions::default();
        streamed_options.load.stream_threshold_bytes = 16;
        let streamed = ingest_file(&root, &streamed_options).expect("ingest");

        assert_eq!(normal.store.facts(), streamed.store.facts());
        assert_eq!(normal.prefixes, streamed.prefixes);
    }
}

// =============================================================================
// TIER T1: IMPORT RESOLUTION
// =============================================================================

mod t1_import_resolution {
    use super::*;

    /// T1.1: Diamond imports load the shared document exactly once.
    #[test]
    fn diamond_loads_shared_document_once() {
        let dir = TempDir::new().expect("tempdir");
        let root = write(dir.path(), "a.ttl", &ontology("a", &["b", "c"], ""));
        write(dir.path(), "b.ttl", &ontology("b", &["d"], ""));
        write(dir.path(), "c.ttl", &ontology("c", &["d"], ""));
        write(dir.path(), "d.ttl", &ontology("d", &[], &classes("D", 3)));

        let loader = CountingLoader::default();
        let ingestion = ingest(&loader, &root, &ResolveOptions::default()).expect("ingest");

        assert_eq!(loader.count_of("d.ttl"), 1);
        assert_eq!(ingestion.chain.len(), 4);
        // ontology header + 3 classes
        assert_eq!(ingestion.store.facts_from(&iri("d")).len(), 4);
    }

    /// T1.2: A -> B -> A fails with the full cycle.
    #[test]
    fn two_document_cycle_detected() {
        let dir = TempDir::new().expect("tempdir");
        let root = write(dir.path(), "a.ttl", &ontology("a", &["b"], ""));
        write(dir.path(), "b.ttl", &ontology("b", &["a"], ""));

        let err = resolve(&root, &ResolveOptions::default()).expect_err("cycle");
        assert_eq!(err.kind(), "circular_dependency");

        let trace = err.cycle_trace().expect("trace");
        assert_eq!(trace.first(), Some(&iri("a")));
        assert_eq!(trace.last(), Some(&iri("a")));
        assert_eq!(err.cycle_len(), Some(2));
        assert!(err.to_string().contains("[CYCLE]"));
    }

    /// T1.3: A cycle below the root reports only the cycle in its trace.
    #[test]
    fn nested_cycle_trace() {
        let dir = TempDir::new().expect("tempdir");
        let root = write(dir.path(), "r.ttl", &ontology("r", &["x"], ""));
        write(dir.path(), "x.ttl", &ontology("x", &["y"], ""));
        write(dir.path(), "y.ttl", &ontology("y", &["z"], ""));
        write(dir.path(), "z.ttl", &ontology("z", &["x"], ""));

        let err = resolve(&root, &ResolveOptions::default()).expect_err("cycle");
        assert_eq!(
            err.cycle_trace().expect("trace"),
            vec![iri("x"), iri("y"), iri("z"), iri("x")]
        );
        assert_eq!(err.cycle_len(), Some(3));
    }

    /// T1.4: Depth N+1 fails citing N.
    #[test]
    fn depth_limit_exceeded() {
        let dir = TempDir::new().expect("tempdir");
        let names = ["l0", "l1", "l2", "l3", "l4"];
        for pair in names.windows(2) {
            write(dir.path(), &format!("{}.ttl", pair[0]), &ontology(pair[0], &[pair[1]], ""));
        }
        write(dir.path(), "l4.ttl", &ontology("l4", &[], ""));

        let options = ResolveOptions::default().with_max_depth(3);
        let err = resolve(&dir.path().join("l0.ttl"), &options).expect_err("depth");
        assert!(matches!(
            err,
            OntoError::MaxDepthExceeded { depth: 4, limit: 3, .. }
        ));

        let options = ResolveOptions::default().with_max_depth(4);
        let ok = resolve(&dir.path().join("l0.ttl"), &options).expect("resolve");
        assert_eq!(ok.chain.max_depth_reached, 4);
    }

    /// T1.5: A zero document budget fails before anything loads.
    #[test]
    fn zero_total_documents_fails_immediately() {
        let dir = TempDir::new().expect("tempdir");
        let root = write(dir.path(), "root.ttl", &ontology("root", &[], ""));

        let loader = CountingLoader::default();
        let options = ResolveOptions::default().with_max_total_documents(0);
        let err = Resolver::new(&loader, options).resolve(&root).expect_err("budget");

        assert!(matches!(
            err,
            OntoError::MaxTotalDocumentsExceeded { limit: 0, .. }
        ));
        assert!(loader.loads.borrow().is_empty());
    }

    /// T1.6: 21 imports against a limit of 5 fails citing both.
    #[test]
    fn too_many_imports() {
        let dir = TempDir::new().expect("tempdir");
        let targets: Vec<String> = (0..21).map(|i| format!("dep{}", i)).collect();
        let refs: Vec<&str> = targets.iter().map(String::as_str).collect();
        let root = write(dir.path(), "root.ttl", &ontology("root", &refs, ""));

        let options = ResolveOptions::default().with_max_imports_per_document(5);
        let err = resolve(&root, &options).expect_err("imports");
        assert!(matches!(
            err,
            OntoError::MaxImportsExceeded { count: 21, limit: 5, .. }
        ));
    }

    /// T1.7: An import nobody can locate is a warning, not a failure.
    #[test]
    fn unresolved_import_warns() {
        let dir = TempDir::new().expect("tempdir");
        let root = write(dir.path(), "root.ttl", &ontology("root", &["nowhere"], ""));

        let resolution = resolve(&root, &ResolveOptions::default()).expect("resolve");
        assert_eq!(resolution.documents.len(), 1);
        assert_eq!(
            resolution.warnings,
            vec![ResolutionWarning::UnresolvedImport {
                importer: iri("root"),
                target: iri("nowhere"),
            }]
        );
    }

    /// T1.8: `file:` imports escaping the base directory are refused.
    #[test]
    fn file_import_traversal_rejected() {
        let outer = TempDir::new().expect("tempdir");
        let base = outer.path().join("base");
        fs::create_dir(&base).expect("mkdir");
        let outside = write(outer.path(), "outside.ttl", &ontology("outside", &[], ""));

        let root_text = format!(
            "{}<{}root> <{}> <file://{}> .\n",
            ontology("root", &[], ""),
            EX,
            OWL_IMPORTS,
            outside.display()
        );
        let root = write(&base, "root.ttl", &root_text);

        let resolution = resolve(&root, &ResolveOptions::default()).expect("resolve");
        assert_eq!(resolution.documents.len(), 1);
        assert!(resolution
            .warnings
            .iter()
            .any(|w| matches!(w, ResolutionWarning::PathTraversalRejected { .. })));
        assert!(resolution
            .warnings
            .iter()
            .any(|w| matches!(w, ResolutionWarning::UnresolvedImport { .. })));
    }

    /// T1.9: The explicit location map wins over convention.
    #[test]
    fn location_map_used() {
        let dir = TempDir::new().expect("tempdir");
        let root = write(dir.path(), "root.ttl", &ontology("root", &["units"], ""));
        fs::create_dir(dir.path().join("vendor")).expect("mkdir");
        write(&dir.path().join("vendor"), "qudt-units.ttl", &ontology("units", &[], ""));

        let options = ResolveOptions::default().with_location(iri("units").as_str(), "vendor/qudt-units.ttl");
        let resolution = resolve(&root, &options).expect("resolve");
        assert!(resolution.documents.contains_key(&iri("units")));
        assert!(resolution.warnings.is_empty());
    }

    /// T1.10: The chain is sorted by depth and records every document.
    #[test]
    fn chain_sorted_by_depth() {
        let dir = TempDir::new().expect("tempdir");
        let root = write(dir.path(), "root.ttl", &ontology("root", &["zeta", "alpha"], ""));
        write(dir.path(), "zeta.ttl", &ontology("zeta", &["leaf"], ""));
        write(dir.path(), "alpha.ttl", &ontology("alpha", &[], ""));
        write(dir.path(), "leaf.ttl", &ontology("leaf", &[], ""));

        let resolution = resolve(&root, &ResolveOptions::default()).expect("resolve");
        let order: Vec<(&str, usize)> = resolution
            .chain
            .documents
            .iter()
            .map(|e| (e.iri.as_str(), e.depth))
            .collect();
        assert_eq!(
            order,
            vec![
                ("http://ex.org/root", 0),
                ("http://ex.org/alpha", 1),
                ("http://ex.org/zeta", 1),
                ("http://ex.org/leaf", 2),
            ]
        );
        assert_eq!(resolution.chain.root_iri, iri("root"));
        assert_eq!(resolution.root().map(|d| &d.declared_iri), Some(&iri("root")));
        // one ontology declaration each, plus three import edges
        assert_eq!(resolution.fact_count(), 7);
    }

    /// T1.11: An import written as a relative `file:` IRI is linked in the
    /// chain to the identity the file declares.
    #[test]
    fn file_import_linked_to_declared_identity() {
        let dir = TempDir::new().expect("tempdir");
        let root_text = format!(
            "{}<{}root> <{}> <file:child.ttl> .\n",
            ontology("root", &[], ""),
            EX,
            OWL_IMPORTS
        );
        let root = write(dir.path(), "root.ttl", &root_text);
        write(dir.path(), "child.ttl", &ontology("child", &[], ""));

        let resolution = resolve(&root, &ResolveOptions::default()).expect("resolve");
        assert_eq!(resolution.documents.len(), 2);
        assert!(resolution.warnings.is_empty());

        let entry = resolution.chain.get(&iri("root")).expect("root entry");
        assert_eq!(entry.imports.len(), 1);
        assert_eq!(entry.imports[0].iri, Iri::new("file:child.ttl"));
        assert_eq!(entry.imports[0].resolved, Some(iri("child")));

        let tree = resolution.chain.render_tree();
        assert!(tree.contains("file:child.ttl => http://ex.org/child [depth 1]"));
        assert!(!tree.contains("(unresolved)"));
    }
}

// =============================================================================
// TIER T2: ANONYMOUS-NODE STABILIZATION
// =============================================================================

mod t2_stabilization {
    use super::*;

    fn two_documents_with_blank_nodes(dir: &Path) -> PathBuf {
        let root = write(
            dir,
            "root.ttl",
            &ontology(
                "root",
                &["child"],
                "ex:a ex:has _:x .\n_:x ex:label \"root x\" .\nex:b ex:has _:y .\n",
            ),
        );
        write(
            dir,
            "child.ttl",
            &ontology("child", &[], "ex:c ex:has _:x .\n_:x ex:label \"child x\" .\n"),
        );
        root
    }

    /// T2.1: Same raw label in two documents yields two stable ids.
    #[test]
    fn unique_across_documents() {
        let dir = TempDir::new().expect("tempdir");
        let root = two_documents_with_blank_nodes(dir.path());
        let ingestion = ingest_file(&root, &ResolveOptions::default()).expect("ingest");

        let root_nodes: BTreeSet<&Term> = ingestion
            .store
            .facts_from(&iri("root"))
            .into_iter()
            .flat_map(|f| [f.subject(), f.object()])
            .filter(|t| t.is_anonymous())
            .collect();
        let child_nodes: BTreeSet<&Term> = ingestion
            .store
            .facts_from(&iri("child"))
            .into_iter()
            .flat_map(|f| [f.subject(), f.object()])
            .filter(|t| t.is_anonymous())
            .collect();

        assert_eq!(root_nodes.len(), 2);
        assert_eq!(child_nodes.len(), 1);
        assert!(root_nodes.is_disjoint(&child_nodes));
    }

    /// T2.2: One raw label within a document maps to one stable id.
    #[test]
    fn consistent_within_document() {
        let dir = TempDir::new().expect("tempdir");
        let root = two_documents_with_blank_nodes(dir.path());
        let ingestion = ingest_file(&root, &ResolveOptions::default()).expect("ingest");

        let has = ingestion.store.by_subject(&Term::iri("http://ex.org/a"));
        let node = has.first().expect("fact").object().clone();
        let described = ingestion.store.by_subject(&node);
        assert_eq!(described.len(), 1);
        assert_eq!(described[0].object(), &Term::literal("root x"));

        let Term::AnonymousNode(id) = node else {
            unreachable!("expected anonymous node");
        };
        assert!(id.starts_with("http://ex.org/root_bn"));
    }

    /// T2.3: Repeated ingestion of the same input is identical.
    #[test]
    fn repeated_ingestion_is_idempotent() {
        let dir = TempDir::new().expect("tempdir");
        let root = two_documents_with_blank_nodes(dir.path());

        let first = ingest_file(&root, &ResolveOptions::default()).expect("ingest");
        let second = ingest_file(&root, &ResolveOptions::default()).expect("ingest");

        assert_eq!(first.store.facts(), second.store.facts());
        assert_eq!(
            canonical_digest(&first.store).expect("digest"),
            canonical_digest(&second.store).expect("digest")
        );
    }
}

// =============================================================================
// TIER T3: CANONICAL STORE
// =============================================================================

mod t3_canonical_store {
    use super::*;

    /// Root (3 header facts + 7 classes) and two children (1 + 19 each).
    fn fifty_fact_closure(dir: &Path) -> PathBuf {
        write(dir, "child1.ttl", &ontology("child1", &[], &classes("A", 19)));
        write(dir, "child2.ttl", &ontology("child2", &[], &classes("B", 19)));
        write(
            dir,
            "root.ttl",
            &ontology("root", &["child1", "child2"], &classes("R", 7)),
        )
    }

    /// T3.1: Root + two children, 50 facts, three provenances.
    #[test]
    fn end_to_end_counts() {
        let dir = TempDir::new().expect("tempdir");
        let root = fifty_fact_closure(dir.path());
        let ingestion = ingest_file(&root, &ResolveOptions::default()).expect("ingest");
        let store = &ingestion.store;

        assert_eq!(store.count(), 50);
        let provenance: Vec<&Iri> = store.known_provenance_iris().into_iter().collect();
        assert_eq!(provenance, vec![&iri("child1"), &iri("child2"), &iri("root")]);

        let typed: BTreeSet<&Term> = store
            .by_predicate(&Iri::new(RDF_TYPE))
            .into_iter()
            .map(|f| f.subject())
            .collect();
        // 3 ontologies + 7 + 19 + 19 classes
        assert_eq!(typed.len(), 48);
        assert!(typed.contains(&Term::iri("http://ex.org/R0")));
        assert!(typed.contains(&Term::iri("http://ex.org/B18")));
    }

    /// T3.2: Every fact is found by each of its keys and nothing else is.
    #[test]
    fn index_correctness() {
        let dir = TempDir::new().expect("tempdir");
        let root = fifty_fact_closure(dir.path());
        let ingestion = ingest_file(&root, &ResolveOptions::default()).expect("ingest");
        let store = &ingestion.store;

        for fact in store.facts() {
            assert!(store.by_subject(fact.subject()).contains(&fact));
            assert!(store.by_predicate(fact.predicate()).contains(&fact));
            assert!(store.by_object(fact.object()).contains(&fact));
        }

        let subject = Term::iri("http://ex.org/A3");
        assert!(store
            .by_subject(&subject)
            .iter()
            .all(|f| f.subject() == &subject));
    }

    /// T3.3: Prefix bindings are kept per document.
    #[test]
    fn prefixes_per_document() {
        let dir = TempDir::new().expect("tempdir");
        let root = fifty_fact_closure(dir.path());
        let ingestion = ingest_file(&root, &ResolveOptions::default()).expect("ingest");

        let expected: BTreeMap<String, String> = [
            ("ex".to_string(), EX.to_string()),
            ("owl".to_string(), "http://www.w3.org/2002/07/owl#".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(ingestion.prefixes.len(), 3);
        assert_eq!(ingestion.prefixes.get(&iri("child2")), Some(&expected));
    }

    /// T3.4: Independent ingestions on separate threads agree with
    /// sequential runs.
    #[test]
    fn concurrent_ingestions_match_sequential() {
        let first_dir = TempDir::new().expect("tempdir");
        let second_dir = TempDir::new().expect("tempdir");
        let first_root = fifty_fact_closure(first_dir.path());
        let second_root = write(
            second_dir.path(),
            "root.ttl",
            &ontology("other", &["leaf"], &classes("O", 5)),
        );
        write(second_dir.path(), "leaf.ttl", &ontology("leaf", &[], "[] a ex:Anon .\n"));

        let options = ResolveOptions::default();
        let sequential: Vec<_> = [&first_root, &second_root]
            .iter()
            .map(|root| ingest_file(root, &options).expect("ingest"))
            .collect();

        let (first, second) = std::thread::scope(|scope| {
            let a = scope.spawn(|| ingest_file(&first_root, &options));
            let b = scope.spawn(|| ingest_file(&second_root, &options));
            (
                a.join().expect("thread").expect("ingest"),
                b.join().expect("thread").expect("ingest"),
            )
        });

        for (parallel, serial) in [(&first, &sequential[0]), (&second, &sequential[1])] {
            assert_eq!(parallel.store.facts(), serial.store.facts());
            assert_eq!(parallel.chain, serial.chain);
            assert_eq!(
                canonical_digest(&parallel.store).expect("digest"),
                canonical_digest(&serial.store).expect("digest")
            );
        }
        assert_eq!(first.store.count(), 50);
        assert_ne!(first.chain.root_iri, second.chain.root_iri);
    }
}
