//! Namespace prefix extraction.
//!
//! The parsers do not report the prefixes they saw, so the declarations are
//! read straight from the source text. The CORE stores them for consumers and
//! never interprets them.

use super::RdfFormat;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static TURTLE_PREFIX: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?mi)^\s*@?prefix\s+([A-Za-z][\w.-]*)?:\s*<([^>]*)>").ok()
});

static XML_NAMESPACE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"xmlns(?::([A-Za-z_][\w.-]*))?\s*=\s*"([^"]*)""#).ok());

/// Collect prefix bindings (prefix -> namespace IRI) declared in `text`.
///
/// The default prefix is stored under the empty string. A prefix declared
/// twice keeps its last binding. N-Triples has no prefixes.
pub fn extract_prefixes(text: &str, format: RdfFormat, into: &mut BTreeMap<String, String>) {
    let re = match format {
        RdfFormat::Turtle => TURTLE_PREFIX.as_ref(),
        RdfFormat::RdfXml => XML_NAMESPACE.as_ref(),
        RdfFormat::NTriples => None,
    };
    let Some(re) = re else {
        return;
    };

    for caps in re.captures_iter(text) {
        let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let Some(namespace) = caps.get(2) else {
            continue;
        };
        into.insert(prefix.to_string(), namespace.as_str().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turtle_prefixes_both_styles() {
        let text = "@prefix owl: <http://www.w3.org/2002/07/owl#> .\n\
                    PREFIX ex: <http://ex.org/>\n\
                    @prefix : <http://default.org/> .\n";
        let mut map = BTreeMap::new();
        extract_prefixes(text, RdfFormat::Turtle, &mut map);
        assert_eq!(map.len(), 3);
        assert_eq!(map["owl"], "http://www.w3.org/2002/07/owl#");
        assert_eq!(map["ex"], "http://ex.org/");
        assert_eq!(map[""], "http://default.org/");
    }

    #[test]
    fn xml_namespaces() {
        let text = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                     xmlns="http://ex.org/">"#;
        let mut map = BTreeMap::new();
        extract_prefixes(text, RdfFormat::RdfXml, &mut map);
        assert_eq!(map["rdf"], "http://www.w3.org/1999/02/22-rdf-syntax-ns#");
        assert_eq!(map[""], "http://ex.org/");
    }

    #[test]
    fn ntriples_has_no_prefixes() {
        let mut map = BTreeMap::new();
        extract_prefixes("@prefix ex: <http://ex.org/> .", RdfFormat::NTriples, &mut map);
        assert!(map.is_empty());
    }

    #[test]
    fn prefix_inside_literal_line_is_ignored() {
        let text = "ex:a ex:note \"see @prefix x: <http://x/>\" .\n";
        let mut map = BTreeMap::new();
        extract_prefixes(text, RdfFormat::Turtle, &mut map);
        assert!(map.is_empty());
    }
}
