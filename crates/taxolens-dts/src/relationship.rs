//! Relationship computation over the DTS
//!
//! Arcs in extended links are resolved against the locators and resources
//! of their link. Each `(from, to)` label pair of an arc yields one
//! relationship; locator labels may be reused, so one arc can yield several.
//!
//! Strict mode treats an unresolvable locator (target document outside the
//! DTS, or a plain fragment id absent from its document) or an arc endpoint
//! label with no locator/resource as an error. Lenient mode skips such
//! arcs and keeps going. Extraction runs in parallel across documents and
//! merges in document order, so the output is deterministic.

use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;
use url::Url;

use crate::dom::{ExtendedLink, TaxonomyDocument};
use crate::error::{DtsError, DtsResult};

pub const ARCROLE_PARENT_CHILD: &str = "http://www.xbrl.org/2003/arcrole/parent-child";
pub const ARCROLE_SUMMATION_ITEM: &str = "http://www.xbrl.org/2003/arcrole/summation-item";
pub const ARCROLE_GENERAL_SPECIAL: &str = "http://www.xbrl.org/2003/arcrole/general-special";
pub const ARCROLE_ESSENCE_ALIAS: &str = "http://www.xbrl.org/2003/arcrole/essence-alias";
pub const ARCROLE_SIMILAR_TUPLES: &str = "http://www.xbrl.org/2003/arcrole/similar-tuples";
pub const ARCROLE_REQUIRES_ELEMENT: &str = "http://www.xbrl.org/2003/arcrole/requires-element";

pub const ARCROLE_ALL: &str = "http://xbrl.org/int/dim/arcrole/all";
pub const ARCROLE_NOT_ALL: &str = "http://xbrl.org/int/dim/arcrole/notAll";
pub const ARCROLE_HYPERCUBE_DIMENSION: &str = "http://xbrl.org/int/dim/arcrole/hypercube-dimension";
pub const ARCROLE_DIMENSION_DOMAIN: &str = "http://xbrl.org/int/dim/arcrole/dimension-domain";
pub const ARCROLE_DOMAIN_MEMBER: &str = "http://xbrl.org/int/dim/arcrole/domain-member";
pub const ARCROLE_DIMENSION_DEFAULT: &str = "http://xbrl.org/int/dim/arcrole/dimension-default";

pub const ARCROLE_CONCEPT_LABEL: &str = "http://www.xbrl.org/2003/arcrole/concept-label";
pub const ARCROLE_CONCEPT_REFERENCE: &str = "http://www.xbrl.org/2003/arcrole/concept-reference";

/// Strictness of relationship computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelationshipMode {
    /// Unresolvable locators and arcs are errors (default)
    #[default]
    Strict,
    /// Unresolvable locators and arcs are skipped
    Lenient,
}

/// Classification of a relationship by its arcrole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipKind {
    /// Both endpoints are concepts; `dimensional` marks the XDT arcroles
    InterConcept { dimensional: bool },
    /// Target is a label or reference resource
    ConceptResource,
    /// Custom arcrole; still counted as a relationship
    Other,
}

/// Classifies an arcrole string.
pub fn classify(arcrole: &str) -> RelationshipKind {
    match arcrole {
        ARCROLE_ALL
        | ARCROLE_NOT_ALL
        | ARCROLE_HYPERCUBE_DIMENSION
        | ARCROLE_DIMENSION_DOMAIN
        | ARCROLE_DOMAIN_MEMBER
        | ARCROLE_DIMENSION_DEFAULT => RelationshipKind::InterConcept { dimensional: true },
        ARCROLE_PARENT_CHILD
        | ARCROLE_SUMMATION_ITEM
        | ARCROLE_GENERAL_SPECIAL
        | ARCROLE_ESSENCE_ALIAS
        | ARCROLE_SIMILAR_TUPLES
        | ARCROLE_REQUIRES_ELEMENT => RelationshipKind::InterConcept { dimensional: false },
        ARCROLE_CONCEPT_LABEL | ARCROLE_CONCEPT_REFERENCE => RelationshipKind::ConceptResource,
        _ => RelationshipKind::Other,
    }
}

/// One endpoint of a resolved relationship.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// A located target: absolute href, fragment included
    Located(String),
    /// An in-link resource, keyed by its document and xlink label
    Resource { doc: String, label: String },
}

impl Endpoint {
    /// Stable key for graph node deduplication.
    pub fn key(&self) -> String {
        match self {
            Endpoint::Located(href) => href.clone(),
            Endpoint::Resource { doc, label } => format!("{doc}#resource:{label}"),
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

/// A resolved relationship between two endpoints.
#[derive(Debug, Clone)]
pub struct Relationship {
    pub source: Endpoint,
    pub target: Endpoint,
    pub arcrole: String,
    /// Extended link role the arc appeared under
    pub link_role: Option<String>,
}

impl Relationship {
    pub fn kind(&self) -> RelationshipKind {
        classify(&self.arcrole)
    }

    pub fn is_inter_concept(&self) -> bool {
        matches!(self.kind(), RelationshipKind::InterConcept { .. })
    }

    pub fn is_dimensional(&self) -> bool {
        matches!(self.kind(), RelationshipKind::InterConcept { dimensional: true })
    }
}

/// Resolves arcs into relationships for a whole DTS.
#[derive(Debug, Clone, Copy)]
pub struct RelationshipFactory {
    mode: RelationshipMode,
}

impl RelationshipFactory {
    pub fn new(mode: RelationshipMode) -> Self {
        Self { mode }
    }

    /// Extracts all relationships from the given documents.
    ///
    /// Documents are processed in parallel; results are concatenated in
    /// document order.
    pub fn extract(&self, documents: &[Arc<TaxonomyDocument>]) -> DtsResult<Vec<Relationship>> {
        let dts: HashMap<&Url, &TaxonomyDocument> = documents
            .iter()
            .map(|d| (d.uri(), d.as_ref()))
            .collect();

        let per_document: Vec<Vec<Relationship>> = documents
            .par_iter()
            .map(|doc| self.extract_from_document(doc, &dts))
            .collect::<DtsResult<Vec<_>>>()?;

        Ok(per_document.into_iter().flatten().collect())
    }

    fn extract_from_document(
        &self,
        doc: &TaxonomyDocument,
        dts: &HashMap<&Url, &TaxonomyDocument>,
    ) -> DtsResult<Vec<Relationship>> {
        let mut out = Vec::new();
        for link in doc.extended_links() {
            self.extract_from_link(doc, link, dts, &mut out)?;
        }
        Ok(out)
    }

    fn extract_from_link(
        &self,
        doc: &TaxonomyDocument,
        link: &ExtendedLink,
        dts: &HashMap<&Url, &TaxonomyDocument>,
        out: &mut Vec<Relationship>,
    ) -> DtsResult<()> {
        let mut endpoints: HashMap<&str, Vec<Endpoint>> = HashMap::new();

        for locator in &link.locators {
            match self.resolve_locator(doc, &locator.href, dts)? {
                Some(endpoint) => endpoints
                    .entry(locator.label.as_str())
                    .or_default()
                    .push(endpoint),
                None => continue,
            }
        }
        for resource in &link.resources {
            endpoints
                .entry(resource.label.as_str())
                .or_default()
                .push(Endpoint::Resource {
                    doc: doc.uri().to_string(),
                    label: resource.label.clone(),
                });
        }

        for arc in &link.arcs {
            let (Some(sources), Some(targets)) =
                (endpoints.get(arc.from.as_str()), endpoints.get(arc.to.as_str()))
            else {
                match self.mode {
                    RelationshipMode::Strict => {
                        let missing = if endpoints.contains_key(arc.from.as_str()) {
                            &arc.to
                        } else {
                            &arc.from
                        };
                        return Err(DtsError::UnresolvedArcLabel {
                            doc: doc.uri().clone(),
                            label: missing.clone(),
                        });
                    }
                    RelationshipMode::Lenient => {
                        tracing::debug!(
                            doc = %doc.uri(),
                            from = %arc.from,
                            to = %arc.to,
                            "skipping arc with unresolved endpoint label"
                        );
                        continue;
                    }
                }
            };
            for source in sources {
                for target in targets {
                    out.push(Relationship {
                        source: source.clone(),
                        target: target.clone(),
                        arcrole: arc.arcrole.clone(),
                        link_role: link.role.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Validates a locator href against the DTS.
    ///
    /// Returns `Ok(None)` when the locator is unresolvable and the mode is
    /// lenient. Fragments that are not plain ids (xpointer schemes) are only
    /// checked for document membership.
    fn resolve_locator(
        &self,
        doc: &TaxonomyDocument,
        href: &Url,
        dts: &HashMap<&Url, &TaxonomyDocument>,
    ) -> DtsResult<Option<Endpoint>> {
        let mut target_doc = href.clone();
        target_doc.set_fragment(None);

        let resolved = match dts.get(&target_doc) {
            Some(target) => match href.fragment() {
                Some(fragment) if !fragment.contains('(') => target.contains_id(fragment),
                _ => true,
            },
            None => false,
        };

        if resolved {
            return Ok(Some(Endpoint::Located(href.to_string())));
        }
        match self.mode {
            RelationshipMode::Strict => Err(DtsError::UnresolvedLocator {
                doc: doc.uri().clone(),
                href: href.to_string(),
            }),
            RelationshipMode::Lenient => {
                tracing::debug!(doc = %doc.uri(), href = %href, "skipping unresolved locator");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DocumentStrategy;

    #[test]
    fn dimensional_arcroles_are_inter_concept() {
        for arcrole in [
            ARCROLE_ALL,
            ARCROLE_NOT_ALL,
            ARCROLE_HYPERCUBE_DIMENSION,
            ARCROLE_DIMENSION_DOMAIN,
            ARCROLE_DOMAIN_MEMBER,
            ARCROLE_DIMENSION_DEFAULT,
        ] {
            assert_eq!(
                classify(arcrole),
                RelationshipKind::InterConcept { dimensional: true }
            );
        }
    }

    #[test]
    fn standard_arcroles_classify_as_expected() {
        assert_eq!(
            classify(ARCROLE_PARENT_CHILD),
            RelationshipKind::InterConcept { dimensional: false }
        );
        assert_eq!(classify(ARCROLE_CONCEPT_LABEL), RelationshipKind::ConceptResource);
        assert_eq!(
            classify("http://www.example.com/arcrole/custom"),
            RelationshipKind::Other
        );
    }

    #[test]
    fn endpoint_keys_distinguish_resources_from_locators() {
        let located = Endpoint::Located("http://x/e.xsd#a".to_string());
        let resource = Endpoint::Resource {
            doc: "http://x/lab.xml".to_string(),
            label: "a".to_string(),
        };
        assert_ne!(located.key(), resource.key());
    }

    const SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
        targetNamespace="http://www.example.com/t/data">
      <xs:element id="e_A" name="A"/>
      <xs:element id="e_B" name="B"/>
    </xs:schema>"#;

    fn linkbase(extra_loc: &str, extra_arc: &str) -> String {
        format!(
            r#"<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase"
                xmlns:xlink="http://www.w3.org/1999/xlink">
      <link:presentationLink xlink:type="extended" xlink:role="http://www.example.com/role/s">
        <link:loc xlink:type="locator" xlink:href="entry.xsd#e_A" xlink:label="a"/>
        <link:loc xlink:type="locator" xlink:href="entry.xsd#e_B" xlink:label="b"/>
        {extra_loc}
        <link:presentationArc xlink:type="arc" xlink:from="a" xlink:to="b"
            xlink:arcrole="http://www.xbrl.org/2003/arcrole/parent-child"/>
        {extra_arc}
      </link:presentationLink>
    </link:linkbase>"#
        )
    }

    fn parse_pair(extra_loc: &str, extra_arc: &str) -> Vec<Arc<TaxonomyDocument>> {
        let schema_uri = Url::parse("http://www.example.com/t/entry.xsd").unwrap();
        let linkbase_uri = Url::parse("http://www.example.com/t/pre.xml").unwrap();
        vec![
            Arc::new(
                TaxonomyDocument::parse(schema_uri, SCHEMA, DocumentStrategy::Compact).unwrap(),
            ),
            Arc::new(
                TaxonomyDocument::parse(
                    linkbase_uri,
                    &linkbase(extra_loc, extra_arc),
                    DocumentStrategy::Compact,
                )
                .unwrap(),
            ),
        ]
    }

    #[test]
    fn resolves_arcs_against_locators() {
        let docs = parse_pair("", "");
        let relationships = RelationshipFactory::new(RelationshipMode::Strict)
            .extract(&docs)
            .unwrap();
        assert_eq!(relationships.len(), 1);
        assert!(relationships[0].is_inter_concept());
        assert!(!relationships[0].is_dimensional());
        assert_eq!(
            relationships[0].source,
            Endpoint::Located("http://www.example.com/t/entry.xsd#e_A".to_string())
        );
    }

    #[test]
    fn strict_mode_rejects_dangling_locator() {
        let docs = parse_pair(
            r#"<link:loc xlink:type="locator" xlink:href="entry.xsd#e_Missing" xlink:label="c"/>"#,
            "",
        );
        let err = RelationshipFactory::new(RelationshipMode::Strict)
            .extract(&docs)
            .unwrap_err();
        assert!(matches!(err, DtsError::UnresolvedLocator { .. }));
    }

    #[test]
    fn lenient_mode_skips_dangling_locator_and_its_arcs() {
        let docs = parse_pair(
            r#"<link:loc xlink:type="locator" xlink:href="entry.xsd#e_Missing" xlink:label="c"/>"#,
            r#"<link:presentationArc xlink:type="arc" xlink:from="a" xlink:to="c"
                xlink:arcrole="http://www.xbrl.org/2003/arcrole/parent-child"/>"#,
        );
        let relationships = RelationshipFactory::new(RelationshipMode::Lenient)
            .extract(&docs)
            .unwrap();
        // Only the a -> b arc survives.
        assert_eq!(relationships.len(), 1);
    }

    #[test]
    fn strict_mode_rejects_arc_with_unknown_label() {
        let docs = parse_pair(
            "",
            r#"<link:presentationArc xlink:type="arc" xlink:from="a" xlink:to="ghost"
                xlink:arcrole="http://www.xbrl.org/2003/arcrole/parent-child"/>"#,
        );
        let err = RelationshipFactory::new(RelationshipMode::Strict)
            .extract(&docs)
            .unwrap_err();
        assert!(matches!(err, DtsError::UnresolvedArcLabel { .. }));
    }
}
