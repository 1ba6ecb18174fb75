//! Read-only taxonomy snapshot
//!
//! A [`Taxonomy`] owns the DTS documents and a directed relationship graph.
//! Endpoints are deduplicated into graph nodes by their stable key; parallel
//! edges are kept, one per resolved arc.

use std::collections::HashMap;
use std::sync::Arc;

use petgraph::graph::{DiGraph, NodeIndex};

use crate::dom::TaxonomyDocument;
use crate::relationship::{Endpoint, Relationship};

/// In-memory materialization of a DTS plus its derived relationships.
#[derive(Debug)]
pub struct Taxonomy {
    documents: Vec<Arc<TaxonomyDocument>>,
    graph: DiGraph<Endpoint, Relationship>,
}

impl Taxonomy {
    pub(crate) fn new(
        documents: Vec<Arc<TaxonomyDocument>>,
        relationships: Vec<Relationship>,
    ) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes: HashMap<String, NodeIndex> = HashMap::new();
        let mut node_for = |graph: &mut DiGraph<Endpoint, Relationship>, endpoint: &Endpoint| {
            *nodes
                .entry(endpoint.key())
                .or_insert_with(|| graph.add_node(endpoint.clone()))
        };

        for relationship in relationships {
            let source = node_for(&mut graph, &relationship.source);
            let target = node_for(&mut graph, &relationship.target);
            graph.add_edge(source, target, relationship);
        }

        Self { documents, graph }
    }

    /// The DTS documents, in discovery order.
    pub fn documents(&self) -> &[Arc<TaxonomyDocument>] {
        &self.documents
    }

    /// Number of root documents in the DTS.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Total number of XML elements across all DTS documents.
    pub fn element_count(&self) -> usize {
        self.documents.iter().map(|d| d.element_count()).sum()
    }

    /// Total number of concept declarations across all DTS documents.
    pub fn concept_count(&self) -> usize {
        self.documents.iter().map(|d| d.concepts().len()).sum()
    }

    /// All resolved relationships.
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.graph.edge_weights()
    }

    /// Number of relationships of any kind.
    pub fn relationship_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of relationships between two concepts.
    pub fn inter_concept_relationship_count(&self) -> usize {
        self.relationships().filter(|r| r.is_inter_concept()).count()
    }

    /// Number of dimensional (XDT) relationships.
    pub fn dimensional_relationship_count(&self) -> usize {
        self.relationships().filter(|r| r.is_dimensional()).count()
    }

    /// Number of distinct relationship endpoints.
    pub fn endpoint_count(&self) -> usize {
        self.graph.node_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationship::{ARCROLE_DOMAIN_MEMBER, ARCROLE_PARENT_CHILD};

    fn concept(href: &str) -> Endpoint {
        Endpoint::Located(format!("http://www.example.com/t/entry.xsd#{href}"))
    }

    fn rel(from: &str, to: &str, arcrole: &str) -> Relationship {
        Relationship {
            source: concept(from),
            target: concept(to),
            arcrole: arcrole.to_string(),
            link_role: None,
        }
    }

    #[test]
    fn endpoints_are_deduplicated_across_relationships() {
        let taxonomy = Taxonomy::new(
            Vec::new(),
            vec![
                rel("a", "b", ARCROLE_PARENT_CHILD),
                rel("a", "c", ARCROLE_PARENT_CHILD),
                rel("b", "c", ARCROLE_DOMAIN_MEMBER),
            ],
        );
        assert_eq!(taxonomy.endpoint_count(), 3);
        assert_eq!(taxonomy.relationship_count(), 3);
        assert_eq!(taxonomy.inter_concept_relationship_count(), 3);
        assert_eq!(taxonomy.dimensional_relationship_count(), 1);
    }

    #[test]
    fn parallel_edges_are_preserved() {
        let taxonomy = Taxonomy::new(
            Vec::new(),
            vec![
                rel("a", "b", ARCROLE_PARENT_CHILD),
                rel("a", "b", ARCROLE_PARENT_CHILD),
            ],
        );
        assert_eq!(taxonomy.endpoint_count(), 2);
        assert_eq!(taxonomy.relationship_count(), 2);
    }

    #[test]
    fn dimensional_count_never_exceeds_inter_concept_count() {
        let taxonomy = Taxonomy::new(
            Vec::new(),
            vec![
                rel("a", "b", ARCROLE_DOMAIN_MEMBER),
                rel("a", "c", ARCROLE_DOMAIN_MEMBER),
            ],
        );
        assert!(
            taxonomy.dimensional_relationship_count()
                <= taxonomy.inter_concept_relationship_count()
        );
    }
}
