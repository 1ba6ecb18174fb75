//! Taxonomy document model
//!
//! Every DTS document (schema or linkbase) is parsed once and kept in
//! memory for the lifetime of the taxonomy. Two storage strategies exist
//! with identical query semantics:
//!
//! - [`DocumentStrategy::Compact`]: a flat pre-order element arena with
//!   interned names. This is the memory-efficient default.
//! - [`DocumentStrategy::Indexed`]: one owned node per element with its own
//!   attribute map and child index list. Richer and considerably heavier.
//!
//! The semantic views used elsewhere in the crate (discovery references,
//! concept declarations, extended links) are extracted during the single
//! parse pass and do not depend on the chosen storage, which is what
//! guarantees result parity across strategies. Fragment-id lookup goes
//! through the store, with identical answers from both.

use std::collections::{HashMap, HashSet};

use url::Url;

use crate::error::{DtsError, DtsResult};

pub(crate) const NS_XS: &str = "http://www.w3.org/2001/XMLSchema";
pub(crate) const NS_LINK: &str = "http://www.xbrl.org/2003/linkbase";
pub(crate) const NS_XLINK: &str = "http://www.w3.org/1999/xlink";
const NS_XML: &str = "http://www.w3.org/XML/1998/namespace";

/// Attributes that carry fragment ids: plain `id` and `xml:id`. Both stores
/// apply this same rule, which keeps their answers identical.
fn is_id_attribute(namespace: Option<&str>, local: &str) -> bool {
    local == "id" && matches!(namespace, None | Some(NS_XML))
}

/// Internal XML representation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStrategy {
    /// Flat element arena with interned names (memory-efficient, default)
    Compact,
    /// Fully materialized nodes with per-element attribute maps
    Indexed,
}

/// A top-level element declaration in a taxonomy schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptDecl {
    pub name: String,
    pub id: Option<String>,
    pub substitution_group: Option<String>,
}

/// A locator inside an extended link (`xlink:type="locator"`).
#[derive(Debug, Clone)]
pub struct Locator {
    pub label: String,
    /// Absolute target, fragment included
    pub href: Url,
}

/// A resource inside an extended link (`xlink:type="resource"`).
#[derive(Debug, Clone)]
pub struct LinkResource {
    pub label: String,
    /// Local element name, e.g. `label` or `reference`
    pub kind: String,
}

/// An arc inside an extended link (`xlink:type="arc"`).
#[derive(Debug, Clone)]
pub struct LinkArc {
    pub from: String,
    pub to: String,
    pub arcrole: String,
}

/// One extended link with its locators, resources and arcs.
#[derive(Debug, Clone)]
pub struct ExtendedLink {
    /// Local element name, e.g. `presentationLink`
    pub element_name: String,
    pub role: Option<String>,
    pub locators: Vec<Locator>,
    pub resources: Vec<LinkResource>,
    pub arcs: Vec<LinkArc>,
}

/// One parsed DTS document.
#[derive(Debug)]
pub struct TaxonomyDocument {
    uri: Url,
    store: DocStore,
    references: Vec<Url>,
    concepts: Vec<ConceptDecl>,
    links: Vec<ExtendedLink>,
}

impl TaxonomyDocument {
    /// Parses a document and extracts its semantic views.
    pub fn parse(uri: Url, text: &str, strategy: DocumentStrategy) -> DtsResult<Self> {
        let xml = roxmltree::Document::parse(text).map_err(|source| DtsError::XmlParse {
            uri: uri.clone(),
            source,
        })?;
        let root = xml.root_element();

        let store = match strategy {
            DocumentStrategy::Compact => DocStore::Compact(CompactStore::build(root)),
            DocumentStrategy::Indexed => DocStore::Indexed(IndexedStore::build(root)),
        };
        let references = collect_references(&xml, &uri)?;
        let concepts = collect_concepts(root);
        let links = collect_extended_links(root, &uri)?;

        Ok(Self {
            uri,
            store,
            references,
            concepts,
            links,
        })
    }

    /// Original (published) URI of this document.
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// The storage strategy this document was parsed with.
    pub fn strategy(&self) -> DocumentStrategy {
        match self.store {
            DocStore::Compact(_) => DocumentStrategy::Compact,
            DocStore::Indexed(_) => DocumentStrategy::Indexed,
        }
    }

    /// Number of XML elements in the document, root included.
    pub fn element_count(&self) -> usize {
        match &self.store {
            DocStore::Compact(s) => s.elems.len(),
            DocStore::Indexed(s) => s.element_count(),
        }
    }

    /// Local name of the document's root element.
    pub fn root_name(&self) -> &str {
        match &self.store {
            DocStore::Compact(s) => s.root_name(),
            DocStore::Indexed(s) => s.root_name(),
        }
    }

    /// Absolute URIs of documents this one references, fragment-free and
    /// deduplicated, in document order.
    pub fn references(&self) -> &[Url] {
        &self.references
    }

    /// Top-level element declarations (schemas only, empty for linkbases).
    pub fn concepts(&self) -> &[ConceptDecl] {
        &self.concepts
    }

    /// Extended links declared in this document.
    pub fn extended_links(&self) -> &[ExtendedLink] {
        &self.links
    }

    /// Whether any element in the document carries the given `id`.
    pub fn contains_id(&self, id: &str) -> bool {
        match &self.store {
            DocStore::Compact(s) => s.contains_id(id),
            DocStore::Indexed(s) => s.contains_id(id),
        }
    }

    /// Number of distinct element and attribute names in the document.
    pub fn distinct_name_count(&self) -> usize {
        match &self.store {
            DocStore::Compact(s) => s.names.len(),
            DocStore::Indexed(s) => s.distinct_name_count(),
        }
    }
}

// ---------------------------------------------------------------------------
// Storage

#[derive(Debug)]
enum DocStore {
    Compact(CompactStore),
    Indexed(IndexedStore),
}

/// Flat pre-order arena. Element and attribute names are interned as
/// `{namespace}|local` pairs; attributes live in one shared vector, each
/// element holding a range into it.
#[derive(Debug, Default)]
struct CompactStore {
    names: Vec<Box<str>>,
    name_lookup: HashMap<Box<str>, u32>,
    elems: Vec<CompactElem>,
    attrs: Vec<CompactAttr>,
}

#[derive(Debug)]
struct CompactElem {
    name: u32,
    attrs_start: u32,
    attrs_len: u32,
}

#[derive(Debug)]
struct CompactAttr {
    name: u32,
    value: Box<str>,
}

impl CompactStore {
    fn build(root: roxmltree::Node) -> Self {
        let mut store = Self::default();
        store.push(root);
        store
    }

    fn push(&mut self, node: roxmltree::Node) {
        let name = self.intern(node.tag_name().namespace(), node.tag_name().name());
        let attrs_start = self.attrs.len() as u32;
        for attr in node.attributes() {
            let attr_name = self.intern(attr.namespace(), attr.name());
            self.attrs.push(CompactAttr {
                name: attr_name,
                value: attr.value().into(),
            });
        }
        self.elems.push(CompactElem {
            name,
            attrs_start,
            attrs_len: self.attrs.len() as u32 - attrs_start,
        });
        for child in node.children().filter(|c| c.is_element()) {
            self.push(child);
        }
    }

    fn intern(&mut self, namespace: Option<&str>, local: &str) -> u32 {
        let key = format!("{}|{}", namespace.unwrap_or(""), local);
        if let Some(&idx) = self.name_lookup.get(key.as_str()) {
            return idx;
        }
        let idx = self.names.len() as u32;
        let boxed: Box<str> = key.into();
        self.names.push(boxed.clone());
        self.name_lookup.insert(boxed, idx);
        idx
    }

    fn local_name(&self, name: u32) -> &str {
        let key = &self.names[name as usize];
        key.split_once('|').map(|(_, local)| local).unwrap_or(key)
    }

    fn root_name(&self) -> &str {
        self.elems
            .first()
            .map(|e| self.local_name(e.name))
            .unwrap_or("")
    }

    fn contains_id(&self, id: &str) -> bool {
        let id_names: Vec<u32> = ["|id".to_string(), format!("{NS_XML}|id")]
            .iter()
            .filter_map(|key| self.name_lookup.get(key.as_str()).copied())
            .collect();
        if id_names.is_empty() {
            return false;
        }
        self.elems.iter().any(|e| {
            let range = e.attrs_start as usize..(e.attrs_start + e.attrs_len) as usize;
            self.attrs[range]
                .iter()
                .any(|a| id_names.contains(&a.name) && &*a.value == id)
        })
    }
}

/// One owned node per element, each with its own attribute map and child
/// index list.
#[derive(Debug, Default)]
struct IndexedStore {
    elems: Vec<IndexedElem>,
}

#[derive(Debug)]
struct IndexedElem {
    local_name: String,
    namespace: Option<String>,
    /// Keyed by `(namespace, local)`; two attributes differing only in
    /// namespace stay distinct.
    attributes: HashMap<(Option<String>, String), String>,
    children: Vec<usize>,
}

impl IndexedStore {
    fn build(root: roxmltree::Node) -> Self {
        let mut store = Self::default();
        store.push(root);
        store
    }

    fn push(&mut self, node: roxmltree::Node) -> usize {
        let index = self.elems.len();
        self.elems.push(IndexedElem {
            local_name: node.tag_name().name().to_string(),
            namespace: node.tag_name().namespace().map(str::to_string),
            attributes: node
                .attributes()
                .map(|a| {
                    (
                        (a.namespace().map(str::to_string), a.name().to_string()),
                        a.value().to_string(),
                    )
                })
                .collect(),
            children: Vec::new(),
        });
        let children: Vec<usize> = node
            .children()
            .filter(|c| c.is_element())
            .map(|c| self.push(c))
            .collect();
        self.elems[index].children = children;
        index
    }

    fn subtree_size(&self, index: usize) -> usize {
        1 + self.elems[index]
            .children
            .iter()
            .map(|&c| self.subtree_size(c))
            .sum::<usize>()
    }

    fn element_count(&self) -> usize {
        if self.elems.is_empty() {
            0
        } else {
            self.subtree_size(0)
        }
    }

    fn root_name(&self) -> &str {
        self.elems.first().map(|e| e.local_name.as_str()).unwrap_or("")
    }

    fn contains_id(&self, id: &str) -> bool {
        self.elems.iter().any(|e| {
            e.attributes.iter().any(|((namespace, local), value)| {
                is_id_attribute(namespace.as_deref(), local) && value == id
            })
        })
    }

    fn distinct_name_count(&self) -> usize {
        let mut names: HashSet<(Option<&str>, &str)> = HashSet::new();
        for elem in &self.elems {
            names.insert((elem.namespace.as_deref(), &elem.local_name));
            for (namespace, local) in elem.attributes.keys() {
                names.insert((namespace.as_deref(), local));
            }
        }
        names.len()
    }
}

// ---------------------------------------------------------------------------
// Semantic extraction

fn has_name(node: roxmltree::Node, ns: &str, local: &str) -> bool {
    node.tag_name().name() == local && node.tag_name().namespace() == Some(ns)
}

fn xlink<'a>(node: roxmltree::Node<'a, '_>, local: &str) -> Option<&'a str> {
    node.attribute((NS_XLINK, local))
}

fn resolve(base: &Url, reference: &str) -> DtsResult<Url> {
    base.join(reference)
        .map_err(|_| DtsError::InvalidUriReference {
            base: base.clone(),
            reference: reference.to_string(),
        })
}

/// Collects the discovery references of a document: schema imports and
/// includes, linkbase references, locators, and role/arcrole references.
fn collect_references(xml: &roxmltree::Document, base: &Url) -> DtsResult<Vec<Url>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for node in xml.descendants().filter(|n| n.is_element()) {
        let href = if has_name(node, NS_XS, "import") || has_name(node, NS_XS, "include") {
            node.attribute("schemaLocation")
        } else if has_name(node, NS_LINK, "linkbaseRef")
            || has_name(node, NS_LINK, "schemaRef")
            || has_name(node, NS_LINK, "roleRef")
            || has_name(node, NS_LINK, "arcroleRef")
            || has_name(node, NS_LINK, "loc")
        {
            xlink(node, "href")
        } else {
            None
        };
        let Some(href) = href else { continue };
        if href.is_empty() {
            continue;
        }
        let mut target = resolve(base, href)?;
        target.set_fragment(None);
        if target != *base && seen.insert(target.clone()) {
            out.push(target);
        }
    }
    Ok(out)
}

/// Collects top-level `xs:element` declarations of a schema document.
fn collect_concepts(root: roxmltree::Node) -> Vec<ConceptDecl> {
    if !has_name(root, NS_XS, "schema") {
        return Vec::new();
    }
    root.children()
        .filter(|n| n.is_element() && has_name(*n, NS_XS, "element"))
        .filter_map(|n| {
            let name = n.attribute("name")?;
            Some(ConceptDecl {
                name: name.to_string(),
                id: n.attribute("id").map(str::to_string),
                substitution_group: n.attribute("substitutionGroup").map(str::to_string),
            })
        })
        .collect()
}

/// Collects extended links (`xlink:type="extended"`) with their locators,
/// resources and arcs. Children missing mandatory xlink attributes are
/// schema-invalid and not recorded.
fn collect_extended_links(root: roxmltree::Node, base: &Url) -> DtsResult<Vec<ExtendedLink>> {
    let mut links = Vec::new();
    for node in root.descendants().filter(|n| n.is_element()) {
        if xlink(node, "type") != Some("extended") {
            continue;
        }
        let mut link = ExtendedLink {
            element_name: node.tag_name().name().to_string(),
            role: xlink(node, "role").map(str::to_string),
            locators: Vec::new(),
            resources: Vec::new(),
            arcs: Vec::new(),
        };
        for child in node.children().filter(|c| c.is_element()) {
            match xlink(child, "type") {
                Some("locator") => {
                    let (Some(label), Some(href)) = (xlink(child, "label"), xlink(child, "href"))
                    else {
                        continue;
                    };
                    link.locators.push(Locator {
                        label: label.to_string(),
                        href: resolve(base, href)?,
                    });
                }
                Some("resource") => {
                    let Some(label) = xlink(child, "label") else {
                        continue;
                    };
                    link.resources.push(LinkResource {
                        label: label.to_string(),
                        kind: child.tag_name().name().to_string(),
                    });
                }
                Some("arc") => {
                    let (Some(from), Some(to), Some(arcrole)) = (
                        xlink(child, "from"),
                        xlink(child, "to"),
                        xlink(child, "arcrole"),
                    ) else {
                        continue;
                    };
                    link.arcs.push(LinkArc {
                        from: from.to_string(),
                        to: to.to_string(),
                        arcrole: arcrole.to_string(),
                    });
                }
                _ => {}
            }
        }
        links.push(link);
    }
    Ok(links)
}
