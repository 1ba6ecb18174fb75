//! OASIS XML catalog support for offline URI resolution
//!
//! A taxonomy package maps the published URIs of its documents to local
//! archive paths through `META-INF/catalog.xml`. Only `rewriteURI` entries
//! are honored; resolution picks the mapping with the longest matching
//! `uriStartString` prefix, as the catalog specification requires.

use crate::error::{DtsError, DtsResult};

const NS_CATALOG: &str = "urn:oasis:names:tc:entity:xmlns:xml:catalog";

/// Directory inside the archive that rewrite prefixes are relative to.
const CATALOG_DIR: &str = "META-INF";

/// One `rewriteURI` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogMapping {
    /// URI prefix this mapping covers
    pub uri_start: String,
    /// Replacement prefix, relative to the catalog's own directory
    pub rewrite_prefix: String,
}

/// Parsed package catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    mappings: Vec<CatalogMapping>,
}

impl Catalog {
    /// Parses the content of a `META-INF/catalog.xml` file.
    pub fn from_xml(text: &str) -> DtsResult<Self> {
        let doc = roxmltree::Document::parse(text)
            .map_err(|e| DtsError::MalformedCatalog(e.to_string()))?;

        let mut mappings = Vec::new();
        for node in doc.descendants().filter(|n| n.is_element()) {
            let name = node.tag_name();
            if name.name() != "rewriteURI" || name.namespace() != Some(NS_CATALOG) {
                continue;
            }
            let uri_start = node.attribute("uriStartString").ok_or_else(|| {
                DtsError::MalformedCatalog("rewriteURI without uriStartString".to_string())
            })?;
            let rewrite_prefix = node.attribute("rewritePrefix").ok_or_else(|| {
                DtsError::MalformedCatalog("rewriteURI without rewritePrefix".to_string())
            })?;
            mappings.push(CatalogMapping {
                uri_start: uri_start.to_string(),
                rewrite_prefix: rewrite_prefix.to_string(),
            });
        }

        Ok(Self { mappings })
    }

    /// Number of `rewriteURI` mappings.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// True when the catalog holds no mappings.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Resolves a published URI to a local archive path.
    ///
    /// Picks the mapping with the longest `uriStartString` that prefixes the
    /// URI; returns `None` when no mapping applies. The returned path is
    /// normalized relative to the archive root.
    pub fn resolve(&self, uri: &str) -> Option<String> {
        let mapping = self
            .mappings
            .iter()
            .filter(|m| uri.starts_with(&m.uri_start))
            .max_by_key(|m| m.uri_start.len())?;

        let remainder = &uri[mapping.uri_start.len()..];
        Some(normalize_archive_path(
            CATALOG_DIR,
            &format!("{}{}", mapping.rewrite_prefix, remainder),
        ))
    }
}

/// Normalizes a relative archive path against a base directory, collapsing
/// `.` and `..` segments. Leading `..` segments that climb past the archive
/// root are dropped.
fn normalize_archive_path(base_dir: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
