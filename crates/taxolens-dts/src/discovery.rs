//! DTS closure discovery
//!
//! Breadth-first traversal from the entry-point URIs. Every URI is resolved
//! through the package catalog, read from the archive, parsed, and its
//! discovery references queued until a fixpoint is reached. The resulting
//! document list is ordered by first discovery, which keeps downstream
//! relationship extraction deterministic.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::Arc;

use url::Url;

use crate::builder::DocumentCache;
use crate::dom::{DocumentStrategy, TaxonomyDocument};
use crate::error::DtsResult;
use crate::package::TaxonomyPackage;

/// Collects the DTS closure for the given entry points.
pub fn discover(
    package: &TaxonomyPackage,
    cache: &DocumentCache,
    entry_points: &BTreeSet<Url>,
    strategy: DocumentStrategy,
) -> DtsResult<Vec<Arc<TaxonomyDocument>>> {
    let mut queue: VecDeque<Url> = entry_points.iter().cloned().collect();
    let mut seen: HashSet<Url> = entry_points.iter().cloned().collect();
    let mut documents = Vec::new();

    while let Some(uri) = queue.pop_front() {
        let document = match cache.get(&uri) {
            Some(cached) => cached,
            None => {
                let text = package.resolve_and_read(&uri)?;
                let document = Arc::new(TaxonomyDocument::parse(uri.clone(), text.as_str(), strategy)?);
                tracing::debug!(
                    uri = %uri,
                    root = document.root_name(),
                    elements = document.element_count(),
                    names = document.distinct_name_count(),
                    "parsed DTS document"
                );
                cache.insert(uri.clone(), Arc::clone(&document));
                document
            }
        };

        for reference in document.references() {
            if seen.insert(reference.clone()) {
                queue.push_back(reference.clone());
            }
        }
        documents.push(document);
    }

    tracing::debug!(documents = documents.len(), "DTS discovery complete");
    Ok(documents)
}
