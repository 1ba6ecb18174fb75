//! Reusable taxonomy builder
//!
//! A [`TaxonomyBuilder`] is configured once (document strategy and
//! relationship mode) and can then produce any number of [`Taxonomy`]
//! snapshots from different entry-point sets. Parsed documents are cached
//! across builds, keyed by their published URI.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use url::Url;

use crate::discovery::discover;
use crate::dom::{DocumentStrategy, TaxonomyDocument};
use crate::error::{DtsError, DtsResult};
use crate::package::TaxonomyPackage;
use crate::relationship::{RelationshipFactory, RelationshipMode};
use crate::taxonomy::Taxonomy;

/// Cache of parsed documents shared across builds of one builder.
#[derive(Debug, Default)]
pub struct DocumentCache {
    inner: RwLock<HashMap<Url, Arc<TaxonomyDocument>>>,
}

impl DocumentCache {
    pub fn get(&self, uri: &Url) -> Option<Arc<TaxonomyDocument>> {
        self.inner.read().get(uri).cloned()
    }

    pub fn insert(&self, uri: Url, document: Arc<TaxonomyDocument>) {
        self.inner.write().insert(uri, document);
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

/// Immutable, reusable factory for taxonomy snapshots.
pub struct TaxonomyBuilder {
    package: Arc<TaxonomyPackage>,
    strategy: DocumentStrategy,
    mode: RelationshipMode,
    cache: DocumentCache,
}

impl TaxonomyBuilder {
    /// Creates a builder with strict relationship computation.
    pub fn new(package: Arc<TaxonomyPackage>, strategy: DocumentStrategy) -> Self {
        Self {
            package,
            strategy,
            mode: RelationshipMode::Strict,
            cache: DocumentCache::default(),
        }
    }

    /// Overrides the relationship mode.
    pub fn with_relationship_mode(mut self, mode: RelationshipMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn strategy(&self) -> DocumentStrategy {
        self.strategy
    }

    pub fn relationship_mode(&self) -> RelationshipMode {
        self.mode
    }

    /// Materializes the DTS reachable from the given entry points.
    pub fn build(&self, entry_points: &BTreeSet<Url>) -> DtsResult<Taxonomy> {
        if entry_points.is_empty() {
            return Err(DtsError::NoEntryPoints);
        }

        let documents = discover(&self.package, &self.cache, entry_points, self.strategy)?;
        let relationships = RelationshipFactory::new(self.mode).extract(&documents)?;

        tracing::info!(
            documents = documents.len(),
            relationships = relationships.len(),
            cached_documents = self.cache.len(),
            "taxonomy built"
        );

        Ok(Taxonomy::new(documents, relationships))
    }
}

impl std::fmt::Debug for TaxonomyBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaxonomyBuilder")
            .field("package", &self.package)
            .field("strategy", &self.strategy)
            .field("mode", &self.mode)
            .field("cached_documents", &self.cache.len())
            .finish()
    }
}
