//! taxolens-dts
//!
//! Loads XBRL taxonomies from offline taxonomy packages (ZIP archives with
//! an OASIS XML catalog) and answers read-only queries over the result.
//!
//! The pipeline has two phases:
//! 1. **Discovery**: starting from a set of entry-point URIs, the DTS
//!    closure is collected by following schema imports/includes, linkbase
//!    references and locators, resolving every URI through the package
//!    catalog.
//! 2. **Relationship computation**: arcs in extended links are resolved
//!    against their locators and resources, either strictly (unresolvable
//!    arcs are errors) or leniently (they are skipped).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use taxolens_dts::{DocumentStrategy, TaxonomyBuilder, TaxonomyPackage};
//!
//! let package = Arc::new(TaxonomyPackage::open("taxo.zip")?);
//! let builder = TaxonomyBuilder::new(package, DocumentStrategy::Compact);
//!
//! let taxonomy = builder.build(&entry_points)?;
//! println!("{} relationships", taxonomy.relationship_count());
//! ```

pub mod builder;
pub mod catalog;
pub mod discovery;
pub mod dom;
pub mod error;
pub mod package;
pub mod relationship;
pub mod taxonomy;

pub use builder::TaxonomyBuilder;
pub use dom::{DocumentStrategy, TaxonomyDocument};
pub use error::{DtsError, DtsResult};
pub use package::TaxonomyPackage;
pub use relationship::{Endpoint, Relationship, RelationshipKind, RelationshipMode};
pub use taxonomy::Taxonomy;
