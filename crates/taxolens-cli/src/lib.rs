//! taxolens-cli
//!
//! Console glue over the `taxolens-dts` engine: a bootstrap helper that
//! turns an opened taxonomy package plus two boolean switches into a ready
//! [`taxolens_dts::TaxonomyBuilder`], and a footprint program that loads a
//! DTS and reports counts and heap-memory snapshots.
//!
//! All taxonomy logic lives in the engine crate; nothing here does more
//! than argument handling, delegation and formatted logging.

pub mod app;
pub mod bootstrap;
pub mod memory;

pub use app::{run, Args};
pub use bootstrap::create_taxonomy_builder;
pub use memory::{CountingAllocator, HeapSnapshot};
