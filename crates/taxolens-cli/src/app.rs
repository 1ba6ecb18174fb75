//! The footprint console program
//!
//! Loads a taxonomy from a package archive and reports how big it is: four
//! summary counts plus heap snapshots before loading, after loading, and
//! after querying. The whole pipeline is a straight line; every failure is
//! fatal and unrecovered.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use taxolens_dts::{DtsError, TaxonomyPackage};
use tracing::info;
use url::Url;

use crate::bootstrap::create_taxonomy_builder;
use crate::memory::HeapSnapshot;

/// Shows the memory footprint of a loaded taxonomy, with document and
/// relationship counts.
#[derive(Debug, Parser)]
#[command(name = "taxolens", version)]
pub struct Args {
    /// Taxonomy package ZIP file
    pub archive: PathBuf,

    /// Entry point URI(s) for DTS discovery
    #[arg(required = true)]
    pub entry_points: Vec<String>,

    /// Use the indexed document representation instead of the compact one
    #[arg(long, env = "TAXOLENS_INDEXED_DOM")]
    pub indexed_dom: bool,

    /// Compute relationships leniently, skipping unresolvable arcs
    #[arg(long, env = "TAXOLENS_LENIENT")]
    pub lenient: bool,
}

/// Runs the footprint pipeline.
///
/// The package handle lives on this function's stack and is dropped on
/// every exit path, error paths included.
pub fn run(args: &Args) -> anyhow::Result<()> {
    let entry_points = parse_entry_points(&args.entry_points)?;
    let joined = args.entry_points.join(", ");
    info!("starting DTS build with entry point(s) {joined}");

    info!(
        "heap memory usage before loading the taxonomy: {}",
        HeapSnapshot::capture()
    );

    let package = Arc::new(
        TaxonomyPackage::open(&args.archive)
            .with_context(|| format!("cannot open taxonomy package {}", args.archive.display()))?,
    );
    let builder = create_taxonomy_builder(package, !args.indexed_dom, args.lenient);
    let taxonomy = builder
        .build(&entry_points)
        .context("taxonomy construction failed")?;

    info!(
        "heap memory usage just after loading the taxonomy: {}",
        HeapSnapshot::capture()
    );

    info!(
        "the taxonomy has {} taxonomy root documents",
        taxonomy.document_count()
    );
    info!(
        "the taxonomy has {} taxonomy XML elements in total",
        taxonomy.element_count()
    );
    info!(
        "the taxonomy has {} relationships",
        taxonomy.relationship_count()
    );
    info!(
        "the taxonomy has {} dimensional relationships",
        taxonomy.dimensional_relationship_count()
    );

    info!(
        "heap memory usage after querying the taxonomy: {}",
        HeapSnapshot::capture()
    );

    // Library-level invariant; a violation is an engine bug, nothing this
    // program can repair.
    debug_assert!(
        taxonomy.dimensional_relationship_count()
            <= taxonomy.inter_concept_relationship_count()
    );

    info!("ready");
    Ok(())
}

fn parse_entry_points(raw: &[String]) -> anyhow::Result<BTreeSet<Url>> {
    raw.iter()
        .map(|s| {
            Url::parse(s).map_err(|_| DtsError::InvalidEntryPoint(s.clone()).into())
        })
        .collect()
}
