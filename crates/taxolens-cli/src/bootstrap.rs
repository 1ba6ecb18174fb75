//! Taxonomy bootstrapping utility for the console programs.

use std::sync::Arc;

use taxolens_dts::{DocumentStrategy, RelationshipMode, TaxonomyBuilder, TaxonomyPackage};

/// Creates a [`TaxonomyBuilder`], which can be reused for creating multiple
/// DTSes as [`taxolens_dts::Taxonomy`] instances.
///
/// The package must be closed under DTS discovery rules, starting from any
/// of its entry points, and must carry a `META-INF/catalog.xml` mapping the
/// published URIs to archive paths. Neither property is validated here: the
/// catalog requirement is enforced when the package is opened, and closure
/// violations surface from [`TaxonomyBuilder::build`].
///
/// `use_compact_dom` selects the flat, memory-efficient document
/// representation over the indexed one. `lenient` turns off strict
/// relationship computation, skipping unresolvable locators and arcs
/// instead of failing.
pub fn create_taxonomy_builder(
    package: Arc<TaxonomyPackage>,
    use_compact_dom: bool,
    lenient: bool,
) -> TaxonomyBuilder {
    let strategy = if use_compact_dom {
        DocumentStrategy::Compact
    } else {
        DocumentStrategy::Indexed
    };

    let builder = TaxonomyBuilder::new(package, strategy);
    if lenient {
        builder.with_relationship_mode(RelationshipMode::Lenient)
    } else {
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn minimal_package() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut writer = zip::ZipWriter::new(file.reopen().unwrap());
        writer
            .start_file("META-INF/catalog.xml", SimpleFileOptions::default())
            .unwrap();
        writer
            .write_all(
                br#"<catalog xmlns="urn:oasis:names:tc:entity:xmlns:xml:catalog">
                  <rewriteURI uriStartString="http://www.example.com/t/" rewritePrefix="../t/"/>
                </catalog>"#,
            )
            .unwrap();
        writer.finish().unwrap();
        file
    }

    #[test]
    fn switches_map_onto_builder_configuration() {
        let file = minimal_package();
        let package = Arc::new(TaxonomyPackage::open(file.path()).unwrap());

        let builder = create_taxonomy_builder(Arc::clone(&package), true, false);
        assert_eq!(builder.strategy(), DocumentStrategy::Compact);
        assert_eq!(builder.relationship_mode(), RelationshipMode::Strict);

        let builder = create_taxonomy_builder(package, false, true);
        assert_eq!(builder.strategy(), DocumentStrategy::Indexed);
        assert_eq!(builder.relationship_mode(), RelationshipMode::Lenient);
    }
}
