//! Read-only access to a taxonomy package archive
//!
//! A [`TaxonomyPackage`] owns the underlying ZIP handle for the duration of
//! one run and releases it on drop, on every exit path. The package must
//! carry a `META-INF/catalog.xml`; a taxonomy package usually also carries a
//! `taxonomyPackage.xml`, but nothing here reads it.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use url::Url;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::catalog::Catalog;
use crate::error::{DtsError, DtsResult};

const CATALOG_ENTRY: &str = "META-INF/catalog.xml";

/// An opened taxonomy package.
///
/// Entry reads need `&mut` on the archive, so the handle sits behind a
/// mutex; the package itself is shared immutably.
pub struct TaxonomyPackage {
    path: PathBuf,
    archive: Mutex<ZipArchive<File>>,
    catalog: Catalog,
}

impl TaxonomyPackage {
    /// Opens a package and parses its catalog.
    ///
    /// Fails when the file cannot be opened, is not a ZIP archive, or has
    /// no `META-INF/catalog.xml`. Whether the archive is actually closed
    /// under DTS discovery is not checked here; violations surface later
    /// from [`crate::TaxonomyBuilder::build`].
    pub fn open(path: impl AsRef<Path>) -> DtsResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| DtsError::PackageOpen {
            path: path.clone(),
            source,
        })?;
        let mut archive = ZipArchive::new(file).map_err(|source| DtsError::Archive {
            path: path.clone(),
            source,
        })?;

        let catalog_text = read_entry(&mut archive, CATALOG_ENTRY).map_err(|e| match e {
            DtsError::EntryNotFound(_) => DtsError::MissingCatalog,
            other => other,
        })?;
        let catalog = Catalog::from_xml(&catalog_text)?;

        tracing::debug!(
            package = %path.display(),
            mappings = catalog.len(),
            "opened taxonomy package"
        );

        Ok(Self {
            path,
            archive: Mutex::new(archive),
            catalog,
        })
    }

    /// The filesystem path this package was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The parsed package catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Reads an archive entry as text.
    pub fn read(&self, local_path: &str) -> DtsResult<String> {
        read_entry(&mut self.archive.lock(), local_path)
    }

    /// Resolves a published URI through the catalog and reads the mapped
    /// archive entry.
    pub fn resolve_and_read(&self, uri: &Url) -> DtsResult<String> {
        let local_path = self
            .catalog
            .resolve(uri.as_str())
            .ok_or_else(|| DtsError::UnmappedUri(uri.clone()))?;
        self.read(&local_path)
    }
}

impl std::fmt::Debug for TaxonomyPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaxonomyPackage")
            .field("path", &self.path)
            .field("catalog_mappings", &self.catalog.len())
            .finish()
    }
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> DtsResult<String> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Err(DtsError::EntryNotFound(name.to_string())),
        Err(ZipError::Io(source)) => {
            return Err(DtsError::EntryRead {
                entry: name.to_string(),
                source,
            })
        }
        Err(other) => {
            return Err(DtsError::EntryRead {
                entry: name.to_string(),
                source: std::io::Error::other(other),
            })
        }
    };
    let mut text = String::new();
    entry
        .read_to_string(&mut text)
        .map_err(|source| DtsError::EntryRead {
            entry: name.to_string(),
            source,
        })?;
    Ok(text)
}
