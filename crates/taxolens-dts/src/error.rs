//! Error types for taxonomy package access and DTS construction
//!
//! Everything fallible in this crate funnels into [`DtsError`]. There is no
//! recovery below the crate boundary: callers either get a taxonomy or the
//! first failure encountered, unmodified.

use std::path::PathBuf;
use url::Url;

/// Errors raised while opening a package or building a taxonomy from it
#[derive(Debug, thiserror::Error)]
pub enum DtsError {
    /// The package file could not be opened
    #[error("failed to open taxonomy package {path}: {source}")]
    PackageOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The package file is not a readable ZIP archive
    #[error("invalid taxonomy package archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// The package has no META-INF/catalog.xml
    #[error("taxonomy package is missing META-INF/catalog.xml")]
    MissingCatalog,

    /// The catalog file exists but cannot be interpreted
    #[error("malformed catalog: {0}")]
    MalformedCatalog(String),

    /// A catalog-resolved local path is absent from the archive
    #[error("archive entry not found: {0}")]
    EntryNotFound(String),

    /// An archive entry could not be read
    #[error("failed to read archive entry {entry}: {source}")]
    EntryRead {
        entry: String,
        #[source]
        source: std::io::Error,
    },

    /// No catalog mapping covers the given URI
    #[error("no catalog mapping for URI {0}")]
    UnmappedUri(Url),

    /// A document in the DTS is not well-formed XML
    #[error("failed to parse XML document {uri}: {source}")]
    XmlParse {
        uri: Url,
        #[source]
        source: roxmltree::Error,
    },

    /// A URI reference inside a document cannot be resolved against its base
    #[error("invalid URI reference '{reference}' in {base}")]
    InvalidUriReference { base: Url, reference: String },

    /// An entry-point argument is not an absolute URI
    #[error("invalid entry point URI '{0}'")]
    InvalidEntryPoint(String),

    /// A build was requested with an empty entry-point set
    #[error("no entry points given")]
    NoEntryPoints,

    /// Strict mode: a locator points outside the DTS or at a missing fragment
    #[error("unresolved locator '{href}' in {doc}")]
    UnresolvedLocator { doc: Url, href: String },

    /// Strict mode: an arc endpoint label has no locator or resource
    #[error("arc references unknown label '{label}' in {doc}")]
    UnresolvedArcLabel { doc: Url, label: String },
}

/// Result type alias for DTS operations
pub type DtsResult<T> = Result<T, DtsError>;
