//! Content engine boundary
//!
//! All real work (gathering documents, rendering, template lookup, servers)
//! happens in an external engine. [`ContentEngine`] is the contract the
//! dispatcher programs against; [`ExternalEngine`] drives an engine
//! executable, and [`EngineLocator`] decides which executable that is.

mod external;
mod locator;

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::domain::{DeploySsh2Sync, DocumentEntry, DomainError, SiteConfig};
use crate::infrastructure::error::display_code;
use crate::infrastructure::traits::StreamingChild;
use crate::infrastructure::InfraResult;

pub use external::{EngineRequest, ExternalEngine, ExternalEngineProvider};
pub use locator::{EngineLocator, EngineSource, AKASHAPATH, ENGINE_BIN};

/// Errors reported by engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("engine used before configure()")]
    NotConfigured,

    #[error("site config has no {0} section")]
    MissingDeployTarget(&'static str),

    #[error("{op} failed ({}): {message}", display_code(.code))]
    Failed {
        op: String,
        code: Option<i32>,
        message: String,
    },

    #[error("{op}: invalid engine response")]
    Protocol {
        op: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{op}: {source}")]
    Io {
        op: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Domain(#[from] DomainError),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Searchable resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Template,
    Partial,
    Document,
    Asset,
}

impl ResourceKind {
    /// Engine operation name for the lookup.
    pub fn operation(self) -> &'static str {
        match self {
            ResourceKind::Template => "findTemplate",
            ResourceKind::Partial => "findPartial",
            ResourceKind::Document => "findDocument",
            ResourceKind::Asset => "findAsset",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Template => "template",
            ResourceKind::Partial => "partial",
            ResourceKind::Document => "document",
            ResourceKind::Asset => "asset",
        };
        f.write_str(name)
    }
}

/// Operations the external content engine provides.
pub trait ContentEngine {
    /// Hand the site config to the engine. Must precede every other call.
    fn configure(&mut self, config: &SiteConfig) -> EngineResult<()>;

    /// Render the whole site.
    fn process(&self) -> EngineResult<()>;

    /// Scan document roots and build the document index. Returns the document count.
    fn gather_dir(&mut self, dirs: &[PathBuf]) -> EngineResult<usize>;

    /// Render one document into the output directory.
    fn render_file(&self, name: &str) -> EngineResult<()>;

    /// Archive the rendered output directory.
    fn zip_rendered_site(&self) -> EngineResult<()>;

    /// Notify search engines of the sitemap location.
    fn ping_xml_sitemap(&self) -> EngineResult<()>;

    /// Fetch embeddable-media metadata for a URL.
    fn oembed_data(&self, url: &str) -> EngineResult<Value>;

    fn read_document_entry(&self, name: &str) -> EngineResult<DocumentEntry>;

    /// Resolve a resource through the engine's search path.
    fn find(&self, kind: ResourceKind, name: &str) -> EngineResult<Value>;

    /// Start rsync for the configured `deploy_rsync` target.
    fn deploy_via_rsync(&self) -> EngineResult<Box<dyn StreamingChild>>;

    /// Upload `local` to the remote sync target. Blocks until done.
    fn upload_remote(&self, local: &Path, target: &DeploySsh2Sync) -> EngineResult<()>;

    /// Run the editing server. Blocks until the server exits.
    fn run_edit_server(&self) -> EngineResult<()>;

    /// Run the preview server over built output. Blocks until the server exits.
    fn run_preview_server(&self) -> EngineResult<()>;

    /// Chain of ancestor index pages for a document, root first.
    fn index_chain(&self, name: &str) -> EngineResult<Vec<DocumentEntry>>;

    /// Visit every gathered document.
    fn each_document(&self, visitor: &mut dyn FnMut(&DocumentEntry)) -> EngineResult<()>;
}

/// Loads an engine handle. Injected so tests can substitute a mock engine.
pub trait EngineProvider: Send + Sync {
    fn load(&self) -> InfraResult<Box<dyn ContentEngine>>;
}
