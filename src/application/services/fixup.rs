//! Fixup of unwanted characters in a document

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{fixup_bytes, fixup_target};
use crate::infrastructure::traits::FileSystem;

/// Writes a cleaned copy of a document next to the original.
pub struct FixupService {
    fs: Arc<dyn FileSystem>,
}

impl FixupService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Write the fixed-up content of `source` to `<source>-new`. The original is not modified.
    ///
    /// The document is handled as bytes, so it need not be valid UTF-8.
    pub fn fixup(&self, source: &Path) -> ApplicationResult<PathBuf> {
        debug!("fixup: {}", source.display());
        let content = self
            .fs
            .read(source)
            .with_path_context("read document", source)?;

        let target = fixup_target(source);
        self.fs
            .write(&target, &fixup_bytes(&content))
            .with_path_context("write document", &target)?;

        debug!("fixup: wrote {}", target.display());
        Ok(target)
    }
}
