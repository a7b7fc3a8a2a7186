//! Site config loading

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::SiteConfig;
use crate::infrastructure::traits::FileSystem;

/// Loads the site config for a command.
pub struct SiteService {
    fs: Arc<dyn FileSystem>,
}

impl SiteService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Read and parse `<base_dir>/<file_name>`.
    pub fn load(&self, base_dir: &Path, file_name: &str) -> ApplicationResult<SiteConfig> {
        let path = base_dir.join(file_name);
        debug!("load: {}", path.display());

        if !self.fs.is_file(&path) {
            return Err(ApplicationError::SiteConfigNotFound(path));
        }
        let content = self
            .fs
            .read_to_string(&path)
            .with_path_context("read site config", &path)?;

        let config = SiteConfig::parse(&content, &path)?;
        debug!(
            "load: {} document roots, {} plugins",
            config.root_docs.len(),
            config.plugins.len()
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::infrastructure::traits::RealFileSystem;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn service() -> SiteService {
        SiteService::new(Arc::new(RealFileSystem))
    }

    #[test]
    fn given_config_file_when_load_then_parses_it() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("config.toml"),
            "root_out = \"out\"\nroot_docs = [\"documents\"]\n",
        )
        .unwrap();

        let cfg = service().load(temp.path(), "config.toml").unwrap();

        assert_eq!(cfg.root_out, PathBuf::from("out"));
        assert_eq!(cfg.root_docs, vec![PathBuf::from("documents")]);
    }

    #[test]
    fn given_no_config_file_when_load_then_not_found_with_path() {
        let temp = TempDir::new().unwrap();

        match service().load(temp.path(), "config.toml") {
            Err(ApplicationError::SiteConfigNotFound(path)) => {
                assert_eq!(path, temp.path().join("config.toml"))
            }
            other => panic!("expected SiteConfigNotFound, got {other:?}"),
        }
    }

    #[test]
    fn given_malformed_config_when_load_then_domain_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.toml"), "root_out = [").unwrap();

        assert!(matches!(
            service().load(temp.path(), "config.toml"),
            Err(ApplicationError::Domain(DomainError::InvalidSiteConfig { .. }))
        ));
    }
}
