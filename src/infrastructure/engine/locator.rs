//! Engine resolution strategies

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::infrastructure::traits::FileSystem;
use crate::infrastructure::{InfraError, InfraResult};

/// Environment variable overriding the engine location.
pub const AKASHAPATH: &str = "AKASHAPATH";

/// Engine executable name for conventional lookup.
pub const ENGINE_BIN: &str = "akashacms-engine";

/// One way of finding the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineSource {
    /// A path given by the caller.
    Explicit(PathBuf),
    /// The value of `AKASHAPATH`. When set, no later source is consulted.
    Environment(PathBuf),
    /// `node_modules/.bin/akashacms-engine` in `base` or any of its ancestors.
    Conventional(PathBuf),
}

/// Ordered list of [`EngineSource`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineLocator {
    sources: Vec<EngineSource>,
}

impl EngineLocator {
    pub fn new(sources: Vec<EngineSource>) -> Self {
        Self { sources }
    }

    /// Standard resolution: `AKASHAPATH` if set, else lookup from `working_dir`.
    pub fn from_env(working_dir: &Path) -> Self {
        let env_override = std::env::var_os(AKASHAPATH)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self::standard(env_override, working_dir)
    }

    /// Standard resolution with the environment value passed in.
    pub fn standard(env_override: Option<PathBuf>, working_dir: &Path) -> Self {
        let mut sources = Vec::with_capacity(2);
        if let Some(path) = env_override {
            sources.push(EngineSource::Environment(path));
        }
        sources.push(EngineSource::Conventional(working_dir.to_path_buf()));
        Self::new(sources)
    }

    /// Locator that only accepts `path`.
    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self::new(vec![EngineSource::Explicit(path.into())])
    }

    pub fn sources(&self) -> &[EngineSource] {
        &self.sources
    }

    /// Resolve the engine executable.
    pub fn locate(&self, fs: &dyn FileSystem) -> InfraResult<PathBuf> {
        let mut searched = Vec::new();

        for source in &self.sources {
            match source {
                EngineSource::Explicit(path) => {
                    if fs.is_file(path) {
                        debug!("locate: explicit {}", path.display());
                        return Ok(path.clone());
                    }
                    searched.push(path.clone());
                }
                EngineSource::Environment(path) => {
                    // exact path, no fallback
                    debug!("locate: {}={}", AKASHAPATH, path.display());
                    if fs.is_file(path) {
                        return Ok(path.clone());
                    }
                    searched.push(path.clone());
                    return Err(InfraError::EngineNotFound { searched });
                }
                EngineSource::Conventional(base) => {
                    for dir in base.ancestors() {
                        let candidate = dir.join("node_modules").join(".bin").join(ENGINE_BIN);
                        if fs.is_file(&candidate) {
                            debug!("locate: found {}", candidate.display());
                            return Ok(candidate);
                        }
                        searched.push(candidate);
                    }
                }
            }
        }

        Err(InfraError::EngineNotFound { searched })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::RealFileSystem;
    use std::fs;
    use tempfile::TempDir;

    fn install_engine(dir: &Path) -> PathBuf {
        let bin = dir.join("node_modules").join(".bin");
        fs::create_dir_all(&bin).unwrap();
        let engine = bin.join(ENGINE_BIN);
        fs::write(&engine, "#!/bin/sh\n").unwrap();
        engine
    }

    #[test]
    fn given_engine_in_working_dir_when_locate_then_finds_it() {
        let temp = TempDir::new().unwrap();
        let engine = install_engine(temp.path());

        let locator = EngineLocator::standard(None, temp.path());

        assert_eq!(locator.locate(&RealFileSystem).unwrap(), engine);
    }

    #[test]
    fn given_engine_in_ancestor_when_locate_then_walks_up() {
        let temp = TempDir::new().unwrap();
        let engine = install_engine(temp.path());
        let nested = temp.path().join("site").join("documents");
        fs::create_dir_all(&nested).unwrap();

        let locator = EngineLocator::standard(None, &nested);

        assert_eq!(locator.locate(&RealFileSystem).unwrap(), engine);
    }

    #[test]
    fn given_env_override_when_locate_then_uses_exact_path() {
        let temp = TempDir::new().unwrap();
        let _conventional = install_engine(temp.path());
        let custom = temp.path().join("custom-engine");
        fs::write(&custom, "#!/bin/sh\n").unwrap();

        let locator = EngineLocator::standard(Some(custom.clone()), temp.path());

        assert_eq!(locator.locate(&RealFileSystem).unwrap(), custom);
    }

    #[test]
    fn given_missing_env_override_when_locate_then_does_not_fall_back() {
        let temp = TempDir::new().unwrap();
        let _conventional = install_engine(temp.path());
        let missing = temp.path().join("not-there");

        let locator = EngineLocator::standard(Some(missing.clone()), temp.path());

        match locator.locate(&RealFileSystem) {
            Err(InfraError::EngineNotFound { searched }) => assert_eq!(searched, vec![missing]),
            other => panic!("expected EngineNotFound, got {other:?}"),
        }
    }

    #[test]
    fn given_no_engine_when_locate_then_reports_searched_paths() {
        let temp = TempDir::new().unwrap();

        let err = EngineLocator::standard(None, temp.path())
            .locate(&RealFileSystem)
            .unwrap_err();

        match err {
            InfraError::EngineNotFound { searched } => {
                assert_eq!(
                    searched.first(),
                    Some(&temp.path().join("node_modules").join(".bin").join(ENGINE_BIN))
                );
            }
            other => panic!("expected EngineNotFound, got {other:?}"),
        }
    }

    /// The only test in this binary that touches `AKASHAPATH`.
    #[test]
    fn given_akashapath_when_from_env_then_exact_override_unless_empty() {
        // Arrange
        let temp = TempDir::new().unwrap();
        let _conventional = install_engine(temp.path());
        let custom = temp.path().join("custom-engine");
        fs::write(&custom, "#!/bin/sh\n").unwrap();

        // Act
        std::env::set_var(AKASHAPATH, &custom);
        let from_set = EngineLocator::from_env(temp.path());
        std::env::set_var(AKASHAPATH, "");
        let from_empty = EngineLocator::from_env(temp.path());
        std::env::remove_var(AKASHAPATH);
        let from_unset = EngineLocator::from_env(temp.path());

        // Assert
        assert_eq!(
            from_set.sources(),
            [
                EngineSource::Environment(custom.clone()),
                EngineSource::Conventional(temp.path().to_path_buf()),
            ]
        );
        assert_eq!(from_set.locate(&RealFileSystem).unwrap(), custom);
        assert_eq!(
            from_empty.sources(),
            [EngineSource::Conventional(temp.path().to_path_buf())]
        );
        assert_eq!(from_empty, from_unset);
        assert_eq!(
            from_empty.locate(&RealFileSystem).unwrap(),
            temp.path().join("node_modules").join(".bin").join(ENGINE_BIN)
        );
    }

    #[test]
    fn given_explicit_path_when_locate_then_skips_other_sources() {
        let temp = TempDir::new().unwrap();
        let engine = temp.path().join("engine");
        fs::write(&engine, "").unwrap();

        let locator = EngineLocator::explicit(&engine);

        assert_eq!(locator.sources().len(), 1);
        assert_eq!(locator.locate(&RealFileSystem).unwrap(), engine);
    }
}
