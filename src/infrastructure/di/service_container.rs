//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::Path;
use std::sync::Arc;

use crate::application::services::{FixupService, ScaffoldService, SiteService};
use crate::config::Settings;
use crate::infrastructure::engine::{EngineLocator, EngineProvider, ExternalEngineProvider};
use crate::infrastructure::traits::{CommandRunner, FileSystem, RealCommandRunner, RealFileSystem};

/// Container holding the I/O boundaries and the engine provider.
pub struct ServiceContainer {
    /// Tool settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Command runner abstraction
    pub cmd: Arc<dyn CommandRunner>,

    /// Content engine resolution
    pub engines: Arc<dyn EngineProvider>,
}

impl ServiceContainer {
    /// Create a container with real implementations.
    ///
    /// The engine is resolved from `AKASHAPATH` or by lookup from `working_dir`.
    pub fn new(settings: Settings, working_dir: &Path) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let cmd: Arc<dyn CommandRunner> = Arc::new(RealCommandRunner);
        let engines = Arc::new(ExternalEngineProvider::new(
            EngineLocator::from_env(working_dir),
            Arc::clone(&fs),
            Arc::clone(&cmd),
            settings.rsync.clone(),
        ));
        Self::with_deps(settings, fs, cmd, engines)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        engines: Arc<dyn EngineProvider>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            cmd,
            engines,
        }
    }

    pub fn site_service(&self) -> SiteService {
        SiteService::new(Arc::clone(&self.fs))
    }

    pub fn scaffold_service(&self) -> ScaffoldService {
        ScaffoldService::new(Arc::clone(&self.cmd), Arc::clone(&self.settings))
    }

    pub fn fixup_service(&self) -> FixupService {
        FixupService::new(Arc::clone(&self.fs))
    }
}
