//! Creating a new site by cloning a template repository

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::Settings;
use crate::infrastructure::traits::CommandRunner;
use crate::infrastructure::{InfraError, InfraResult};

/// Template repositories a site can start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// Complete example site (`init`)
    Example,
    /// Bare skeleton site (`skeleton`)
    Skeleton,
}

/// Clones template repositories with git.
pub struct ScaffoldService {
    cmd: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
}

impl ScaffoldService {
    pub fn new(cmd: Arc<dyn CommandRunner>, settings: Arc<Settings>) -> Self {
        Self { cmd, settings }
    }

    /// Repository URL for a template.
    pub fn repository(&self, template: Template) -> &str {
        match template {
            Template::Example => &self.settings.example_repo,
            Template::Skeleton => &self.settings.skeleton_repo,
        }
    }

    /// `git clone <repo> <dir>` with the terminal attached.
    ///
    /// A non-zero git exit becomes [`InfraError::Subprocess`] carrying git's code.
    pub fn clone_template(&self, template: Template, dir: &Path) -> InfraResult<()> {
        let repo = self.repository(template);
        let dir_arg = dir.to_string_lossy();
        debug!("clone_template: {} {} -> {}", self.settings.git, repo, dir_arg);

        let code = self
            .cmd
            .run_inherited(&self.settings.git, &["clone", repo, dir_arg.as_ref()])
            .map_err(|e| InfraError::io(format!("run {}", self.settings.git), e))?;

        match code {
            Some(0) => Ok(()),
            code => {
                warn!("git clone of {} exited with {:?}", repo, code);
                Err(InfraError::Subprocess {
                    program: self.settings.git.clone(),
                    code,
                })
            }
        }
    }
}
