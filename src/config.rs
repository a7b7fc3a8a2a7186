//! Tool settings with layered loading
//!
//! These are settings of the `akashacms` command itself, not of a site.
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/akashacms/akashacms.toml`
//! 3. Environment variables: `AKASHACMS_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::expand_env_vars;

/// Repository cloned by `init`.
pub const DEFAULT_EXAMPLE_REPO: &str = "https://github.com/akashacms/akashacms-example.git";

/// Repository cloned by `skeleton`.
pub const DEFAULT_SKELETON_REPO: &str = "https://github.com/akashacms/akashacms-skeleton.git";

/// Site config file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Raw settings for intermediate parsing (every field optional).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub example_repo: Option<String>,
    pub skeleton_repo: Option<String>,
    pub git: Option<String>,
    pub rsync: Option<String>,
    pub config_file: Option<String>,
}

/// Settings for the akashacms command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Repository cloned by `init`
    pub example_repo: String,
    /// Repository cloned by `skeleton`
    pub skeleton_repo: String,
    /// git executable
    pub git: String,
    /// rsync executable
    pub rsync: String,
    /// Site config file name
    pub config_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            example_repo: DEFAULT_EXAMPLE_REPO.into(),
            skeleton_repo: DEFAULT_SKELETON_REPO.into(),
            git: "git".into(),
            rsync: "rsync".into(),
            config_file: DEFAULT_CONFIG_FILE.into(),
        }
    }
}

/// Get the XDG config directory for akashacms.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "akashacms").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("akashacms.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in executable paths.
    fn expand_paths(&mut self) {
        self.git = expand_env_vars(&self.git);
        self.rsync = expand_env_vars(&self.rsync);
    }

    /// Overlay wins wherever it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            example_repo: overlay
                .example_repo
                .clone()
                .unwrap_or_else(|| self.example_repo.clone()),
            skeleton_repo: overlay
                .skeleton_repo
                .clone()
                .unwrap_or_else(|| self.skeleton_repo.clone()),
            git: overlay.git.clone().unwrap_or_else(|| self.git.clone()),
            rsync: overlay.rsync.clone().unwrap_or_else(|| self.rsync.clone()),
            config_file: overlay
                .config_file
                .clone()
                .unwrap_or_else(|| self.config_file.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/akashacms/akashacms.toml`
    /// 3. Environment variables: `AKASHACMS_*` prefix
    pub fn load() -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref())
    }

    /// Load settings using `global_path` in place of the XDG location.
    pub fn load_from(global_path: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(path) = global_path {
            if path.exists() {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply AKASHACMS_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("AKASHACMS")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("example_repo") {
            settings.example_repo = val;
        }
        if let Ok(val) = config.get_string("skeleton_repo") {
            settings.skeleton_repo = val;
        }
        if let Ok(val) = config.get_string("git") {
            settings.git = val;
        }
        if let Ok(val) = config.get_string("rsync") {
            settings.rsync = val;
        }
        if let Ok(val) = config.get_string("config_file") {
            settings.config_file = val;
        }

        Ok(settings)
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
