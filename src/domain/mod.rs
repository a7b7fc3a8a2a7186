//! Domain layer: site model and document transforms
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod document;
pub mod error;
pub mod site;

pub use document::{fixup_bytes, fixup_target, DocumentEntry, Frontmatter};
pub use error::DomainError;
pub use site::{DeployRsync, DeploySsh2Sync, DeployTarget, PluginRef, SiteConfig};

/// Expand environment variables and tilde in a path string.
///
/// Handles `~`, `$VAR`, and `${VAR}` syntax.
/// Uses shellexpand crate for robust expansion.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
