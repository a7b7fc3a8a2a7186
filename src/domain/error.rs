//! Domain-level errors (no external dependencies)

use std::path::PathBuf;
use thiserror::Error;

/// Domain errors represent invalid site data.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("invalid site config {path}: {message}")]
    InvalidSiteConfig { path: PathBuf, message: String },

    #[error("deploy_rsync.host must not be empty")]
    MissingRsyncHost,
}
