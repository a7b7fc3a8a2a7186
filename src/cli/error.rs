//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::engine::EngineError;
use crate::infrastructure::InfraError;

/// Printed under the error when the content engine cannot be found.
pub const ENGINE_NOT_FOUND_HINT: &str = "\
If you're seeing this message, the AkashaCMS engine hasn't been
installed locally. You may need to type 'npm install', or point
AKASHAPATH at the engine executable.

See http://akashacms.com for more help";

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        CliError::Infra(InfraError::Engine(e))
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Infra(InfraError::io("write output", e))
    }
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::EngineNotFound { .. } => crate::exitcode::UNAVAILABLE,
                InfraError::Subprocess { code, .. } => match code {
                    Some(c) if *c != 0 => *c,
                    _ => crate::exitcode::SOFTWARE,
                },
                InfraError::Engine(EngineError::Domain(_)) => crate::exitcode::DATAERR,
                InfraError::Engine(_) => crate::exitcode::SOFTWARE,
                InfraError::Application(app) => match app {
                    ApplicationError::SiteConfigNotFound(_) => crate::exitcode::NOINPUT,
                    ApplicationError::Domain(_) => crate::exitcode::DATAERR,
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                },
            },
        }
    }

    /// Extra guidance printed after the error message.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            CliError::Infra(InfraError::EngineNotFound { .. }) => Some(ENGINE_NOT_FOUND_HINT),
            _ => None,
        }
    }
}
