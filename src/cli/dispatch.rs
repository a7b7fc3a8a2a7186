//! Command dispatch
//!
//! Parses argv against a command table and runs the selected command,
//! applying its error policy to the handler's result.

use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use tracing::{debug, error, info_span};

use crate::cli::args::{build_cli, find_command, Action, CommandSpec, ConfigBase, ErrorPolicy};
use crate::cli::commands::SiteSession;
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::infrastructure::di::ServiceContainer;

/// Directories a command may resolve its site config against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locations {
    pub install_dir: PathBuf,
    pub working_dir: PathBuf,
}

impl Locations {
    /// Directory of the running executable and the process working directory.
    pub fn detect() -> io::Result<Self> {
        let working_dir = env::current_dir()?;
        let install_dir = env::current_exe()?
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| working_dir.clone());
        Ok(Self {
            install_dir,
            working_dir,
        })
    }

    pub fn base(&self, base: ConfigBase) -> &Path {
        match base {
            ConfigBase::InstallDir => &self.install_dir,
            ConfigBase::WorkingDir => &self.working_dir,
        }
    }
}

/// How a command ended when it did not propagate an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// Handler failed under [`ErrorPolicy::LogAndContinue`]; carries the message
    Logged(String),
}

/// A parsed command line.
#[derive(Debug, Clone)]
pub struct Invocation<'t> {
    pub spec: &'t CommandSpec,
    pub arg: Option<String>,
}

pub struct Dispatcher<'a> {
    table: &'a [CommandSpec],
    services: &'a ServiceContainer,
    locations: Locations,
}

impl<'a> Dispatcher<'a> {
    pub fn new(table: &'a [CommandSpec], services: &'a ServiceContainer, locations: Locations) -> Self {
        Self {
            table,
            services,
            locations,
        }
    }

    pub fn locations(&self) -> &Locations {
        &self.locations
    }

    /// Parse argv (program name first).
    pub fn parse<I, T>(&self, argv: I) -> Result<Invocation<'a>, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut cli = build_cli(self.table);
        let matches = cli.try_get_matches_from_mut(argv)?;
        let Some((name, sub)) = matches.subcommand() else {
            return Err(cli.error(ErrorKind::MissingSubcommand, "no command given"));
        };
        let Some(spec) = find_command(self.table, name) else {
            return Err(cli.error(ErrorKind::InvalidSubcommand, format!("unknown command '{name}'")));
        };
        let arg = spec.arg.and_then(|id| sub.get_one::<String>(id).cloned());
        Ok(Invocation { spec, arg })
    }

    /// Run a parsed command, writing its results to `out`.
    pub fn execute(&self, invocation: &Invocation<'_>, out: &mut dyn Write) -> CliResult<Outcome> {
        let spec = invocation.spec;
        let arg = invocation.arg.as_deref();
        let _span = info_span!("command", name = spec.name).entered();
        debug!("execute: {} {:?}", spec.name, arg);

        let result = match spec.action {
            Action::Clone(template) => {
                let dir = arg.ok_or_else(|| CliError::InvalidArgs("missing <dirName>".into()))?;
                self.services
                    .scaffold_service()
                    .clone_template(template, Path::new(dir))
                    .map_err(CliError::from)
            }
            Action::Site { config: base, run } => {
                let mut engine = self.services.engines.load()?;
                let config = self
                    .services
                    .site_service()
                    .load(self.locations.base(base), &self.services.settings.config_file)?;
                engine.configure(&config)?;

                let mut session = SiteSession {
                    engine: engine.as_mut(),
                    config: &config,
                    services: self.services,
                    working_dir: &self.locations.working_dir,
                    out: &mut *out,
                };
                run(&mut session, arg)
            }
        };

        match result {
            Ok(()) => Ok(Outcome::Completed),
            Err(e) if spec.on_error == ErrorPolicy::LogAndContinue => {
                error!(command = spec.name, "{}", e);
                output::log(out, &format!("ERROR {e}"))?;
                Ok(Outcome::Logged(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Parse and execute. Parse failures become [`CliError::Usage`].
    pub fn run<I, T>(&self, argv: I, out: &mut dyn Write) -> CliResult<Outcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let invocation = self.parse(argv).map_err(|e| CliError::Usage(e.to_string()))?;
        self.execute(&invocation, out)
    }
}
