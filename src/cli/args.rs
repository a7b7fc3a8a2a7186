//! Command table and clap command construction

use std::fmt;

use clap::{Arg, Command};

use crate::application::services::Template;
use crate::cli::commands::{self, SiteHandler};

/// Directory the site config file is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigBase {
    /// Directory containing the running executable
    InstallDir,
    /// Process working directory
    WorkingDir,
}

/// What happens when a command's handler fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Error reaches `main` and the process exits non-zero
    Propagate,
    /// Error is printed as `ERROR <msg>` and the process exits 0
    LogAndContinue,
}

/// What a command does.
#[derive(Clone, Copy)]
pub enum Action {
    /// Clone a template repository; needs neither engine nor site config
    Clone(Template),
    /// Load engine and site config, then run the handler
    Site { config: ConfigBase, run: SiteHandler },
}

/// One entry of the command table.
#[derive(Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    pub about: &'static str,
    /// Name of the single required positional argument, if any
    pub arg: Option<&'static str>,
    pub action: Action,
    pub on_error: ErrorPolicy,
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("arg", &self.arg)
            .field("on_error", &self.on_error)
            .finish_non_exhaustive()
    }
}

const fn site(
    name: &'static str,
    about: &'static str,
    arg: Option<&'static str>,
    run: SiteHandler,
    on_error: ErrorPolicy,
) -> CommandSpec {
    CommandSpec {
        name,
        about,
        arg,
        action: Action::Site {
            config: ConfigBase::InstallDir,
            run,
        },
        on_error,
    }
}

use ErrorPolicy::{LogAndContinue, Propagate};

/// All commands, in help order.
pub static COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "init",
        about: "Initialize an AkashaCMS site",
        arg: Some("dirName"),
        action: Action::Clone(Template::Example),
        on_error: Propagate,
    },
    CommandSpec {
        name: "skeleton",
        about: "Initialize a skeleton AkashaCMS site",
        arg: Some("dirName"),
        action: Action::Clone(Template::Skeleton),
        on_error: Propagate,
    },
    site("build", "Build an AkashaCMS site in the current directory", None, commands::build, Propagate),
    site("render", "Render a file into the output directory", Some("fileName"), commands::render, Propagate),
    site("zip", "Zip the rendered site", None, commands::zip, Propagate),
    site("ping", "Ping search engines for sitemap submission", None, commands::ping, Propagate),
    CommandSpec {
        name: "oembed",
        about: "Fetch oEmbed data for a URL",
        arg: Some("url"),
        action: Action::Site {
            config: ConfigBase::WorkingDir,
            run: commands::oembed,
        },
        on_error: Propagate,
    },
    site("metadata", "Print the metadata for a document", Some("fileName"), commands::metadata, LogAndContinue),
    site("findtemplate", "Show data about a template", Some("fileName"), commands::find_template, LogAndContinue),
    site("findpartial", "Show data about a partial", Some("fileName"), commands::find_partial, LogAndContinue),
    site("finddocument", "Show data about a document", Some("fileName"), commands::find_document, LogAndContinue),
    site("findasset", "Show data about an asset", Some("fileName"), commands::find_asset, LogAndContinue),
    site("deploy", "Deploy the rendered site", None, commands::deploy, Propagate),
    site("serve", "Run the editing server", None, commands::serve, LogAndContinue),
    site("preview", "Run a preview server over the rendered site", None, commands::preview, Propagate),
    site("fixup", "Replace stray U+00D0 characters in a document", Some("fileName"), commands::fixup, Propagate),
    site("indexChain", "List the index pages leading to a document", Some("fileName"), commands::index_chain, LogAndContinue),
    site("listfiles", "List the files in the site", None, commands::list_files, LogAndContinue),
    site("config", "Print the site configuration", None, commands::show_config, Propagate),
];

/// Look up a command by name.
pub fn find_command<'t>(table: &'t [CommandSpec], name: &str) -> Option<&'t CommandSpec> {
    table.iter().find(|spec| spec.name == name)
}

/// Build the clap command tree from a command table.
pub fn build_cli(table: &[CommandSpec]) -> Command {
    let mut cli = Command::new("akashacms")
        .version(env!("CARGO_PKG_VERSION"))
        .about("AkashaCMS site builder")
        .subcommand_required(true)
        .arg_required_else_help(true);

    for spec in table {
        let mut sub = Command::new(spec.name).about(spec.about);
        if let Some(arg) = spec.arg {
            sub = sub.arg(Arg::new(arg).value_name(arg).required(true));
        }
        cli = cli.subcommand(sub);
    }
    cli
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn verify_cli() {
        build_cli(COMMANDS).debug_assert();
    }

    #[test]
    fn given_table_when_checked_then_names_are_unique() {
        let names: HashSet<_> = COMMANDS.iter().map(|c| c.name).collect();
        assert_eq!(names.len(), COMMANDS.len());
        assert_eq!(COMMANDS.len(), 19);
    }

    #[test]
    fn given_table_when_partitioned_then_log_policy_commands_match() {
        let mut logged: Vec<_> = COMMANDS
            .iter()
            .filter(|c| c.on_error == LogAndContinue)
            .map(|c| c.name)
            .collect();
        logged.sort_unstable();
        assert_eq!(
            logged,
            [
                "findasset",
                "finddocument",
                "findpartial",
                "findtemplate",
                "indexChain",
                "listfiles",
                "metadata",
                "serve",
            ]
        );
    }

    #[test]
    fn given_oembed_when_looked_up_then_reads_config_from_working_dir() {
        let spec = find_command(COMMANDS, "oembed").unwrap();
        assert!(matches!(
            spec.action,
            Action::Site {
                config: ConfigBase::WorkingDir,
                ..
            }
        ));
        let build = find_command(COMMANDS, "build").unwrap();
        assert!(matches!(
            build.action,
            Action::Site {
                config: ConfigBase::InstallDir,
                ..
            }
        ));
    }

    #[test]
    fn given_render_args_when_parsed_then_positional_captured() {
        let matches = build_cli(COMMANDS)
            .try_get_matches_from(["akashacms", "render", "index.html.md"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "render");
        assert_eq!(
            sub.get_one::<String>("fileName").map(String::as_str),
            Some("index.html.md")
        );
    }

    #[test]
    fn given_unknown_command_when_parsed_then_error() {
        let result = build_cli(COMMANDS).try_get_matches_from(["akashacms", "frobnicate"]);
        assert!(result.is_err());
    }
}
