//! Site configuration model
//!
//! The site config is the TOML rendition of the toolchain's `config.js`:
//! document, asset, partial and layout roots, the output directory, the plugin
//! list, a free-form data blob and optional deployment descriptors. Keys the
//! dispatcher does not know about are kept in `extra` and forwarded to the
//! engine untouched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::DomainError;

/// Plugin reference in the site config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PluginRef {
    pub name: String,
    /// Plugin-specific options, passed through to the engine
    #[serde(flatten)]
    pub options: BTreeMap<String, Value>,
}

/// Remote sync deployment: upload `root_out` to a remote directory over ssh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeploySsh2Sync {
    pub root_remote: String,
    #[serde(default)]
    pub force: bool,
    /// Connection parameters (host, port, username, key), engine-defined
    #[serde(default)]
    pub auth: Value,
}

/// rsync deployment descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployRsync {
    #[serde(default)]
    pub user: Option<String>,
    pub host: String,
    pub dir: String,
    #[serde(default)]
    pub exclude: Option<String>,
    #[serde(default, rename = "excludeFile", alias = "exclude_file")]
    pub exclude_file: Option<PathBuf>,
    #[serde(default)]
    pub delete: bool,
}

impl DeployRsync {
    /// Remote destination in rsync syntax: `[user@]host:dir/`.
    pub fn destination(&self) -> String {
        let dir = self.dir.trim_end_matches('/');
        match &self.user {
            Some(user) => format!("{}@{}:{}/", user, self.host, dir),
            None => format!("{}:{}/", self.host, dir),
        }
    }

    /// Full rsync argument list for mirroring `root_out` to the destination.
    pub fn command_args(&self, root_out: &Path) -> Result<Vec<String>, DomainError> {
        if self.host.trim().is_empty() {
            return Err(DomainError::MissingRsyncHost);
        }

        let mut args = vec![
            "--verbose".to_string(),
            "--archive".to_string(),
            "--compress".to_string(),
        ];
        if self.delete {
            args.push("--delete".to_string());
        }
        if let Some(pattern) = &self.exclude {
            args.push("--exclude".to_string());
            args.push(pattern.clone());
        }
        if let Some(file) = &self.exclude_file {
            args.push("--exclude-from".to_string());
            args.push(file.display().to_string());
        }

        // trailing slash: copy the contents of root_out, not the directory itself
        let source = root_out.display().to_string();
        args.push(format!("{}/", source.trim_end_matches('/')));
        args.push(self.destination());
        Ok(args)
    }
}

/// Which deployment mechanism the site config selects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeployTarget<'a> {
    Remote(&'a DeploySsh2Sync),
    Rsync(&'a DeployRsync),
    Unconfigured,
}

/// Site configuration, read once per invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteConfig {
    /// Rendered output directory
    pub root_out: PathBuf,
    #[serde(default)]
    pub root_docs: Vec<PathBuf>,
    #[serde(default)]
    pub root_assets: Vec<PathBuf>,
    #[serde(default)]
    pub root_partials: Vec<PathBuf>,
    #[serde(default)]
    pub root_layouts: Vec<PathBuf>,
    #[serde(default)]
    pub plugins: Vec<PluginRef>,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_ssh2sync: Option<DeploySsh2Sync>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_rsync: Option<DeployRsync>,
    /// Everything else in the file, forwarded to the engine
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SiteConfig {
    /// Parse site config TOML. `source` is only used for error messages.
    pub fn parse(content: &str, source: &Path) -> Result<Self, DomainError> {
        toml::from_str(content).map_err(|e| DomainError::InvalidSiteConfig {
            path: source.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Deployment mechanism, remote sync taking precedence over rsync.
    pub fn deploy_target(&self) -> DeployTarget<'_> {
        if let Some(remote) = &self.deploy_ssh2sync {
            DeployTarget::Remote(remote)
        } else if let Some(rsync) = &self.deploy_rsync {
            DeployTarget::Rsync(rsync)
        } else {
            DeployTarget::Unconfigured
        }
    }

    /// Plugin names in declaration order.
    pub fn plugin_names(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|p| p.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
root_out = "out"
root_docs = ["documents", "more-documents"]
root_assets = ["assets"]
root_partials = ["partials"]
root_layouts = ["layouts"]
root_url = "https://example.com"

[[plugins]]
name = "akashacms-base"

[[plugins]]
name = "akashacms-breadcrumbs"
depth = 3

[data]
title = "Example"

[deploy_rsync]
user = "deploy"
host = "example.com"
dir = "/var/www/site/"
exclude = ".DS_Store"
delete = true
"#;

    #[test]
    fn given_full_config_when_parse_then_reads_all_fields() {
        let cfg = SiteConfig::parse(FULL, Path::new("config.toml")).unwrap();

        assert_eq!(cfg.root_out, PathBuf::from("out"));
        assert_eq!(
            cfg.root_docs,
            vec![PathBuf::from("documents"), PathBuf::from("more-documents")]
        );
        assert_eq!(
            cfg.plugin_names().collect::<Vec<_>>(),
            vec!["akashacms-base", "akashacms-breadcrumbs"]
        );
        assert_eq!(cfg.plugins[1].options.get("depth"), Some(&Value::from(3)));
        assert_eq!(cfg.data["title"], Value::from("Example"));
        assert_eq!(
            cfg.extra.get("root_url"),
            Some(&Value::from("https://example.com"))
        );
        assert!(cfg.deploy_ssh2sync.is_none());
        assert!(cfg.deploy_rsync.is_some());
    }

    #[test]
    fn given_minimal_config_when_parse_then_lists_default_to_empty() {
        let cfg = SiteConfig::parse("root_out = \"out\"\n", Path::new("config.toml")).unwrap();

        assert!(cfg.root_docs.is_empty());
        assert!(cfg.plugins.is_empty());
        assert_eq!(cfg.data, Value::Null);
        assert_eq!(cfg.deploy_target(), DeployTarget::Unconfigured);
    }

    #[test]
    fn given_missing_root_out_when_parse_then_fails_with_path() {
        let err = SiteConfig::parse("root_docs = []\n", Path::new("/site/config.toml")).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("/site/config.toml"), "{msg}");
        assert!(msg.contains("root_out"), "{msg}");
    }

    #[test]
    fn given_both_mechanisms_when_deploy_target_then_remote_wins() {
        let cfg = SiteConfig::parse(
            r#"
root_out = "out"
[deploy_ssh2sync]
root_remote = "/home/site"
[deploy_rsync]
host = "example.com"
dir = "/var/www"
"#,
            Path::new("config.toml"),
        )
        .unwrap();

        assert!(matches!(cfg.deploy_target(), DeployTarget::Remote(r) if r.root_remote == "/home/site"));
    }

    #[test]
    fn given_rsync_descriptor_when_command_args_then_builds_mirror_invocation() {
        let cfg = SiteConfig::parse(FULL, Path::new("config.toml")).unwrap();
        let rsync = cfg.deploy_rsync.as_ref().unwrap();

        let args = rsync.command_args(&cfg.root_out).unwrap();

        assert_eq!(
            args,
            vec![
                "--verbose",
                "--archive",
                "--compress",
                "--delete",
                "--exclude",
                ".DS_Store",
                "out/",
                "deploy@example.com:/var/www/site/",
            ]
        );
    }

    #[test]
    fn given_no_user_when_destination_then_omits_at_sign() {
        let rsync = DeployRsync {
            user: None,
            host: "example.com".into(),
            dir: "/srv".into(),
            exclude: None,
            exclude_file: Some(PathBuf::from("rsync-excludes.txt")),
            delete: false,
        };

        let args = rsync.command_args(Path::new("out/")).unwrap();

        assert_eq!(
            args,
            vec![
                "--verbose",
                "--archive",
                "--compress",
                "--exclude-from",
                "rsync-excludes.txt",
                "out/",
                "example.com:/srv/",
            ]
        );
    }

    #[test]
    fn given_empty_host_when_command_args_then_rejects() {
        let rsync = DeployRsync {
            user: None,
            host: " ".into(),
            dir: "/srv".into(),
            exclude: None,
            exclude_file: None,
            delete: false,
        };

        assert!(matches!(
            rsync.command_args(Path::new("out")),
            Err(DomainError::MissingRsyncHost)
        ));
    }
}
