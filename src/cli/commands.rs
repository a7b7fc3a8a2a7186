//! Site command handlers
//!
//! Every handler receives a [`SiteSession`] holding a configured engine and
//! the loaded site config. Results go to `session.out`.

use std::io::Write;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::application::services::{stream_child, OutputStream};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::domain::{DeployTarget, SiteConfig};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::engine::{ContentEngine, ResourceKind};
use crate::infrastructure::InfraError;

/// Tracing target for deploy subprocess output.
pub const DEPLOY_TARGET: &str = "akashacms::deploy";

/// Everything a site command needs once the engine is configured.
pub struct SiteSession<'s> {
    pub engine: &'s mut dyn ContentEngine,
    pub config: &'s SiteConfig,
    pub services: &'s ServiceContainer,
    pub working_dir: &'s Path,
    pub out: &'s mut dyn Write,
}

impl SiteSession<'_> {
    /// Index the document roots.
    fn gather(&mut self) -> CliResult<usize> {
        let count = self.engine.gather_dir(&self.config.root_docs)?;
        debug!("gathered {} documents", count);
        Ok(count)
    }

    fn log(&mut self, msg: &(impl std::fmt::Display + ?Sized)) -> CliResult<()> {
        output::log(self.out, msg)?;
        Ok(())
    }
}

/// Signature shared by all site command handlers.
pub type SiteHandler = fn(&mut SiteSession<'_>, Option<&str>) -> CliResult<()>;

fn required<'a>(arg: Option<&'a str>, what: &str) -> CliResult<&'a str> {
    arg.ok_or_else(|| CliError::InvalidArgs(format!("missing <{what}>")))
}

pub fn build(session: &mut SiteSession<'_>, _arg: Option<&str>) -> CliResult<()> {
    session.engine.process()?;
    Ok(())
}

pub fn render(session: &mut SiteSession<'_>, arg: Option<&str>) -> CliResult<()> {
    let name = required(arg, "fileName")?;
    session.gather()?;
    session.engine.render_file(name)?;
    Ok(())
}

pub fn zip(session: &mut SiteSession<'_>, _arg: Option<&str>) -> CliResult<()> {
    session.engine.zip_rendered_site()?;
    Ok(())
}

pub fn ping(session: &mut SiteSession<'_>, _arg: Option<&str>) -> CliResult<()> {
    session.engine.ping_xml_sitemap()?;
    Ok(())
}

pub fn oembed(session: &mut SiteSession<'_>, arg: Option<&str>) -> CliResult<()> {
    let url = required(arg, "url")?;
    let result = session.engine.oembed_data(url)?;
    session.log(&output::pretty(&result))
}

pub fn metadata(session: &mut SiteSession<'_>, arg: Option<&str>) -> CliResult<()> {
    let name = required(arg, "fileName")?;
    let entry = session.engine.read_document_entry(name)?;
    session.log(&output::pretty(&entry.frontmatter.yaml))
}

pub fn find_template(session: &mut SiteSession<'_>, arg: Option<&str>) -> CliResult<()> {
    find(session, ResourceKind::Template, arg)
}

pub fn find_partial(session: &mut SiteSession<'_>, arg: Option<&str>) -> CliResult<()> {
    find(session, ResourceKind::Partial, arg)
}

pub fn find_document(session: &mut SiteSession<'_>, arg: Option<&str>) -> CliResult<()> {
    find(session, ResourceKind::Document, arg)
}

pub fn find_asset(session: &mut SiteSession<'_>, arg: Option<&str>) -> CliResult<()> {
    find(session, ResourceKind::Asset, arg)
}

fn find(session: &mut SiteSession<'_>, kind: ResourceKind, arg: Option<&str>) -> CliResult<()> {
    let name = required(arg, "fileName")?;
    debug!("find {} {}", kind, name);
    let info = session.engine.find(kind, name)?;
    session.log(&output::pretty(&info))
}

pub fn deploy(session: &mut SiteSession<'_>, _arg: Option<&str>) -> CliResult<()> {
    match session.config.deploy_target() {
        DeployTarget::Remote(target) => {
            info!(target: DEPLOY_TARGET, "uploading {}", session.config.root_out.display());
            session.engine.upload_remote(&session.config.root_out, target)?;
        }
        DeployTarget::Rsync(_) => {
            let mut child = session.engine.deploy_via_rsync()?;
            let code = stream_child(child.as_mut(), |stream, line| match stream {
                OutputStream::Stdout => info!(target: DEPLOY_TARGET, "{}", line),
                OutputStream::Stderr => error!(target: DEPLOY_TARGET, "ERROR {}", line),
            })
            .map_err(|e| InfraError::io("stream rsync output", e))?;
            info!(
                target: DEPLOY_TARGET,
                "RSYNC FINISHED with code={}",
                code.map_or_else(|| "signal".to_string(), |c| c.to_string())
            );
        }
        DeployTarget::Unconfigured => {
            warn!("no deployment mechanism configured (deploy_ssh2sync or deploy_rsync)");
        }
    }
    Ok(())
}

pub fn serve(session: &mut SiteSession<'_>, _arg: Option<&str>) -> CliResult<()> {
    session.gather()?;
    session.engine.run_edit_server()?;
    Ok(())
}

pub fn preview(session: &mut SiteSession<'_>, _arg: Option<&str>) -> CliResult<()> {
    session.engine.run_preview_server()?;
    Ok(())
}

pub fn fixup(session: &mut SiteSession<'_>, arg: Option<&str>) -> CliResult<()> {
    let name = required(arg, "fileName")?;
    let entry = session.engine.read_document_entry(name)?;
    let written = session.services.fixup_service().fixup(&entry.fullpath)?;
    info!("wrote {}", written.display());
    Ok(())
}

pub fn index_chain(session: &mut SiteSession<'_>, arg: Option<&str>) -> CliResult<()> {
    let name = required(arg, "fileName")?;
    session.gather()?;
    let chain = session.engine.index_chain(name)?;
    session.log(&output::pretty(&chain))
}

pub fn list_files(session: &mut SiteSession<'_>, _arg: Option<&str>) -> CliResult<()> {
    session.gather()?;
    let mut paths = Vec::new();
    session
        .engine
        .each_document(&mut |entry| paths.push(entry.fullpath.display().to_string()))?;
    for path in &paths {
        session.log(path)?;
    }
    Ok(())
}

pub fn show_config(session: &mut SiteSession<'_>, _arg: Option<&str>) -> CliResult<()> {
    print_config(session.out, session.working_dir, session.config)?;
    Ok(())
}

fn print_config(out: &mut dyn Write, working_dir: &Path, config: &SiteConfig) -> std::io::Result<()> {
    output::line(out, &format!("dirname: {}", working_dir.display()))?;
    output::line(out, &format!("output directory: {}", config.root_out.display()))?;
    output::blank(out)?;

    let sections = [
        ("documents", &config.root_docs),
        ("assets", &config.root_assets),
        ("partials", &config.root_partials),
        ("layouts", &config.root_layouts),
    ];
    for (label, dirs) in sections {
        output::line(out, &format!("{label} directories:"))?;
        for dir in dirs {
            output::detail(out, &dir.display())?;
        }
        output::blank(out)?;
    }

    output::line(out, "plugins:")?;
    for name in config.plugin_names() {
        output::detail(out, name)?;
    }
    output::blank(out)?;

    let data = match &config.data {
        Value::Null => "{}".to_string(),
        data => data.to_string(),
    };
    output::line(out, &format!("data: {data}"))
}
