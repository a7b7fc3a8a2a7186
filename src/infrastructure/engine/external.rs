//! Engine implementation that drives an external engine executable
//!
//! Each operation runs `<engine> <op> --request <file>`. The request file holds
//! the site config, the directories gathered so far and the operation
//! arguments as JSON. Captured operations answer with JSON on stdout;
//! long-running ones (servers, upload) inherit the terminal.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::domain::{DeploySsh2Sync, DocumentEntry, SiteConfig};
use crate::infrastructure::engine::{
    ContentEngine, EngineError, EngineLocator, EngineProvider, EngineResult, ResourceKind,
};
use crate::infrastructure::traits::{CommandRunner, FileSystem, StreamingChild};
use crate::infrastructure::InfraResult;

/// JSON payload written to the request file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineRequest {
    pub op: String,
    pub config: SiteConfig,
    /// Document roots gathered earlier in this invocation
    pub gathered: Vec<PathBuf>,
    pub args: Value,
}

#[derive(Debug, Deserialize)]
struct GatherResponse {
    #[serde(default)]
    documents: usize,
}

/// Content engine backed by an engine executable.
pub struct ExternalEngine {
    program: PathBuf,
    cmd: Arc<dyn CommandRunner>,
    rsync: String,
    config: Option<SiteConfig>,
    gathered: Vec<PathBuf>,
}

impl ExternalEngine {
    pub fn new(program: PathBuf, cmd: Arc<dyn CommandRunner>, rsync: impl Into<String>) -> Self {
        Self {
            program,
            cmd,
            rsync: rsync.into(),
            config: None,
            gathered: Vec::new(),
        }
    }

    fn config(&self) -> EngineResult<&SiteConfig> {
        self.config.as_ref().ok_or(EngineError::NotConfigured)
    }

    /// Write the request file for `op`. The file lives as long as the returned handle.
    fn write_request(&self, op: &str, args: Value) -> EngineResult<NamedTempFile> {
        let request = EngineRequest {
            op: op.to_string(),
            config: self.config()?.clone(),
            gathered: self.gathered.clone(),
            args,
        };
        let io_err = |source| EngineError::Io {
            op: op.to_string(),
            source,
        };

        let mut file = NamedTempFile::new().map_err(io_err)?;
        let payload = serde_json::to_vec(&request).map_err(|source| EngineError::Protocol {
            op: op.to_string(),
            source,
        })?;
        file.write_all(&payload).map_err(io_err)?;
        file.flush().map_err(io_err)?;
        Ok(file)
    }

    /// Run a captured operation and return its JSON result (`null` for empty output).
    fn call(&self, op: &str, args: Value) -> EngineResult<Value> {
        let request = self.write_request(op, args)?;
        let request_path = request.path().to_string_lossy().into_owned();
        let program = self.program.to_string_lossy();
        debug!("call: {} {} --request {}", program, op, request_path);

        let output = self
            .cmd
            .run(&program, &[op, "--request", request_path.as_str()])
            .map_err(|source| EngineError::Io {
                op: op.to_string(),
                source,
            })?;

        if !output.success() {
            return Err(EngineError::Failed {
                op: op.to_string(),
                code: output.code,
                message: output.stderr.trim().to_string(),
            });
        }

        let stdout = output.stdout.trim();
        if stdout.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(stdout).map_err(|source| EngineError::Protocol {
            op: op.to_string(),
            source,
        })
    }

    /// Run a captured operation and deserialize its result.
    fn call_as<T: DeserializeOwned>(&self, op: &str, args: Value) -> EngineResult<T> {
        let value = self.call(op, args)?;
        serde_json::from_value(value).map_err(|source| EngineError::Protocol {
            op: op.to_string(),
            source,
        })
    }

    /// Run an operation on the terminal, blocking until the engine exits.
    fn call_inherited(&self, op: &str, args: Value) -> EngineResult<()> {
        let request = self.write_request(op, args)?;
        let request_path = request.path().to_string_lossy().into_owned();
        let program = self.program.to_string_lossy();
        debug!("call_inherited: {} {} --request {}", program, op, request_path);

        let code = self
            .cmd
            .run_inherited(&program, &[op, "--request", request_path.as_str()])
            .map_err(|source| EngineError::Io {
                op: op.to_string(),
                source,
            })?;

        match code {
            Some(0) => Ok(()),
            code => Err(EngineError::Failed {
                op: op.to_string(),
                code,
                message: "engine exited unsuccessfully".to_string(),
            }),
        }
    }
}

impl ContentEngine for ExternalEngine {
    fn configure(&mut self, config: &SiteConfig) -> EngineResult<()> {
        self.config = Some(config.clone());
        self.gathered.clear();
        Ok(())
    }

    fn process(&self) -> EngineResult<()> {
        self.call("process", Value::Null).map(|_| ())
    }

    fn gather_dir(&mut self, dirs: &[PathBuf]) -> EngineResult<usize> {
        let response: GatherResponse = self.call_as("gatherDir", json!({ "dirs": dirs }))?;
        self.gathered = dirs.to_vec();
        Ok(response.documents)
    }

    fn render_file(&self, name: &str) -> EngineResult<()> {
        self.call("renderFile", json!({ "name": name })).map(|_| ())
    }

    fn zip_rendered_site(&self) -> EngineResult<()> {
        self.call("zipRenderedSite", Value::Null).map(|_| ())
    }

    fn ping_xml_sitemap(&self) -> EngineResult<()> {
        self.call("pingXmlSitemap", Value::Null).map(|_| ())
    }

    fn oembed_data(&self, url: &str) -> EngineResult<Value> {
        self.call("oEmbedData", json!({ "url": url }))
    }

    fn read_document_entry(&self, name: &str) -> EngineResult<DocumentEntry> {
        self.call_as("readDocumentEntry", json!({ "name": name }))
    }

    fn find(&self, kind: ResourceKind, name: &str) -> EngineResult<Value> {
        self.call(kind.operation(), json!({ "name": name }))
    }

    fn deploy_via_rsync(&self) -> EngineResult<Box<dyn StreamingChild>> {
        let config = self.config()?;
        let rsync = config
            .deploy_rsync
            .as_ref()
            .ok_or(EngineError::MissingDeployTarget("deploy_rsync"))?;
        let args = rsync.command_args(&config.root_out)?;
        debug!("deploy_via_rsync: {} {}", self.rsync, args.join(" "));

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.cmd
            .spawn_piped(&self.rsync, &args)
            .map_err(|source| EngineError::Io {
                op: "deployViaRsync".to_string(),
                source,
            })
    }

    fn upload_remote(&self, local: &Path, target: &DeploySsh2Sync) -> EngineResult<()> {
        self.call_inherited(
            "upload",
            json!({
                "local": local,
                "remote": target.root_remote,
                "force": target.force,
                "auth": target.auth,
            }),
        )
    }

    fn run_edit_server(&self) -> EngineResult<()> {
        self.call_inherited("runEditServer", Value::Null)
    }

    fn run_preview_server(&self) -> EngineResult<()> {
        self.call_inherited("runPreviewServer", Value::Null)
    }

    fn index_chain(&self, name: &str) -> EngineResult<Vec<DocumentEntry>> {
        self.call_as("indexChain", json!({ "name": name }))
    }

    fn each_document(&self, visitor: &mut dyn FnMut(&DocumentEntry)) -> EngineResult<()> {
        let documents: Vec<DocumentEntry> = self.call_as("eachDocument", Value::Null)?;
        for doc in &documents {
            visitor(doc);
        }
        Ok(())
    }
}

/// [`EngineProvider`] that locates the engine executable on each load.
pub struct ExternalEngineProvider {
    locator: EngineLocator,
    fs: Arc<dyn FileSystem>,
    cmd: Arc<dyn CommandRunner>,
    rsync: String,
}

impl ExternalEngineProvider {
    pub fn new(
        locator: EngineLocator,
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        rsync: impl Into<String>,
    ) -> Self {
        Self {
            locator,
            fs,
            cmd,
            rsync: rsync.into(),
        }
    }
}

impl EngineProvider for ExternalEngineProvider {
    fn load(&self) -> InfraResult<Box<dyn ContentEngine>> {
        let program = self.locator.locate(self.fs.as_ref())?;
        debug!("load: engine at {}", program.display());
        Ok(Box::new(ExternalEngine::new(
            program,
            Arc::clone(&self.cmd),
            self.rsync.clone(),
        )))
    }
}
