//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::process::{Child, Command, Stdio};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Read raw file contents.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Write raw content to file.
    fn write(&self, path: &Path, content: &[u8]) -> io::Result<()>;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// A running child process whose output is read line by line.
pub trait StreamingChild: Send {
    /// Take the stdout reader. Returns `None` on the second call.
    fn take_stdout(&mut self) -> Option<Box<dyn BufRead + Send>>;

    /// Take the stderr reader. Returns `None` on the second call.
    fn take_stderr(&mut self) -> Option<Box<dyn BufRead + Send>>;

    /// Wait for the process to exit and return its exit code.
    fn wait(&mut self) -> io::Result<Option<i32>>;
}

/// External command runner abstraction.
pub trait CommandRunner: Send + Sync {
    /// Run a command with arguments, capturing stdout and stderr.
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<CommandOutput>;

    /// Run a command with inherited stdio. Blocks until it exits.
    fn run_inherited(&self, cmd: &str, args: &[&str]) -> io::Result<Option<i32>>;

    /// Spawn a command with piped stdout/stderr and return immediately.
    fn spawn_piped(&self, cmd: &str, args: &[&str]) -> io::Result<Box<dyn StreamingChild>>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Real command runner implementation.
#[derive(Debug, Default)]
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<CommandOutput> {
        let output = Command::new(cmd).args(args).stdin(Stdio::null()).output()?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn run_inherited(&self, cmd: &str, args: &[&str]) -> io::Result<Option<i32>> {
        let status = Command::new(cmd).args(args).status()?;
        Ok(status.code())
    }

    fn spawn_piped(&self, cmd: &str, args: &[&str]) -> io::Result<Box<dyn StreamingChild>> {
        let child = Command::new(cmd)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        Ok(Box::new(PipedChild { child }))
    }
}

/// [`StreamingChild`] over a real `std::process::Child`.
#[derive(Debug)]
pub struct PipedChild {
    child: Child,
}

impl StreamingChild for PipedChild {
    fn take_stdout(&mut self) -> Option<Box<dyn BufRead + Send>> {
        self.child
            .stdout
            .take()
            .map(|s| Box::new(BufReader::new(s)) as Box<dyn BufRead + Send>)
    }

    fn take_stderr(&mut self) -> Option<Box<dyn BufRead + Send>> {
        self.child
            .stderr
            .take()
            .map(|s| Box::new(BufReader::new(s)) as Box<dyn BufRead + Send>)
    }

    fn wait(&mut self) -> io::Result<Option<i32>> {
        Ok(self.child.wait()?.code())
    }
}
