//! Host environment access behind a narrow trait.
//!
//! Everything the sequencer observes or mutates on the machine goes through
//! [`Environment`], so the sequencing logic itself can be exercised against a
//! fake without a Python toolchain on the test host. [`SystemEnvironment`] is
//! the real implementation used by the binary.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::interpreter::{PythonVersion, parse_version_output};

/// Longest stderr excerpt carried into an error message.
const STDERR_TAIL_LIMIT: usize = 2000;

/// Where a pip remediation pulls from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallSource {
    /// `pip install -r <manifest>`.
    Manifest(PathBuf),
    /// `pip install <requirement>`, e.g. `gradio>=4.0.0`.
    Requirement(String),
}

impl fmt::Display for InstallSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallSource::Manifest(path) => {
                write!(f, "requirements manifest '{}'", path.display())
            }
            InstallSource::Requirement(requirement) => write!(f, "package '{requirement}'"),
        }
    }
}

/// Outcome of a create-if-absent write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileInit {
    Created,
    AlreadyExists,
}

/// Result of probing the interpreter binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterpreterProbe {
    /// Binary ran and reported a parseable version.
    Version(PythonVersion),
    /// Binary could not be executed at all.
    Missing { detail: String },
    /// Binary ran but its banner was not recognized.
    Unrecognized { output: String },
}

/// Captured result of one pip run. A non-zero pip exit is a normal outcome
/// here, not an [`EnvironmentError`]; `detail` then carries the stderr tail.
#[derive(Debug, Clone)]
pub struct InstallOutput {
    pub success: bool,
    pub detail: String,
}

/// Unexpected host trouble while probing or installing.
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("pip install from {install} timed out after {timeout:?}")]
    InstallTimeout {
        install: InstallSource,
        timeout: Duration,
    },
}

/// The capabilities the bootstrap sequence needs from the host.
///
/// The subprocess-shaped probes are async; the filesystem operations are
/// small synchronous calls, matching how the sequencer consumes them.
#[async_trait]
pub trait Environment: Send + Sync {
    /// Probe `<python> --version`.
    async fn interpreter_version(&self, python: &str) -> InterpreterProbe;

    /// Whether `import <module>` succeeds under the given interpreter.
    async fn module_importable(&self, python: &str, module: &str)
    -> Result<bool, EnvironmentError>;

    /// Run `<python> -m pip install` against the given source.
    async fn pip_install(
        &self,
        python: &str,
        source: &InstallSource,
        timeout: Duration,
    ) -> Result<InstallOutput, EnvironmentError>;

    /// Whether anything exists at the path, file or directory.
    fn path_exists(&self, path: &Path) -> bool;

    /// Whether the path exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Write `contents` to a new file, refusing to touch an existing one.
    fn create_new_file(&self, path: &Path, contents: &str) -> io::Result<FileInit>;

    /// Create the directory and any missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// [`Environment`] backed by the real host.
pub struct SystemEnvironment;

#[async_trait]
impl Environment for SystemEnvironment {
    async fn interpreter_version(&self, python: &str) -> InterpreterProbe {
        let output = match Command::new(python).arg("--version").output().await {
            Ok(output) => output,
            Err(err) => {
                return InterpreterProbe::Missing {
                    detail: err.to_string(),
                };
            }
        };
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        // Python 2 printed the version banner to stderr.
        let banner = if stdout.trim().is_empty() {
            stderr
        } else {
            stdout
        };
        match parse_version_output(&banner) {
            Some(version) => InterpreterProbe::Version(version),
            None => InterpreterProbe::Unrecognized {
                output: banner.trim().to_string(),
            },
        }
    }

    async fn module_importable(
        &self,
        python: &str,
        module: &str,
    ) -> Result<bool, EnvironmentError> {
        let status = Command::new(python)
            .arg("-c")
            .arg(format!("import {module}"))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|source| EnvironmentError::Spawn {
                program: python.to_string(),
                source,
            })?;
        debug!(module, importable = status.success(), "import probe");
        Ok(status.success())
    }

    async fn pip_install(
        &self,
        python: &str,
        source: &InstallSource,
        timeout: Duration,
    ) -> Result<InstallOutput, EnvironmentError> {
        let mut command = Command::new(python);
        command.arg("-m").arg("pip").arg("install");
        match source {
            InstallSource::Manifest(path) => {
                command.arg("-r").arg(path);
            }
            InstallSource::Requirement(requirement) => {
                command.arg(requirement);
            }
        }
        command.stdin(Stdio::null());
        // Dropping the future on timeout must also stop the pip process.
        command.kill_on_drop(true);

        let output = match tokio::time::timeout(timeout, command.output()).await {
            Ok(result) => result.map_err(|err| EnvironmentError::Spawn {
                program: format!("{python} -m pip"),
                source: err,
            })?,
            Err(_) => {
                return Err(EnvironmentError::InstallTimeout {
                    install: source.clone(),
                    timeout,
                });
            }
        };

        if output.status.success() {
            Ok(InstallOutput {
                success: true,
                detail: String::new(),
            })
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Ok(InstallOutput {
                success: false,
                detail: stderr_tail(stderr.trim()),
            })
        }
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_new_file(&self, path: &Path, contents: &str) -> io::Result<FileInit> {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(mut file) => {
                file.write_all(contents.as_bytes())?;
                Ok(FileInit::Created)
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(FileInit::AlreadyExists),
            Err(err) => Err(err),
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Keep the final part of a stderr dump, where pip puts the actual error.
fn stderr_tail(stderr: &str) -> String {
    if stderr.len() <= STDERR_TAIL_LIMIT {
        return stderr.to_string();
    }
    let start = stderr.len() - STDERR_TAIL_LIMIT;
    // Avoid splitting a UTF-8 sequence mid-character.
    let start = (start..stderr.len())
        .find(|index| stderr.is_char_boundary(*index))
        .unwrap_or(stderr.len());
    format!("... {}", &stderr[start..])
}
