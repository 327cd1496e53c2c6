//! Failures that abort the bootstrap sequence.
//!
//! Messages are shown to the operator verbatim, so each one carries its own
//! remediation hint.

use std::io;
use std::path::PathBuf;

use crate::environment::EnvironmentError;
use crate::interpreter::PythonVersion;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(
        "python interpreter '{python}' was not found on PATH ({detail}); install Python {minimum} or newer from https://www.python.org/downloads/ and re-run"
    )]
    InterpreterMissing {
        python: String,
        detail: String,
        minimum: PythonVersion,
    },

    #[error(
        "python interpreter '{python}' is version {found}, but the Swarms GUI needs {minimum} or newer; upgrade via your package manager or https://www.python.org/downloads/"
    )]
    InterpreterTooOld {
        python: String,
        found: PythonVersion,
        minimum: PythonVersion,
    },

    #[error("could not parse a version from `{python} --version`; it printed: '{output}'")]
    InterpreterUnrecognized { python: String, output: String },

    #[error("python package '{module}' is unavailable: {detail}")]
    DependencyUnavailable { module: String, detail: String },

    #[error(transparent)]
    Probe(#[from] EnvironmentError),

    #[error("failed to write credentials file '{}': {source}", .path.display())]
    CredentialsWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create workspace directory '{}': {source}", .path.display())]
    WorkspaceCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "workspace path '{}' exists but is not a directory; move it aside or pass --workspace-dir",
        .path.display()
    )]
    WorkspaceNotDirectory { path: PathBuf },
}
