//! Python dependency reconciliation.
//!
//! Each dependency gets exactly one reconciliation pass: probe the import,
//! optionally run one install, then probe again. There is no retry loop; a
//! dependency that is still missing after its install attempt is reported as
//! unavailable and the sequence stops.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use crate::environment::{Environment, EnvironmentError, InstallSource};

/// A Python distribution the GUI stack needs: the module name used for the
/// import probe and the pinned requirement used when no manifest is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PythonDependency {
    pub module: &'static str,
    pub requirement: &'static str,
}

/// The Gradio rendering library the GUI is built on.
pub const GUI_LIBRARY: PythonDependency = PythonDependency {
    module: "gradio",
    requirement: "gradio>=4.0.0",
};

/// The Swarms agent framework the GUI drives.
pub const AGENT_FRAMEWORK: PythonDependency = PythonDependency {
    module: "swarms",
    requirement: "swarms>=6.0.0",
};

/// Upper bound for one pip run unless the caller overrides it.
pub const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(300);

/// How `reconcile` may repair a missing dependency.
#[derive(Debug, Clone)]
pub struct InstallPolicy {
    /// When false, a missing dependency is reported without touching pip.
    pub allowed: bool,
    /// Manifest preferred over the single pinned requirement when it exists.
    pub manifest: PathBuf,
    pub timeout: Duration,
}

/// Tagged outcome of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Already importable; pip was not invoked.
    Satisfied,
    /// Installed on this run and importable afterwards.
    Remediated { via: InstallSource },
    /// Not importable and not repaired; `detail` says why.
    Unavailable { detail: String },
}

/// Bring one dependency into the importable state, or say why that failed.
///
/// `Err` is reserved for host trouble such as the interpreter vanishing
/// mid-sequence; every pip-level failure comes back as
/// [`Reconciliation::Unavailable`].
pub async fn reconcile(
    environment: &dyn Environment,
    python: &str,
    dependency: &PythonDependency,
    policy: &InstallPolicy,
) -> Result<Reconciliation, EnvironmentError> {
    if environment.module_importable(python, dependency.module).await? {
        debug!(module = dependency.module, "already importable");
        return Ok(Reconciliation::Satisfied);
    }

    if !policy.allowed {
        return Ok(Reconciliation::Unavailable {
            detail: format!(
                "not importable and installs are disabled; run `{python} -m pip install \"{}\"` yourself or drop --no-install",
                dependency.requirement
            ),
        });
    }

    let source = if environment.path_exists(&policy.manifest) {
        InstallSource::Manifest(policy.manifest.clone())
    } else {
        InstallSource::Requirement(dependency.requirement.to_string())
    };
    info!(module = dependency.module, %source, "dependency missing, installing");

    let output = match environment.pip_install(python, &source, policy.timeout).await {
        Ok(output) => output,
        Err(EnvironmentError::InstallTimeout { install, timeout }) => {
            return Ok(Reconciliation::Unavailable {
                detail: format!(
                    "install from {install} gave up after {}; re-run with a larger --install-timeout",
                    humantime::format_duration(timeout)
                ),
            });
        }
        Err(err) => return Err(err),
    };
    if !output.success {
        return Ok(Reconciliation::Unavailable {
            detail: format!("install from {source} failed: {}", output.detail),
        });
    }

    // A zero pip exit proves nothing by itself; only a fresh import probe
    // confirms the repair.
    if environment.module_importable(python, dependency.module).await? {
        Ok(Reconciliation::Remediated { via: source })
    } else {
        Ok(Reconciliation::Unavailable {
            detail: format!("still not importable after an install from {source}"),
        })
    }
}
