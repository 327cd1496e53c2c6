//! Write-once provisioning of the credentials file and workspace directory.
//!
//! An existing credentials file is never rewritten, not even partially; the
//! operator's keys live there. The workspace directory is created with any
//! missing parents and re-running is a no-op.

use std::path::Path;

use serde::Serialize;

use crate::environment::{Environment, FileInit};
use crate::error::BootstrapError;

/// Credentials file the GUI reads on startup.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Workspace the Swarms runtime writes under, per its own convention.
pub const DEFAULT_WORKSPACE_DIR: &str = "agent_workspace";

/// Requirements manifest consulted before single-package installs.
pub const DEFAULT_REQUIREMENTS: &str = "requirements.txt";

/// Key naming the workspace path inside the credentials file.
pub const WORKSPACE_KEY: &str = "WORKSPACE_DIR";

/// Provider key slots the template ships with, paired with the placeholder
/// text the operator is expected to replace.
pub const API_KEY_PLACEHOLDERS: [(&str, &str); 3] = [
    ("OPENAI_API_KEY", "your_openai_api_key_here"),
    ("ANTHROPIC_API_KEY", "your_anthropic_api_key_here"),
    ("GROQ_API_KEY", "your_groq_api_key_here"),
];

/// Whether an ensure step had to create its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    Created,
    Existing,
}

/// What `swarmup init` did, per path.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProvisionSummary {
    pub created: Vec<String>,
    pub existing: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Render the credentials template written on first run.
pub fn credentials_template(workspace_dir: &Path) -> String {
    let mut out = String::new();
    out.push_str("# Swarms GUI environment configuration.\n");
    out.push_str("# Replace the placeholder values with real provider credentials.\n");
    for (key, placeholder) in API_KEY_PLACEHOLDERS {
        out.push_str(&format!("{key}={placeholder}\n"));
    }
    out.push('\n');
    out.push_str("# Directory the Swarms runtime uses for its working data.\n");
    out.push_str(&format!("{WORKSPACE_KEY}={}\n", workspace_dir.display()));
    out
}

/// Create the credentials file from the template unless it already exists.
pub fn ensure_credentials_file(
    environment: &dyn Environment,
    path: &Path,
    workspace_dir: &Path,
) -> Result<Provisioned, BootstrapError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        environment
            .create_dir_all(parent)
            .map_err(|source| BootstrapError::CredentialsWrite {
                path: path.to_path_buf(),
                source,
            })?;
    }
    match environment.create_new_file(path, &credentials_template(workspace_dir)) {
        Ok(FileInit::Created) => Ok(Provisioned::Created),
        Ok(FileInit::AlreadyExists) => Ok(Provisioned::Existing),
        Err(source) => Err(BootstrapError::CredentialsWrite {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Create the workspace directory unless it already exists.
pub fn ensure_workspace_dir(
    environment: &dyn Environment,
    path: &Path,
) -> Result<Provisioned, BootstrapError> {
    if environment.is_dir(path) {
        return Ok(Provisioned::Existing);
    }
    if environment.path_exists(path) {
        return Err(BootstrapError::WorkspaceNotDirectory {
            path: path.to_path_buf(),
        });
    }
    environment
        .create_dir_all(path)
        .map_err(|source| BootstrapError::WorkspaceCreate {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Provisioned::Created)
}

/// Parse flat `KEY=value` lines, skipping blanks and `#` comments.
///
/// This is deliberately not a full dotenv dialect; the template only ever
/// writes the flat form and the GUI's own loader handles the rest.
pub fn parse_entries(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let (key, value) = line.split_once('=')?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Provider key slots still empty or carrying the template placeholder.
pub fn unfilled_api_keys(contents: &str) -> Vec<&'static str> {
    let entries = parse_entries(contents);
    let mut unfilled = Vec::new();
    for (key, placeholder) in API_KEY_PLACEHOLDERS {
        let value = entries
            .iter()
            .find(|(name, _)| name.as_str() == key)
            .map(|(_, value)| value.as_str());
        match value {
            Some(value) if !value.is_empty() && value != placeholder => {}
            _ => unfilled.push(key),
        }
    }
    unfilled
}

/// The `WORKSPACE_DIR` entry of a credentials file, when present.
pub fn workspace_entry(contents: &str) -> Option<String> {
    parse_entries(contents)
        .into_iter()
        .find(|(key, _)| key == WORKSPACE_KEY)
        .map(|(_, value)| value)
}
