//! The handoff, described as data.
//!
//! The sequencer produces a [`LaunchPlan`] instead of spawning anything
//! itself; only the binary turns the plan into a real child process. That
//! keeps the whole pre-flight testable without ever starting a GUI.

use std::path::PathBuf;
use std::process::Command;

use serde::Serialize;

/// Port the GUI binds by default, Gradio's own default.
pub const DEFAULT_PORT: u16 = 7860;

/// Loopback by default; `0.0.0.0` exposes the GUI on all interfaces.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Entry-point script of the external application.
pub const DEFAULT_ENTRY: &str = "swarms_gui.py";

/// Address a local client should dial, with the wildcard bind mapped back to
/// loopback.
pub fn dial_url(host: &str, port: u16) -> String {
    let host = if host == "0.0.0.0" { "127.0.0.1" } else { host };
    format!("http://{host}:{port}")
}

/// Everything the foreground handoff needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchPlan {
    pub python: String,
    pub entry: PathBuf,
    pub host: String,
    pub port: u16,
}

impl LaunchPlan {
    /// URL the GUI serves once it is up.
    pub fn url(&self) -> String {
        dial_url(&self.host, self.port)
    }

    /// Foreground command for the GUI process. Bind address and port reach
    /// Gradio through its own environment variables; stdio is left alone so
    /// the GUI owns the terminal until it exits.
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.python);
        command
            .arg(&self.entry)
            .env("GRADIO_SERVER_NAME", &self.host)
            .env("GRADIO_SERVER_PORT", self.port.to_string());
        command
    }
}
