//! Accounting for what the pre-flight observed and repaired.

use std::fmt;

use serde::Serialize;

/// Names for the fixed checks. Dependency checks use the module name itself.
pub mod checks {
    pub const INTERPRETER: &str = "interpreter";
    pub const CREDENTIALS: &str = "credentials_file";
    pub const WORKSPACE: &str = "workspace_dir";
    pub const GUI_PORT: &str = "gui_port";
}

/// Verdict for a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// Already in the required state.
    Pass,
    /// Was missing and got repaired on this run.
    Fixed,
    /// Usable, but worth the operator's attention.
    Warn,
    /// Not in the required state and not repaired.
    Fail,
}

impl CheckStatus {
    pub fn is_failure(self) -> bool {
        matches!(self, CheckStatus::Fail)
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            CheckStatus::Pass => "ok",
            CheckStatus::Fixed => "fixed",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
        };
        f.write_str(word)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub status: CheckStatus,
    pub detail: String,
}

/// Ordered record of one bootstrap or doctor pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BootstrapReport {
    pub checks: Vec<CheckOutcome>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl BootstrapReport {
    pub fn record(&mut self, name: &'static str, status: CheckStatus, detail: impl Into<String>) {
        self.checks.push(CheckOutcome {
            name,
            status,
            detail: detail.into(),
        });
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|check| !check.status.is_failure())
    }

    pub fn failed_checks(&self) -> Vec<&'static str> {
        self.checks
            .iter()
            .filter(|check| check.status.is_failure())
            .map(|check| check.name)
            .collect()
    }
}
