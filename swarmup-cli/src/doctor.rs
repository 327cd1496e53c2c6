//! `swarmup doctor`: audit the host and change nothing.

use std::io;
use std::net::TcpListener;

use swarmup_core::deps::{DEFAULT_INSTALL_TIMEOUT, InstallPolicy};
use swarmup_core::environment::SystemEnvironment;
use swarmup_core::launch::DEFAULT_ENTRY;
use swarmup_core::report::{BootstrapReport, CheckStatus, checks};
use swarmup_core::sequence::{SequenceOptions, run_doctor};

use crate::CliError;
use crate::cli::DoctorArgs;
use crate::output;

pub async fn run(args: &DoctorArgs, json_mode: bool) -> Result<serde_json::Value, CliError> {
    let environment = SystemEnvironment;
    let options = SequenceOptions {
        python: args.python.clone(),
        entry: DEFAULT_ENTRY.into(),
        env_file: args.env_file.clone(),
        workspace_dir: args.workspace_dir.clone(),
        install: InstallPolicy {
            // The audit never installs; the manifest path only feeds the
            // remediation hints.
            allowed: false,
            manifest: args.requirements.clone(),
            timeout: DEFAULT_INSTALL_TIMEOUT,
        },
        host: args.host.clone(),
        port: args.port,
    };

    let mut report = run_doctor(&environment, &options).await;
    check_port(&args.host, args.port, &mut report);
    output::print_report(json_mode, &report);

    if !report.all_passed() {
        let message = format!(
            "environment checks failed: {}",
            report.failed_checks().join(", ")
        );
        return Err(CliError::ChecksFailed { message, report });
    }

    Ok(if json_mode {
        serde_json::json!({ "ready": true, "report": &report })
    } else {
        serde_json::json!("environment ready")
    })
}

/// Bind-and-release probe for the GUI address. A taken port is a warning
/// rather than a failure; the GUI may simply be running already.
fn check_port(host: &str, port: u16, report: &mut BootstrapReport) {
    match TcpListener::bind((host, port)) {
        Ok(listener) => {
            drop(listener);
            report.record(checks::GUI_PORT, CheckStatus::Pass, format!("{host}:{port} free"));
        }
        Err(err) if err.kind() == io::ErrorKind::AddrInUse => {
            report.record(
                checks::GUI_PORT,
                CheckStatus::Warn,
                format!(
                    "{host}:{port} already in use; the GUI may be running (`swarmup status`) or pick another --port"
                ),
            );
        }
        Err(err) => {
            report.record(
                checks::GUI_PORT,
                CheckStatus::Warn,
                format!("could not probe {host}:{port}: {err}"),
            );
        }
    }
}
