//! `swarmup`: check the host, repair what it can, and launch the Swarms GUI.

mod cli;
mod doctor;
mod init;
mod launch;
mod output;
mod status;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use swarmup_core::BootstrapError;
use swarmup_core::report::BootstrapReport;

use crate::cli::{Cli, Command, LaunchArgs};

/// Top-level failures, each with its own exit code so scripts can branch on
/// what went wrong.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    /// The host cannot run the GUI: interpreter or dependency trouble.
    #[error("{0}")]
    Environment(String),
    /// An audit finished and found failing checks. The report rides along
    /// so JSON consumers still get the per-check detail.
    #[error("{message}")]
    ChecksFailed {
        message: String,
        report: BootstrapReport,
    },
    /// Credentials file or workspace directory could not be provisioned.
    #[error("{0}")]
    Provision(String),
    /// The pre-flight passed but the GUI process could not be started.
    #[error("{0}")]
    Handoff(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => 2,
            CliError::Environment(_) | CliError::ChecksFailed { .. } => 3,
            CliError::Provision(_) => 4,
            CliError::Handoff(_) => 5,
        }
    }
}

impl From<BootstrapError> for CliError {
    fn from(err: BootstrapError) -> Self {
        let message = err.to_string();
        match err {
            BootstrapError::InterpreterMissing { .. }
            | BootstrapError::InterpreterTooOld { .. }
            | BootstrapError::InterpreterUnrecognized { .. }
            | BootstrapError::DependencyUnavailable { .. }
            | BootstrapError::Probe(_) => CliError::Environment(message),
            BootstrapError::CredentialsWrite { .. }
            | BootstrapError::WorkspaceCreate { .. }
            | BootstrapError::WorkspaceNotDirectory { .. } => CliError::Provision(message),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_mode = cli.json;
    let command = cli
        .command
        .unwrap_or_else(|| Command::Launch(LaunchArgs::default()));

    let outcome = match command {
        Command::Launch(args) => launch::run(&args, json_mode).await.map(|()| None),
        Command::Doctor(args) => doctor::run(&args, json_mode).await.map(Some),
        Command::Init(args) => init::run(&args, json_mode).map(Some),
        Command::Status(args) => status::run(&args).await.map(Some),
    };

    match outcome {
        Ok(Some(payload)) => output::print_success(json_mode, &payload),
        // A successful launch never comes back; it exits with the GUI's
        // status inside launch::run.
        Ok(None) => {}
        Err(err) => {
            output::print_error(json_mode, &err);
            std::process::exit(err.exit_code());
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
