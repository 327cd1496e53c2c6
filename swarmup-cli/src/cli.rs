use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use swarmup_core::deps::DEFAULT_INSTALL_TIMEOUT;
use swarmup_core::interpreter::DEFAULT_PYTHON;
use swarmup_core::launch::{DEFAULT_ENTRY, DEFAULT_HOST, DEFAULT_PORT};
use swarmup_core::provision::{DEFAULT_ENV_FILE, DEFAULT_REQUIREMENTS, DEFAULT_WORKSPACE_DIR};

#[derive(Debug, Parser)]
#[command(
    name = "swarmup",
    version,
    about = "Check the host, repair what it can, and launch the Swarms GUI"
)]
pub struct Cli {
    /// Emit stable JSON envelopes instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug-level diagnostics on stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Defaults to `launch` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full pre-flight, then hand off to the GUI in the foreground.
    Launch(LaunchArgs),
    /// Audit the host without repairing anything.
    Doctor(DoctorArgs),
    /// Create the credentials file and workspace directory, nothing else.
    Init(InitArgs),
    /// Ask whether something is already serving on the GUI address.
    Status(StatusArgs),
}

#[derive(Debug, Args, Clone)]
pub struct LaunchArgs {
    /// Interpreter used for probes, installs, and the GUI itself.
    #[arg(long, default_value = DEFAULT_PYTHON)]
    pub python: String,

    /// Entry-point script handed to the interpreter.
    #[arg(long, default_value = DEFAULT_ENTRY)]
    pub app: PathBuf,

    /// Credentials file created from the template when absent.
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    /// Workspace directory ensured before the handoff.
    #[arg(long, default_value = DEFAULT_WORKSPACE_DIR)]
    pub workspace_dir: PathBuf,

    /// Requirements manifest preferred over single-package installs.
    #[arg(long, default_value = DEFAULT_REQUIREMENTS)]
    pub requirements: PathBuf,

    /// Interface the GUI binds; 0.0.0.0 exposes it beyond this machine.
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port the GUI binds.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Report missing dependencies instead of installing them.
    #[arg(long)]
    pub no_install: bool,

    /// Upper bound for one pip run, e.g. `300s` or `10m`.
    #[arg(long, default_value = "5m", value_parser = parse_duration)]
    pub install_timeout: Duration,
}

impl Default for LaunchArgs {
    fn default() -> Self {
        Self {
            python: DEFAULT_PYTHON.to_string(),
            app: PathBuf::from(DEFAULT_ENTRY),
            env_file: PathBuf::from(DEFAULT_ENV_FILE),
            workspace_dir: PathBuf::from(DEFAULT_WORKSPACE_DIR),
            requirements: PathBuf::from(DEFAULT_REQUIREMENTS),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            no_install: false,
            install_timeout: DEFAULT_INSTALL_TIMEOUT,
        }
    }
}

#[derive(Debug, Args)]
pub struct DoctorArgs {
    /// Interpreter to probe.
    #[arg(long, default_value = DEFAULT_PYTHON)]
    pub python: String,

    /// Credentials file to inspect.
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    /// Workspace directory to look for.
    #[arg(long, default_value = DEFAULT_WORKSPACE_DIR)]
    pub workspace_dir: PathBuf,

    /// Requirements manifest named in remediation hints.
    #[arg(long, default_value = DEFAULT_REQUIREMENTS)]
    pub requirements: PathBuf,

    /// Interface checked for availability.
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port checked for availability.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Credentials file created from the template when absent.
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    /// Workspace directory to create.
    #[arg(long, default_value = DEFAULT_WORKSPACE_DIR)]
    pub workspace_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Host the GUI was launched on.
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port the GUI was launched on.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Probe timeout.
    #[arg(long, default_value = "5s", value_parser = parse_duration)]
    pub timeout: Duration,
}

fn parse_duration(input: &str) -> Result<Duration, String> {
    humantime::parse_duration(input).map_err(|err| err.to_string())
}
