//! `swarmup launch`: run the pre-flight, then become the GUI's parent until
//! it exits, mirroring its exit status.

use std::process::ExitStatus;

use tracing::info;

use swarmup_core::deps::InstallPolicy;
use swarmup_core::environment::{Environment, SystemEnvironment};
use swarmup_core::launch::LaunchPlan;
use swarmup_core::sequence::{SequenceOptions, run_sequence};

use crate::CliError;
use crate::cli::LaunchArgs;
use crate::output;

pub fn sequence_options(args: &LaunchArgs) -> SequenceOptions {
    SequenceOptions {
        python: args.python.clone(),
        entry: args.app.clone(),
        env_file: args.env_file.clone(),
        workspace_dir: args.workspace_dir.clone(),
        install: InstallPolicy {
            allowed: !args.no_install,
            manifest: args.requirements.clone(),
            timeout: args.install_timeout,
        },
        host: args.host.clone(),
        port: args.port,
    }
}

pub async fn run(args: &LaunchArgs, json_mode: bool) -> Result<(), CliError> {
    let environment = SystemEnvironment;
    let options = sequence_options(args);

    let preflight = run_sequence(&environment, &options).await?;

    // Spawning validates the interpreter, not the script; an absent entry
    // would otherwise surface only as the child's own exit code.
    if !environment.path_exists(&options.entry) {
        return Err(CliError::Handoff(format!(
            "entry script '{}' not found; run swarmup from the Swarms GUI checkout or pass --app",
            options.entry.display()
        )));
    }

    output::print_report(json_mode, &preflight.report);

    if json_mode {
        // The envelope goes out before the handoff; whatever the GUI prints
        // afterwards belongs to the GUI.
        let payload = serde_json::json!({
            "report": &preflight.report,
            "handoff": {
                "python": &preflight.plan.python,
                "entry": preflight.plan.entry.display().to_string(),
                "url": preflight.plan.url(),
            },
        });
        output::print_success(true, &payload);
    } else {
        println!(
            "launching Swarms GUI at {} (Ctrl+C stops it)",
            preflight.plan.url()
        );
    }

    let status = hand_off(&preflight.plan)?;
    info!(?status, "GUI exited");
    std::process::exit(exit_code_from(status));
}

fn hand_off(plan: &LaunchPlan) -> Result<ExitStatus, CliError> {
    plan.command().status().map_err(|err| {
        CliError::Handoff(format!(
            "failed to launch '{} {}': {err}",
            plan.python,
            plan.entry.display()
        ))
    })
}

/// Mirror the child's exit status, using the shell convention of 128 plus
/// the signal number when the child died to one.
fn exit_code_from(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn options_carry_the_flags_through() {
        let args = LaunchArgs {
            python: "python3.12".to_string(),
            app: PathBuf::from("gui.py"),
            env_file: PathBuf::from("conf/.env"),
            workspace_dir: PathBuf::from("ws"),
            requirements: PathBuf::from("reqs.txt"),
            host: "0.0.0.0".to_string(),
            port: 8080,
            no_install: true,
            install_timeout: Duration::from_secs(90),
        };
        let options = sequence_options(&args);
        assert_eq!(options.python, "python3.12");
        assert_eq!(options.entry, PathBuf::from("gui.py"));
        assert_eq!(options.env_file, PathBuf::from("conf/.env"));
        assert_eq!(options.workspace_dir, PathBuf::from("ws"));
        assert!(!options.install.allowed);
        assert_eq!(options.install.manifest, PathBuf::from("reqs.txt"));
        assert_eq!(options.install.timeout, Duration::from_secs(90));
        assert_eq!(options.port, 8080);
    }

    #[cfg(unix)]
    #[test]
    fn signal_death_maps_to_shell_convention() {
        use std::os::unix::process::ExitStatusExt;
        assert_eq!(exit_code_from(ExitStatus::from_raw(0)), 0);
        // Raw wait status 15: killed by SIGTERM.
        assert_eq!(exit_code_from(ExitStatus::from_raw(15)), 128 + 15);
        // Raw wait status 0x100: normal exit with code 1.
        assert_eq!(exit_code_from(ExitStatus::from_raw(0x100)), 1);
    }
}
