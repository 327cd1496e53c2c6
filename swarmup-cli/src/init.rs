//! `swarmup init`: provision the credentials file and workspace directory
//! without probing the interpreter or launching anything.

use swarmup_core::environment::SystemEnvironment;
use swarmup_core::sequence::run_provision;

use crate::CliError;
use crate::cli::InitArgs;

pub fn run(args: &InitArgs, json_mode: bool) -> Result<serde_json::Value, CliError> {
    let environment = SystemEnvironment;
    let summary = run_provision(&environment, &args.env_file, &args.workspace_dir)?;

    if !json_mode {
        for path in &summary.created {
            println!("created: {path}");
        }
        for path in &summary.existing {
            println!("exists: {path}");
        }
        for warning in &summary.warnings {
            eprintln!("warning: {warning}");
        }
        return Ok(serde_json::json!("init complete"));
    }

    Ok(serde_json::json!(summary))
}
