//! Human and JSON output.
//!
//! Every run ends in exactly one envelope: `{"ok":true,"result":...}` on
//! stdout or `{"ok":false,"error":{...}}` on stderr when `--json` is given.
//! Human mode prints check lines as they complete and keeps warnings on
//! stderr so stdout stays pipeable.

use swarmup_core::report::BootstrapReport;

use crate::CliError;

pub fn print_success(json_mode: bool, result: &serde_json::Value) {
    if json_mode {
        let envelope = serde_json::json!({ "ok": true, "result": result });
        println!("{envelope}");
    } else if let serde_json::Value::String(text) = result {
        println!("{text}");
    } else {
        let pretty =
            serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string());
        println!("{pretty}");
    }
}

pub fn print_error(json_mode: bool, error: &CliError) {
    if json_mode {
        eprintln!("{}", error_envelope(error));
    } else {
        eprintln!("error: {error}");
    }
}

/// A failed audit keeps its per-check report inside the error envelope;
/// every other failure is message and code alone.
fn error_envelope(error: &CliError) -> serde_json::Value {
    let code = error.exit_code();
    match error {
        CliError::ChecksFailed { report, .. } => serde_json::json!({
            "ok": false,
            "error": { "message": error.to_string(), "code": code, "report": report },
        }),
        _ => serde_json::json!({
            "ok": false,
            "error": { "message": error.to_string(), "code": code },
        }),
    }
}

/// Render the per-check lines of a pre-flight or audit. JSON consumers get
/// the report inside the envelope instead.
pub fn print_report(json_mode: bool, report: &BootstrapReport) {
    if json_mode {
        return;
    }
    for check in &report.checks {
        if check.detail.is_empty() {
            println!("{}: {}", check.name, check.status);
        } else {
            println!("{}: {} ({})", check.name, check.status, check.detail);
        }
    }
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
}
