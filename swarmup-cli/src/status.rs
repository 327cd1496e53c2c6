//! `swarmup status`: ask whether anything is serving on the GUI address.
//!
//! Any HTTP response counts as serving; only a refused or timed-out
//! connection means nothing is there. The probe is informational, so both
//! answers exit zero.

use serde::Serialize;

use swarmup_core::launch::dial_url;

use crate::CliError;
use crate::cli::StatusArgs;

#[derive(Debug, Serialize)]
struct StatusResult {
    url: String,
    serving: bool,
    detail: String,
}

pub async fn run(args: &StatusArgs) -> Result<serde_json::Value, CliError> {
    let url = dial_url(&args.host, args.port);
    let client = reqwest::Client::builder()
        .timeout(args.timeout)
        .build()
        .map_err(|err| CliError::Usage(format!("could not build HTTP client: {err}")))?;

    let result = match client.get(&url).send().await {
        Ok(response) => StatusResult {
            url,
            serving: true,
            detail: format!("HTTP {}", response.status()),
        },
        Err(err) if err.is_connect() => StatusResult {
            url,
            serving: false,
            detail: "nothing is listening; run `swarmup` to launch the GUI".to_string(),
        },
        Err(err) if err.is_timeout() => StatusResult {
            url,
            serving: false,
            detail: format!("no response within {}", humantime::format_duration(args.timeout)),
        },
        Err(err) => StatusResult {
            url,
            serving: false,
            detail: err.to_string(),
        },
    };

    Ok(serde_json::json!(result))
}
