//! The bootstrap sequence itself.
//!
//! Checks run in a fixed order and the first unrecoverable failure stops the
//! run; later steps are never attempted once an earlier one has failed. The
//! provisioning steps repair by creating what is missing and the dependency
//! steps repair through [`deps::reconcile`]. The interpreter gate repairs
//! nothing: an unsuitable interpreter is always fatal.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::deps::{self, InstallPolicy, Reconciliation};
use crate::environment::{Environment, InterpreterProbe};
use crate::error::BootstrapError;
use crate::interpreter::{MIN_PYTHON, PythonVersion};
use crate::launch::LaunchPlan;
use crate::provision::{self, Provisioned, ProvisionSummary};
use crate::report::{BootstrapReport, CheckStatus, checks};

/// Inputs for one bootstrap run. Paths are used as given; nothing is
/// discovered or searched for.
#[derive(Debug, Clone)]
pub struct SequenceOptions {
    pub python: String,
    pub entry: PathBuf,
    pub env_file: PathBuf,
    pub workspace_dir: PathBuf,
    pub install: InstallPolicy,
    pub host: String,
    pub port: u16,
}

/// A completed pre-flight: what was checked and the handoff to perform.
#[derive(Debug, Clone)]
pub struct Preflight {
    pub report: BootstrapReport,
    pub plan: LaunchPlan,
}

/// Run every check in order, repairing where allowed, and produce the launch
/// plan. The first failure aborts with an error whose message names the
/// remediation.
pub async fn run_sequence(
    environment: &dyn Environment,
    options: &SequenceOptions,
) -> Result<Preflight, BootstrapError> {
    let mut report = BootstrapReport::default();

    let version = gate_interpreter(environment, &options.python).await?;
    report.record(
        checks::INTERPRETER,
        CheckStatus::Pass,
        format!("Python {version}"),
    );

    for dependency in [deps::GUI_LIBRARY, deps::AGENT_FRAMEWORK] {
        match deps::reconcile(environment, &options.python, &dependency, &options.install).await? {
            Reconciliation::Satisfied => {
                report.record(dependency.module, CheckStatus::Pass, "importable");
            }
            Reconciliation::Remediated { via } => {
                report.record(
                    dependency.module,
                    CheckStatus::Fixed,
                    format!("installed from {via}"),
                );
            }
            Reconciliation::Unavailable { detail } => {
                return Err(BootstrapError::DependencyUnavailable {
                    module: dependency.module.to_string(),
                    detail,
                });
            }
        }
    }

    match provision::ensure_credentials_file(environment, &options.env_file, &options.workspace_dir)?
    {
        Provisioned::Created => {
            report.record(
                checks::CREDENTIALS,
                CheckStatus::Fixed,
                format!("created '{}' from the template", options.env_file.display()),
            );
            report.warn(format!(
                "'{}' holds placeholder API keys; fill in real values or the GUI cannot reach a model provider",
                options.env_file.display()
            ));
        }
        Provisioned::Existing => {
            report.record(
                checks::CREDENTIALS,
                CheckStatus::Pass,
                format!("'{}' present, left untouched", options.env_file.display()),
            );
        }
    }

    match provision::ensure_workspace_dir(environment, &options.workspace_dir)? {
        Provisioned::Created => {
            report.record(
                checks::WORKSPACE,
                CheckStatus::Fixed,
                format!("created '{}'", options.workspace_dir.display()),
            );
        }
        Provisioned::Existing => {
            report.record(
                checks::WORKSPACE,
                CheckStatus::Pass,
                format!("'{}' present", options.workspace_dir.display()),
            );
        }
    }

    info!(python = %options.python, entry = %options.entry.display(), "pre-flight complete");

    Ok(Preflight {
        report,
        plan: LaunchPlan {
            python: options.python.clone(),
            entry: options.entry.clone(),
            host: options.host.clone(),
            port: options.port,
        },
    })
}

async fn gate_interpreter(
    environment: &dyn Environment,
    python: &str,
) -> Result<PythonVersion, BootstrapError> {
    match environment.interpreter_version(python).await {
        InterpreterProbe::Version(version) if version.satisfies(MIN_PYTHON) => {
            debug!(%version, "interpreter accepted");
            Ok(version)
        }
        InterpreterProbe::Version(found) => Err(BootstrapError::InterpreterTooOld {
            python: python.to_string(),
            found,
            minimum: MIN_PYTHON,
        }),
        InterpreterProbe::Missing { detail } => Err(BootstrapError::InterpreterMissing {
            python: python.to_string(),
            detail,
            minimum: MIN_PYTHON,
        }),
        InterpreterProbe::Unrecognized { output } => Err(BootstrapError::InterpreterUnrecognized {
            python: python.to_string(),
            output,
        }),
    }
}

/// Audit the host without changing it: no installs, no writes. Problems
/// become failed or warned checks in the report instead of errors.
pub async fn run_doctor(
    environment: &dyn Environment,
    options: &SequenceOptions,
) -> BootstrapReport {
    let mut report = BootstrapReport::default();

    let interpreter_ok = match environment.interpreter_version(&options.python).await {
        InterpreterProbe::Version(version) if version.satisfies(MIN_PYTHON) => {
            report.record(
                checks::INTERPRETER,
                CheckStatus::Pass,
                format!("Python {version}"),
            );
            true
        }
        InterpreterProbe::Version(found) => {
            report.record(
                checks::INTERPRETER,
                CheckStatus::Fail,
                format!("Python {found} found, {MIN_PYTHON} or newer required"),
            );
            false
        }
        InterpreterProbe::Missing { detail } => {
            report.record(
                checks::INTERPRETER,
                CheckStatus::Fail,
                format!("'{}' not found ({detail})", options.python),
            );
            false
        }
        InterpreterProbe::Unrecognized { output } => {
            report.record(
                checks::INTERPRETER,
                CheckStatus::Fail,
                format!("unrecognized version banner: '{output}'"),
            );
            false
        }
    };

    for dependency in [deps::GUI_LIBRARY, deps::AGENT_FRAMEWORK] {
        if !interpreter_ok {
            report.record(
                dependency.module,
                CheckStatus::Warn,
                "not checked, interpreter unavailable",
            );
            continue;
        }
        match environment
            .module_importable(&options.python, dependency.module)
            .await
        {
            Ok(true) => report.record(dependency.module, CheckStatus::Pass, "importable"),
            Ok(false) => {
                let fix = if environment.path_exists(&options.install.manifest) {
                    format!(
                        "`swarmup launch` would install from '{}'",
                        options.install.manifest.display()
                    )
                } else {
                    format!("`swarmup launch` would install '{}'", dependency.requirement)
                };
                report.record(
                    dependency.module,
                    CheckStatus::Fail,
                    format!("not importable; {fix}"),
                );
            }
            Err(err) => {
                report.record(dependency.module, CheckStatus::Fail, format!("probe failed: {err}"));
            }
        }
    }

    audit_credentials(environment, options, &mut report);

    if environment.is_dir(&options.workspace_dir) {
        report.record(
            checks::WORKSPACE,
            CheckStatus::Pass,
            format!("'{}' present", options.workspace_dir.display()),
        );
    } else if environment.path_exists(&options.workspace_dir) {
        report.record(
            checks::WORKSPACE,
            CheckStatus::Fail,
            format!(
                "'{}' exists but is not a directory",
                options.workspace_dir.display()
            ),
        );
    } else {
        report.record(
            checks::WORKSPACE,
            CheckStatus::Warn,
            format!(
                "'{}' missing; `swarmup launch` or `swarmup init` creates it",
                options.workspace_dir.display()
            ),
        );
    }

    report
}

fn audit_credentials(
    environment: &dyn Environment,
    options: &SequenceOptions,
    report: &mut BootstrapReport,
) {
    if !environment.path_exists(&options.env_file) {
        report.record(
            checks::CREDENTIALS,
            CheckStatus::Warn,
            format!(
                "'{}' missing; `swarmup launch` or `swarmup init` creates it",
                options.env_file.display()
            ),
        );
        return;
    }
    let contents = match environment.read_to_string(&options.env_file) {
        Ok(contents) => contents,
        Err(err) => {
            report.record(
                checks::CREDENTIALS,
                CheckStatus::Fail,
                format!("'{}' unreadable: {err}", options.env_file.display()),
            );
            return;
        }
    };

    let unfilled = provision::unfilled_api_keys(&contents);
    if unfilled.is_empty() {
        report.record(
            checks::CREDENTIALS,
            CheckStatus::Pass,
            format!("'{}' present, API keys filled in", options.env_file.display()),
        );
    } else {
        report.record(
            checks::CREDENTIALS,
            CheckStatus::Warn,
            format!(
                "'{}' still has placeholder values for {}",
                options.env_file.display(),
                unfilled.join(", ")
            ),
        );
    }

    if let Some(configured) = provision::workspace_entry(&contents)
        && Path::new(&configured) != options.workspace_dir.as_path()
    {
        report.warn(format!(
            "{} in '{}' is '{configured}' but the launcher ensures '{}'; pass --workspace-dir to match",
            provision::WORKSPACE_KEY,
            options.env_file.display(),
            options.workspace_dir.display()
        ));
    }
}

/// Create the credentials file and workspace directory without probing the
/// interpreter or touching pip.
pub fn run_provision(
    environment: &dyn Environment,
    env_file: &Path,
    workspace_dir: &Path,
) -> Result<ProvisionSummary, BootstrapError> {
    let mut summary = ProvisionSummary::default();

    match provision::ensure_credentials_file(environment, env_file, workspace_dir)? {
        Provisioned::Created => {
            summary.created.push(env_file.display().to_string());
            summary.warnings.push(format!(
                "'{}' holds placeholder API keys; fill in real values before launching",
                env_file.display()
            ));
        }
        Provisioned::Existing => summary.existing.push(env_file.display().to_string()),
    }

    match provision::ensure_workspace_dir(environment, workspace_dir)? {
        Provisioned::Created => summary.created.push(workspace_dir.display().to_string()),
        Provisioned::Existing => summary.existing.push(workspace_dir.display().to_string()),
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps::DEFAULT_INSTALL_TIMEOUT;
    use crate::interpreter::MIN_PYTHON;
    use crate::provision::credentials_template;
    use crate::testing::{FakeEnvironment, InstallBehavior, Invocation};

    fn options() -> SequenceOptions {
        SequenceOptions {
            python: "python3".to_string(),
            entry: PathBuf::from("swarms_gui.py"),
            env_file: PathBuf::from(".env"),
            workspace_dir: PathBuf::from("agent_workspace"),
            install: InstallPolicy {
                allowed: true,
                manifest: PathBuf::from("requirements.txt"),
                timeout: DEFAULT_INSTALL_TIMEOUT,
            },
            host: "127.0.0.1".to_string(),
            port: 7860,
        }
    }

    fn ready_environment() -> FakeEnvironment {
        let environment = FakeEnvironment::with_python(MIN_PYTHON);
        environment.mark_importable("gradio");
        environment.mark_importable("swarms");
        environment
    }

    #[tokio::test]
    async fn fresh_host_is_provisioned_and_planned() {
        let environment = ready_environment();
        let preflight = run_sequence(&environment, &options()).await.expect("sequence");

        let statuses: Vec<_> = preflight
            .report
            .checks
            .iter()
            .map(|check| (check.name, check.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                (checks::INTERPRETER, CheckStatus::Pass),
                ("gradio", CheckStatus::Pass),
                ("swarms", CheckStatus::Pass),
                (checks::CREDENTIALS, CheckStatus::Fixed),
                (checks::WORKSPACE, CheckStatus::Fixed),
            ]
        );

        assert_eq!(
            environment.file_contents(Path::new(".env")).expect("written"),
            credentials_template(Path::new("agent_workspace"))
        );
        assert!(environment.dir_exists(Path::new("agent_workspace")));
        assert_eq!(preflight.plan.python, "python3");
        assert_eq!(preflight.plan.entry, PathBuf::from("swarms_gui.py"));
        assert_eq!(preflight.plan.url(), "http://127.0.0.1:7860");
        // Creating the template must warn about the placeholder keys.
        assert_eq!(preflight.report.warnings.len(), 1);
    }

    #[tokio::test]
    async fn second_run_reports_pass_everywhere() {
        let environment = ready_environment();
        run_sequence(&environment, &options()).await.expect("first run");
        let preflight = run_sequence(&environment, &options()).await.expect("second run");

        assert!(preflight
            .report
            .checks
            .iter()
            .all(|check| check.status == CheckStatus::Pass));
        assert!(preflight.report.warnings.is_empty());
    }

    #[tokio::test]
    async fn old_interpreter_stops_before_any_other_step() {
        let environment = FakeEnvironment::with_python(PythonVersion::new(3, 9, 18));

        let err = run_sequence(&environment, &options())
            .await
            .expect_err("must refuse");
        assert!(matches!(err, BootstrapError::InterpreterTooOld { .. }));

        // Nothing beyond the version probe may have run.
        assert_eq!(environment.invocations(), vec![Invocation::VersionProbe]);
        assert!(environment.file_contents(Path::new(".env")).is_none());
        assert!(!environment.dir_exists(Path::new("agent_workspace")));
    }

    #[tokio::test]
    async fn minimum_interpreter_is_accepted() {
        let environment = ready_environment();
        assert!(run_sequence(&environment, &options()).await.is_ok());
    }

    #[tokio::test]
    async fn missing_interpreter_is_its_own_error() {
        let environment = FakeEnvironment::missing_python("command not found");
        let err = run_sequence(&environment, &options())
            .await
            .expect_err("must refuse");
        assert!(matches!(err, BootstrapError::InterpreterMissing { .. }));
    }

    #[tokio::test]
    async fn unparseable_interpreter_banner_is_fatal() {
        let environment = FakeEnvironment::unrecognized_python("PyPy 7.3.12");
        let err = run_sequence(&environment, &options())
            .await
            .expect_err("must refuse");
        assert!(matches!(err, BootstrapError::InterpreterUnrecognized { .. }));
    }

    #[tokio::test]
    async fn unavailable_dependency_stops_the_sequence() {
        let environment = FakeEnvironment::with_python(MIN_PYTHON)
            .install_behavior(InstallBehavior::Fails("no network".to_string()));

        let err = run_sequence(&environment, &options())
            .await
            .expect_err("must refuse");
        match err {
            BootstrapError::DependencyUnavailable { module, detail } => {
                assert_eq!(module, "gradio");
                assert!(detail.contains("no network"), "detail: {detail}");
            }
            other => panic!("expected DependencyUnavailable, got {other:?}"),
        }

        // The failure happened before provisioning.
        assert!(environment.file_contents(Path::new(".env")).is_none());
        assert!(!environment.dir_exists(Path::new("agent_workspace")));
    }

    #[tokio::test]
    async fn remediated_dependency_is_reported_as_fixed() {
        let environment = FakeEnvironment::with_python(MIN_PYTHON).install_behavior(
            InstallBehavior::Provides(vec!["gradio".to_string(), "swarms".to_string()]),
        );

        let preflight = run_sequence(&environment, &options()).await.expect("sequence");
        let gradio = preflight
            .report
            .checks
            .iter()
            .find(|check| check.name == "gradio")
            .expect("gradio check");
        assert_eq!(gradio.status, CheckStatus::Fixed);

        // The first install provides both modules, so the second dependency
        // reconciles as already satisfied.
        assert_eq!(environment.install_count(), 1);
    }

    #[tokio::test]
    async fn doctor_reads_but_never_writes_or_installs() {
        let environment = FakeEnvironment::with_python(MIN_PYTHON);

        let report = run_doctor(&environment, &options()).await;

        assert!(!report.all_passed());
        assert!(environment.file_contents(Path::new(".env")).is_none());
        assert!(!environment.dir_exists(Path::new("agent_workspace")));
        assert_eq!(environment.install_count(), 0);
    }

    #[tokio::test]
    async fn doctor_on_a_ready_host_passes() {
        let environment = ready_environment();
        environment.add_file(".env", "OPENAI_API_KEY=sk-real\nANTHROPIC_API_KEY=k\nGROQ_API_KEY=g\n");
        environment.add_dir("agent_workspace");

        let report = run_doctor(&environment, &options()).await;
        assert!(report.all_passed());
        assert!(report.warnings.is_empty());
    }

    #[tokio::test]
    async fn doctor_flags_placeholder_keys_and_workspace_disagreement() {
        let environment = ready_environment();
        let mut contents = credentials_template(Path::new("elsewhere"));
        contents.push_str("EXTRA=1\n");
        environment.add_file(".env", &contents);
        environment.add_dir("agent_workspace");

        let report = run_doctor(&environment, &options()).await;

        let credentials = report
            .checks
            .iter()
            .find(|check| check.name == checks::CREDENTIALS)
            .expect("credentials check");
        assert_eq!(credentials.status, CheckStatus::Warn);
        assert!(credentials.detail.contains("OPENAI_API_KEY"));
        assert!(report.warnings.iter().any(|warning| warning.contains("elsewhere")));
        // Warnings do not fail the audit.
        assert!(report.all_passed());
    }

    #[tokio::test]
    async fn doctor_with_missing_interpreter_skips_dependency_probes() {
        let environment = FakeEnvironment::missing_python("not found");

        let report = run_doctor(&environment, &options()).await;

        assert_eq!(report.failed_checks(), vec![checks::INTERPRETER]);
        let gradio = report
            .checks
            .iter()
            .find(|check| check.name == "gradio")
            .expect("gradio check");
        assert_eq!(gradio.status, CheckStatus::Warn);
        assert_eq!(
            environment.invocations(),
            vec![Invocation::VersionProbe]
        );
    }

    #[test]
    fn provision_is_idempotent_and_accounted() {
        let environment = FakeEnvironment::with_python(MIN_PYTHON);
        let env_file = PathBuf::from(".env");
        let workspace = PathBuf::from("agent_workspace");

        let first = run_provision(&environment, &env_file, &workspace).expect("first");
        assert_eq!(first.created, vec![".env", "agent_workspace"]);
        assert!(first.existing.is_empty());
        assert_eq!(first.warnings.len(), 1);

        let second = run_provision(&environment, &env_file, &workspace).expect("second");
        assert!(second.created.is_empty());
        assert_eq!(second.existing, vec![".env", "agent_workspace"]);
        assert!(second.warnings.is_empty());
    }
}
