//! In-memory [`Environment`] for exercising the sequencer without a Python
//! toolchain on the test host.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::environment::{
    Environment, EnvironmentError, FileInit, InstallOutput, InstallSource, InterpreterProbe,
};
use crate::interpreter::PythonVersion;

/// One recorded subprocess-shaped call, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    VersionProbe,
    ImportProbe(String),
    Install(InstallSource),
}

/// Configured effect of a pip run.
#[derive(Debug, Clone)]
pub enum InstallBehavior {
    /// Pip exits zero and the listed modules become importable.
    Provides(Vec<String>),
    /// Pip exits zero but nothing becomes importable.
    Noop,
    /// Pip fails with this stderr.
    Fails(String),
}

pub struct FakeEnvironment {
    interpreter: InterpreterProbe,
    behavior: InstallBehavior,
    importable: Mutex<BTreeSet<String>>,
    files: Mutex<BTreeMap<PathBuf, String>>,
    dirs: Mutex<BTreeSet<PathBuf>>,
    invocations: Mutex<Vec<Invocation>>,
}

impl FakeEnvironment {
    pub fn with_python(version: PythonVersion) -> Self {
        Self::new(InterpreterProbe::Version(version))
    }

    pub fn missing_python(detail: &str) -> Self {
        Self::new(InterpreterProbe::Missing {
            detail: detail.to_string(),
        })
    }

    pub fn unrecognized_python(output: &str) -> Self {
        Self::new(InterpreterProbe::Unrecognized {
            output: output.to_string(),
        })
    }

    fn new(interpreter: InterpreterProbe) -> Self {
        Self {
            interpreter,
            behavior: InstallBehavior::Noop,
            importable: Mutex::new(BTreeSet::new()),
            files: Mutex::new(BTreeMap::new()),
            dirs: Mutex::new(BTreeSet::new()),
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn install_behavior(mut self, behavior: InstallBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn mark_importable(&self, module: &str) {
        self.importable
            .lock()
            .expect("lock poisoned")
            .insert(module.to_string());
    }

    pub fn add_file(&self, path: impl AsRef<Path>, contents: &str) {
        self.files
            .lock()
            .expect("lock poisoned")
            .insert(path.as_ref().to_path_buf(), contents.to_string());
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.dirs
            .lock()
            .expect("lock poisoned")
            .insert(path.as_ref().to_path_buf());
    }

    pub fn file_contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .lock()
            .expect("lock poisoned")
            .get(path.as_ref())
            .cloned()
    }

    pub fn dir_exists(&self, path: impl AsRef<Path>) -> bool {
        self.dirs
            .lock()
            .expect("lock poisoned")
            .contains(path.as_ref())
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().expect("lock poisoned").clone()
    }

    pub fn install_count(&self) -> usize {
        self.invocations()
            .iter()
            .filter(|invocation| matches!(invocation, Invocation::Install(_)))
            .count()
    }

    fn record(&self, invocation: Invocation) {
        self.invocations
            .lock()
            .expect("lock poisoned")
            .push(invocation);
    }
}

#[async_trait]
impl Environment for FakeEnvironment {
    async fn interpreter_version(&self, _python: &str) -> InterpreterProbe {
        self.record(Invocation::VersionProbe);
        self.interpreter.clone()
    }

    async fn module_importable(
        &self,
        _python: &str,
        module: &str,
    ) -> Result<bool, EnvironmentError> {
        self.record(Invocation::ImportProbe(module.to_string()));
        Ok(self
            .importable
            .lock()
            .expect("lock poisoned")
            .contains(module))
    }

    async fn pip_install(
        &self,
        _python: &str,
        source: &InstallSource,
        _timeout: Duration,
    ) -> Result<InstallOutput, EnvironmentError> {
        self.record(Invocation::Install(source.clone()));
        match &self.behavior {
            InstallBehavior::Provides(modules) => {
                let mut importable = self.importable.lock().expect("lock poisoned");
                for module in modules {
                    importable.insert(module.clone());
                }
                Ok(InstallOutput {
                    success: true,
                    detail: String::new(),
                })
            }
            InstallBehavior::Noop => Ok(InstallOutput {
                success: true,
                detail: String::new(),
            }),
            InstallBehavior::Fails(stderr) => Ok(InstallOutput {
                success: false,
                detail: stderr.clone(),
            }),
        }
    }

    fn path_exists(&self, path: &Path) -> bool {
        self.files.lock().expect("lock poisoned").contains_key(path)
            || self.dirs.lock().expect("lock poisoned").contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.lock().expect("lock poisoned").contains(path)
    }

    fn create_new_file(&self, path: &Path, contents: &str) -> io::Result<FileInit> {
        let mut files = self.files.lock().expect("lock poisoned");
        if files.contains_key(path) {
            return Ok(FileInit::AlreadyExists);
        }
        files.insert(path.to_path_buf(), contents.to_string());
        Ok(FileInit::Created)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        if self.files.lock().expect("lock poisoned").contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "path exists and is not a directory",
            ));
        }
        self.dirs
            .lock()
            .expect("lock poisoned")
            .insert(path.to_path_buf());
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.file_contents(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }
}
