//! Interpreter version gate.
//!
//! The GUI stack uses structural pattern matching and modern typing syntax,
//! so anything older than the minimum is rejected before dependencies are
//! even probed.

use std::fmt;

use serde::Serialize;

/// Oldest interpreter the GUI stack runs on.
pub const MIN_PYTHON: PythonVersion = PythonVersion::new(3, 10, 0);

/// Interpreter binary probed on PATH when the caller does not override it.
pub const DEFAULT_PYTHON: &str = "python3";

/// A parsed `python --version` banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl PythonVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn satisfies(&self, minimum: PythonVersion) -> bool {
        *self >= minimum
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Extract a version from interpreter output such as `Python 3.11.4`.
///
/// Old CPython releases printed the banner to stderr, so callers feed
/// whichever stream carried text. A missing patch component parses as zero;
/// release suffixes like `3.13.0rc1` are not accepted beyond the first two
/// components.
pub fn parse_version_output(output: &str) -> Option<PythonVersion> {
    let rest = output.trim().strip_prefix("Python")?.trim_start();
    let token = rest.split_whitespace().next()?;
    let mut parts = token.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = parts
        .next()
        .and_then(|part| part.trim_end_matches('+').parse().ok())
        .unwrap_or(0);
    Some(PythonVersion::new(major, minor, patch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_banner() {
        assert_eq!(
            parse_version_output("Python 3.11.4\n"),
            Some(PythonVersion::new(3, 11, 4))
        );
    }

    #[test]
    fn parses_two_component_banner() {
        assert_eq!(
            parse_version_output("Python 3.10"),
            Some(PythonVersion::new(3, 10, 0))
        );
    }

    #[test]
    fn parses_free_threaded_suffix() {
        assert_eq!(
            parse_version_output("Python 3.13.0+"),
            Some(PythonVersion::new(3, 13, 0))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_version_output("Pyston 2.3"), None);
        assert_eq!(parse_version_output(""), None);
        assert_eq!(parse_version_output("Python x.y"), None);
    }

    #[test]
    fn minimum_is_inclusive() {
        assert!(PythonVersion::new(3, 10, 0).satisfies(MIN_PYTHON));
        assert!(PythonVersion::new(3, 12, 1).satisfies(MIN_PYTHON));
        assert!(PythonVersion::new(4, 0, 0).satisfies(MIN_PYTHON));
        assert!(!PythonVersion::new(3, 9, 18).satisfies(MIN_PYTHON));
        assert!(!PythonVersion::new(2, 7, 18).satisfies(MIN_PYTHON));
    }

    #[test]
    fn display_matches_banner_shape() {
        assert_eq!(PythonVersion::new(3, 10, 0).to_string(), "3.10.0");
    }
}
