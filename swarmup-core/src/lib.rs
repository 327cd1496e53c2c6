//! Pre-flight bootstrap for the Swarms interactive GUI.
//!
//! The sequencer gates on the interpreter version and reconciles the Python
//! dependencies the GUI imports, then provisions the credentials file and
//! workspace directory. What comes back is a [`launch::LaunchPlan`]
//! describing the foreground process to run; the `swarmup` binary drives all
//! of it, and this crate deliberately performs no handoff itself.

pub mod deps;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod launch;
pub mod provision;
pub mod report;
pub mod sequence;

#[cfg(test)]
pub(crate) mod testing;

pub use error::BootstrapError;
