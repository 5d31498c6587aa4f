//! The development-environment pipeline: clean caches, seed, serve.
//!
//! Steps always run in [`Step`] order. Cleanup is best-effort; seeding follows
//! the configured [`SeedFailurePolicy`](crate::config::SeedFailurePolicy);
//! the server step blocks until the server exits.

pub mod cleanup;
pub mod error;
pub mod pipeline;
pub mod plan;
pub mod runner;

pub use cleanup::{clean_paths, resolve_targets, CleanOutcome};
pub use error::OrchestratorError;
pub use pipeline::{Orchestrator, RunReport};
pub use plan::Plan;
pub use runner::{Invocation, ProcessRunner, StepOutcome, SystemRunner};

use std::fmt;

/// A pipeline step. Declaration order is execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    Clean,
    Seed,
    Serve,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Clean => crate::logging::steps::CLEAN,
            Step::Seed => crate::logging::steps::SEED,
            Step::Serve => crate::logging::steps::SERVE,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
