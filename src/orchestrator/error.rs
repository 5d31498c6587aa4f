use thiserror::Error;

use super::Step;

/// Errors that stop a pipeline run
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Failed to start {step} program: {program}")]
    Spawn {
        step: Step,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Seed program exited with code {code}, not starting the server")]
    SeedFailed { code: i32 },

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),
}

impl OrchestratorError {
    /// Exit code devstart should terminate with for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            OrchestratorError::SeedFailed { code } if *code != 0 => *code,
            _ => 1,
        }
    }
}
