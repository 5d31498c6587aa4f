use serde::Serialize;
use std::path::PathBuf;

use super::{Invocation, OrchestratorError, Step};
use crate::config::SeedFailurePolicy;

/// Everything one run will do, after config and CLI overrides are merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub root: PathBuf,
    /// `None` skips cleanup
    pub clean: Option<Vec<String>>,
    /// `None` skips seeding
    pub seed: Option<Invocation>,
    pub server: Invocation,
    pub on_seed_failure: SeedFailurePolicy,
}

/// Serializable view of a plan, used by `--dry-run --json`
#[derive(Debug, Serialize)]
pub struct PlanSummary {
    pub root: String,
    pub clean: Option<Vec<String>>,
    pub seed: Option<String>,
    pub server: String,
    pub on_seed_failure: String,
}

impl Plan {
    /// Check the invariants the orchestrator relies on
    pub fn check(&self) -> Result<(), OrchestratorError> {
        if let Some(seed) = &self.seed {
            if seed.step != Step::Seed || seed.program.trim().is_empty() {
                return Err(OrchestratorError::InvalidPlan(
                    "seed invocation needs a program".to_string(),
                ));
            }
        }

        if self.server.step != Step::Serve || self.server.program.trim().is_empty() {
            return Err(OrchestratorError::InvalidPlan(
                "server invocation needs a program".to_string(),
            ));
        }

        Ok(())
    }

    /// Human-readable listing of the steps, in execution order
    pub fn describe(&self) -> String {
        let mut lines = vec![format!("Project root: {}", self.root.display())];

        match &self.clean {
            Some(paths) if !paths.is_empty() => {
                lines.push(format!("1. clean: remove {}", paths.join(", ")))
            }
            Some(_) => lines.push("1. clean: nothing configured".to_string()),
            None => lines.push("1. clean: skipped".to_string()),
        }

        match &self.seed {
            Some(seed) => lines.push(format!(
                "2. seed:  {} (on failure: {})",
                seed.command_line(),
                self.on_seed_failure
            )),
            None => lines.push("2. seed:  skipped".to_string()),
        }

        lines.push(format!("3. serve: {}", self.server.command_line()));

        if !self.server.env.is_empty() {
            let keys: Vec<&str> = self.server.env.keys().map(String::as_str).collect();
            lines.push(format!("   env:   {}", keys.join(", ")));
        }

        lines.join("\n")
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            root: self.root.display().to_string(),
            clean: self.clean.clone(),
            seed: self.seed.as_ref().map(Invocation::command_line),
            server: self.server.command_line(),
            on_seed_failure: self.on_seed_failure.to_string(),
        }
    }
}
