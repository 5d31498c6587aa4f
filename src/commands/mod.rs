pub mod clean;
pub mod config;
pub mod doctor;
pub mod init;
pub mod seed;
pub mod serve;
pub mod up;

use anyhow::Result;

use crate::cli::ConfigPathArgs;
use crate::config_discovery::{load_from_current_dir, LoadedConfig};
use crate::orchestrator::SystemRunner;
use crate::{merger, orchestrator};

/// Load config and build a system-backed orchestrator
fn orchestrator_for(
    config: &ConfigPathArgs,
    overrides: &merger::PlanOverrides,
) -> Result<orchestrator::Orchestrator<SystemRunner>> {
    let loaded: LoadedConfig = load_from_current_dir(config.config.as_deref())?;
    let plan = merger::build_plan(&loaded, overrides)?;
    Ok(orchestrator::Orchestrator::new(plan, SystemRunner::new())?)
}
