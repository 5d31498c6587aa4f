// Library interface for devstart
// The binary and the integration tests both build on these modules.

pub mod cli_utils;
pub mod config;
pub mod config_discovery;
pub mod logging;
pub mod merger;
pub mod orchestrator;
pub mod xdg;

pub use config::{DevstartConfig, SeedFailurePolicy};
pub use config_discovery::{discover_config, load_config_with_discovery, LoadedConfig};
pub use merger::{build_plan, PlanOverrides};
pub use orchestrator::{Orchestrator, Plan, ProcessRunner, Step, SystemRunner};
