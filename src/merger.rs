/// Configuration merger: CLI args > Env vars > Config file > Defaults
///
/// Env vars are folded into CLI args by clap, so only two layers meet here:
/// the overrides parsed from the command line and the loaded config file.
use anyhow::Result;

use crate::config::SeedFailurePolicy;
use crate::config_discovery::LoadedConfig;
use crate::orchestrator::{Invocation, Plan, Step};

/// Per-run overrides taken from the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanOverrides {
    pub skip_clean: bool,
    pub skip_seed: bool,
    /// `Some` when `--keep-going` or `--fail-fast` was given
    pub on_seed_failure: Option<SeedFailurePolicy>,
    pub no_debug: bool,
    /// Appended to the server arguments, before the debug flag
    pub extra_server_args: Vec<String>,
}

/// Merge a loaded config and CLI overrides into a validated plan
pub fn build_plan(loaded: &LoadedConfig, overrides: &PlanOverrides) -> Result<Plan> {
    let config = &loaded.config;
    config.validate()?;

    let clean = if overrides.skip_clean {
        None
    } else {
        Some(config.clean.paths.clone())
    };

    let seed = if overrides.skip_seed || !config.seed.enabled {
        None
    } else {
        Some(Invocation {
            step: Step::Seed,
            program: config.seed.program.clone(),
            args: config.seed.args.clone(),
            env: config.env.clone(),
            cwd: loaded.root.clone(),
        })
    };

    let mut server_args = config.server.args.clone();
    server_args.extend(overrides.extra_server_args.iter().cloned());
    if config.server.debug && !overrides.no_debug {
        server_args.push(config.server.debug_flag.clone());
    }

    let server = Invocation {
        step: Step::Serve,
        program: config.server.program.clone(),
        args: server_args,
        env: config.env.clone(),
        cwd: loaded.root.clone(),
    };

    let plan = Plan {
        root: loaded.root.clone(),
        clean,
        seed,
        server,
        on_seed_failure: overrides
            .on_seed_failure
            .unwrap_or(config.seed.on_failure),
    };
    plan.check()?;

    Ok(plan)
}
