/// `devstart serve` command implementation
use anyhow::Result;

use super::orchestrator_for;
use crate::cli::ServeArgs;
use crate::merger::PlanOverrides;

pub fn run(args: &ServeArgs) -> Result<()> {
    let overrides = PlanOverrides {
        skip_clean: true,
        skip_seed: true,
        no_debug: args.no_debug,
        extra_server_args: args.server_args.clone(),
        ..Default::default()
    };
    let mut orchestrator = orchestrator_for(&args.config, &overrides)?;

    let outcome = orchestrator.serve()?;
    if !outcome.success() {
        std::process::exit(outcome.exit_code);
    }

    Ok(())
}
