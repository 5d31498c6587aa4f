/// `devstart clean` command implementation
use anyhow::Result;

use super::orchestrator_for;
use crate::cli::CleanArgs;
use crate::merger::PlanOverrides;
use crate::orchestrator::{resolve_targets, CleanOutcome};

pub fn run(args: &CleanArgs) -> Result<()> {
    let mut orchestrator = orchestrator_for(&args.config, &PlanOverrides::default())?;

    if args.dry_run {
        let plan = orchestrator.plan();
        let entries = plan.clean.as_deref().unwrap_or_default();
        let mut found = 0;

        for target in resolve_targets(&plan.root, entries) {
            match target {
                Ok(path) if path.symlink_metadata().is_ok() => {
                    found += 1;
                    println!("would remove {}", path.display());
                }
                Err(CleanOutcome::Failed { path, error }) => {
                    println!("would skip {}: {}", path.display(), error);
                }
                _ => {}
            }
        }

        if found == 0 {
            println!("Nothing to remove");
        }
        return Ok(());
    }

    let outcomes = orchestrator.clean();

    let removed = outcomes
        .iter()
        .filter(|o| matches!(o, CleanOutcome::Removed { .. }))
        .count();
    let failed = outcomes.iter().filter(|o| o.is_failure()).count();

    println!("Removed {} path(s), {} failed", removed, failed);

    Ok(())
}
