/// `devstart seed` command implementation
use anyhow::Result;

use super::orchestrator_for;
use crate::cli::SeedArgs;
use crate::merger::PlanOverrides;

pub fn run(args: &SeedArgs) -> Result<()> {
    let mut orchestrator = orchestrator_for(&args.config, &PlanOverrides::default())?;

    match orchestrator.seed()? {
        Some(outcome) if !outcome.success() => std::process::exit(outcome.exit_code),
        Some(_) => Ok(()),
        None => {
            println!("Seeding is disabled in the configuration");
            Ok(())
        }
    }
}
