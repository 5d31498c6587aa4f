/// `devstart up` command implementation
///
/// Cleans caches, seeds, then blocks on the development server.
use anyhow::{Context, Result};
use std::time::Instant;

use super::orchestrator_for;
use crate::cli::UpArgs;
use crate::cli_utils::devstart_prefix;
use crate::config_discovery::load_from_current_dir;
use crate::merger::build_plan;
use crate::orchestrator::{CleanOutcome, OrchestratorError};

pub fn run(args: &UpArgs) -> Result<()> {
    let overrides = args.overrides();

    if args.dry_run {
        let loaded = load_from_current_dir(args.config.config.as_deref())?;
        let plan = build_plan(&loaded, &overrides)?;

        if args.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&plan.summary()).context("Failed to render plan")?
            );
        } else {
            if let Some(path) = &loaded.path {
                println!("Config: {}", path.display());
            }
            println!("{}", plan.describe());
        }
        return Ok(());
    }

    let mut orchestrator = orchestrator_for(&args.config, &overrides)?;

    if args.verbose {
        eprintln!("{} Plan:", devstart_prefix());
        for line in orchestrator.plan().describe().lines() {
            eprintln!("{}   {}", devstart_prefix(), line);
        }
    }

    let start = Instant::now();
    let report = match orchestrator.run() {
        Ok(report) => report,
        Err(e @ OrchestratorError::SeedFailed { .. }) => {
            eprintln!("{} {}", devstart_prefix(), e);
            std::process::exit(e.exit_code());
        }
        Err(e) => return Err(e.into()),
    };

    if args.verbose {
        for outcome in &report.cleaned {
            match outcome {
                CleanOutcome::Removed { path, files } => {
                    eprintln!("{}   removed {} ({} files)", devstart_prefix(), path.display(), files)
                }
                CleanOutcome::Absent { path } => {
                    eprintln!("{}   absent {}", devstart_prefix(), path.display())
                }
                CleanOutcome::Failed { path, error } => {
                    eprintln!("{}   failed {}: {}", devstart_prefix(), path.display(), error)
                }
            }
        }
        eprintln!(
            "{} Server exited after {:.2}s (exit: {})",
            devstart_prefix(),
            start.elapsed().as_secs_f64(),
            report.server.exit_code
        );
    }

    tracing::info!(
        exit_code = report.server.exit_code,
        duration_ms = report.server.duration.as_millis() as u64,
        "development server stopped"
    );

    if !report.server.success() {
        std::process::exit(report.server.exit_code);
    }

    Ok(())
}
