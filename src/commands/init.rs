use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::cli::InitArgs;
use crate::config::{DevstartConfig, CONFIG_FILE_NAME};

pub fn run(args: InitArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let path = write_default_config(&cwd, args.force)?;

    println!("Created {}", path.display());
    println!();
    println!("Next steps:");
    println!("  devstart doctor    # check that python and flask are on PATH");
    println!("  devstart           # clean caches, seed, start the server");

    Ok(())
}

/// Write the default config into `dir`, refusing to overwrite unless `force`
pub fn write_default_config(dir: &Path, force: bool) -> Result<std::path::PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);

    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    fs::write(&path, DevstartConfig::example())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}
