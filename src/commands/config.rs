use anyhow::Result;
use tracing::info;

use crate::cli::{ConfigCommands, ConfigFormat, ConfigPathArgs};
use crate::config::DevstartConfig;
use crate::config_discovery::load_from_current_dir;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Validate { path } => validate(&path),
        ConfigCommands::Show { config, format } => show(&config, format),
    }
}

fn validate(path: &str) -> Result<()> {
    info!("Validating config file: {}", path);

    let config = DevstartConfig::from_file(path)?;
    config.validate()?;

    println!("✓ Configuration file is valid: {}", path);
    println!("\nSummary:");
    println!("  - Clean paths: {}", config.clean.paths.join(", "));
    if config.seed.enabled {
        println!(
            "  - Seed: {} {} (on failure: {})",
            config.seed.program,
            config.seed.args.join(" "),
            config.seed.on_failure
        );
    } else {
        println!("  - Seed: disabled");
    }
    println!(
        "  - Server: {} {}{}",
        config.server.program,
        config.server.args.join(" "),
        if config.server.debug {
            format!(" {}", config.server.debug_flag)
        } else {
            String::new()
        }
    );
    println!("  - Extra env vars: {}", config.env.len());

    Ok(())
}

fn show(args: &ConfigPathArgs, format: ConfigFormat) -> Result<()> {
    info!("Showing effective configuration");

    let loaded = load_from_current_dir(args.config.as_deref())?;

    match &loaded.path {
        Some(path) => eprintln!("# Loaded from {}", path.display()),
        None => eprintln!("# No config file found, showing defaults"),
    }
    eprintln!("# Project root: {}", loaded.root.display());

    match format {
        ConfigFormat::Toml => println!("{}", toml::to_string_pretty(&loaded.config)?),
        ConfigFormat::Json => println!("{}", serde_json::to_string_pretty(&loaded.config)?),
    }

    Ok(())
}
