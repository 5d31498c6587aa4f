mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands, ConfigPathArgs, UpArgs};
use devstart::{cli_utils, config, config_discovery, logging, merger, orchestrator};

fn main() -> Result<()> {
    logging::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Up(args)) => commands::up::run(&args),
        None => commands::up::run(&UpArgs {
            config: ConfigPathArgs {
                config: std::env::var("DEVSTART_CONFIG").ok(),
            },
            ..Default::default()
        }),
        Some(Commands::Clean(args)) => commands::clean::run(&args),
        Some(Commands::Seed(args)) => commands::seed::run(&args),
        Some(Commands::Serve(args)) => commands::serve::run(&args),
        Some(Commands::Init(args)) => commands::init::run(args),
        Some(Commands::Config(args)) => commands::config::run(args.command),
        Some(Commands::Doctor(args)) => commands::doctor::run(args),
    }
}
