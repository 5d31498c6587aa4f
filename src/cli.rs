use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::SeedFailurePolicy;
use crate::merger::PlanOverrides;

/// devstart - local development launcher
///
/// Cleans Python bytecode caches, seeds the database, and starts the
/// development server in debug mode. Running `devstart` without a
/// subcommand is the same as `devstart up`.
#[derive(Parser, Debug)]
#[command(name = "devstart")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Clean caches, seed the database, start the dev server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Config file argument shared across commands
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigPathArgs {
    /// Config file path (default: nearest devstart.toml)
    #[arg(short = 'c', long, env = "DEVSTART_CONFIG")]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clean caches, seed, then start the development server
    Up(UpArgs),

    /// Remove the configured bytecode cache directories
    Clean(CleanArgs),

    /// Run the seed program only
    Seed(SeedArgs),

    /// Start the development server only
    Serve(ServeArgs),

    /// Write a default devstart.toml in the current directory
    Init(InitArgs),

    /// Configuration management utilities
    Config(ConfigArgs),

    /// Check that the configured programs can be found
    Doctor(DoctorArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct UpArgs {
    #[command(flatten)]
    pub config: ConfigPathArgs,

    /// Do not remove cache directories
    #[arg(long)]
    pub skip_clean: bool,

    /// Do not run the seed program
    #[arg(long)]
    pub skip_seed: bool,

    /// Start the server even if seeding fails
    #[arg(long, conflicts_with = "fail_fast")]
    pub keep_going: bool,

    /// Do not start the server if seeding fails
    #[arg(long)]
    pub fail_fast: bool,

    /// Start the server without the debug flag
    #[arg(long)]
    pub no_debug: bool,

    /// Print the plan without deleting or running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the dry-run plan as JSON
    #[arg(long, requires = "dry_run")]
    pub json: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Extra arguments for the server (after --)
    #[arg(last = true)]
    pub server_args: Vec<String>,
}

impl UpArgs {
    pub fn overrides(&self) -> PlanOverrides {
        PlanOverrides {
            skip_clean: self.skip_clean,
            skip_seed: self.skip_seed,
            on_seed_failure: if self.keep_going {
                Some(SeedFailurePolicy::Continue)
            } else if self.fail_fast {
                Some(SeedFailurePolicy::Abort)
            } else {
                None
            },
            no_debug: self.no_debug,
            extra_server_args: self.server_args.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    #[command(flatten)]
    pub config: ConfigPathArgs,

    /// List what would be removed without removing it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct SeedArgs {
    #[command(flatten)]
    pub config: ConfigPathArgs,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigPathArgs,

    /// Start the server without the debug flag
    #[arg(long)]
    pub no_debug: bool,

    /// Extra arguments for the server (after --)
    #[arg(last = true)]
    pub server_args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing devstart.toml
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Validate {
        /// Path to config file
        path: String,
    },
    /// Show effective configuration
    Show {
        #[command(flatten)]
        config: ConfigPathArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "toml")]
        format: ConfigFormat,
    },
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    #[command(flatten)]
    pub config: ConfigPathArgs,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["devstart"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_up_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "devstart",
            "up",
            "--skip-clean",
            "--keep-going",
            "--",
            "--port",
            "5050",
        ])
        .unwrap();

        let Some(Commands::Up(args)) = cli.command else {
            panic!("expected up");
        };
        let overrides = args.overrides();
        assert!(overrides.skip_clean);
        assert!(!overrides.skip_seed);
        assert_eq!(overrides.on_seed_failure, Some(SeedFailurePolicy::Continue));
        assert_eq!(overrides.extra_server_args, vec!["--port", "5050"]);
    }

    #[test]
    fn test_keep_going_conflicts_with_fail_fast() {
        assert!(Cli::try_parse_from(["devstart", "up", "--keep-going", "--fail-fast"]).is_err());
    }

    #[test]
    fn test_json_requires_dry_run() {
        assert!(Cli::try_parse_from(["devstart", "up", "--json"]).is_err());
        assert!(Cli::try_parse_from(["devstart", "up", "--dry-run", "--json"]).is_ok());
    }
}
