use anyhow::Result;

use crate::cli::DoctorArgs;
use crate::config_discovery::load_from_current_dir;

pub fn run(args: DoctorArgs) -> Result<()> {
    println!("devstart doctor\n");

    let mut all_ok = true;

    let loaded = match load_from_current_dir(args.config.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            println!("❌ Configuration could not be loaded: {:#}", e);
            std::process::exit(1);
        }
    };

    match &loaded.path {
        Some(path) => println!("✅ Config file: {}", path.display()),
        None => println!("⚠️  No devstart.toml found, using defaults"),
    }
    println!("✅ Project root: {}", loaded.root.display());

    if let Err(e) = loaded.config.validate() {
        println!("❌ Configuration is invalid: {}", e);
        all_ok = false;
    }

    let config = &loaded.config;

    if config.seed.enabled {
        all_ok &= check_program("Seed", &config.seed.program, &loaded.root, args.verbose);
        for arg in &config.seed.args {
            let candidate = loaded.root.join(arg);
            if arg.ends_with(".py") && !candidate.is_file() {
                println!("❌ Seed script not found: {}", candidate.display());
                all_ok = false;
            }
        }
    } else {
        println!("⚠️  Seeding disabled");
    }

    all_ok &= check_program("Server", &config.server.program, &loaded.root, args.verbose);

    println!();
    if all_ok {
        println!("All checks passed.");
        Ok(())
    } else {
        println!("Some checks failed.");
        std::process::exit(1);
    }
}

fn check_program(label: &str, program: &str, root: &std::path::Path, verbose: bool) -> bool {
    match which::which_in(program, std::env::var_os("PATH"), root) {
        Ok(path) => {
            if verbose {
                println!("✅ {} program: {} ({})", label, program, path.display());
            } else {
                println!("✅ {} program: {}", label, program);
            }
            true
        }
        Err(_) => {
            println!("❌ {} program not found on PATH: {}", label, program);
            false
        }
    }
}
