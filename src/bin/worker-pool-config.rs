//! CLI tool for checking worker pool scripts
//!
//! Loads a script the same way the process manager would, with every hook
//! name accepted as a placeholder, and reports what it declares.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use worker_pool_dsl::logging::init_structured_logging;
use worker_pool_dsl::{HookRegistry, LoaderSettings, ScriptLoader, WorkerPoolConfig};

#[derive(Parser)]
#[command(name = "worker-pool-config")]
#[command(about = "Check and inspect worker pool configuration scripts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a script and report whether it is valid
    Check(ScriptArgs),
    /// Print the structure a script declares as JSON
    Show(ScriptArgs),
}

#[derive(Args)]
struct ScriptArgs {
    /// Script path (defaults to WORKER_POOL_CONFIG_PATH or config/worker_pool.yml)
    script: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_structured_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check(args) => check(args),
        Commands::Show(args) => show(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Worker pool script is invalid: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load(args: ScriptArgs) -> Result<(PathBuf, WorkerPoolConfig), Box<dyn std::error::Error>> {
    let settings = LoaderSettings::from_env()?;
    let path = args.script.unwrap_or_else(|| settings.config_path.clone());
    let loader = ScriptLoader::new(settings).with_hooks(HookRegistry::with_placeholders());

    let config = loader.load(&path)?;
    Ok((path, config))
}

fn check(args: ScriptArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (path, config) = load(args)?;

    println!("Worker pool script is valid: {}", path.display());
    println!("   Worker pools: {}", config.worker_pools().len());
    println!("   Preload app: {:?}", config.preload_app());
    for (slot, callback) in config.options().callbacks() {
        println!("   {slot}: {}", callback.label());
    }
    Ok(())
}

fn show(args: ScriptArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (_, config) = load(args)?;
    println!("{}", serde_json::to_string_pretty(&config.to_json())?);
    Ok(())
}
