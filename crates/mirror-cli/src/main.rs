//! docmirror CLI
//!
//! Mirrors per-package documentation into a central generated tree, checks
//! it for drift and renders a retrieval corpus from it.

mod cli;
mod commands;
mod context;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use mirror_core::{ConfigOverrides, MirrorConfig};

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {e}")))?;
        tracing::debug!("Verbose mode enabled");
    }

    let Some(command) = cli.command.clone() else {
        // No command provided - show help hint
        println!(
            "{} Mirror per-package documentation",
            "docmirror".green().bold()
        );
        println!();
        println!("Run {} for available commands.", "docmirror --help".cyan());
        return Ok(());
    };

    let config = resolve_config(&cli)?;
    execute_command(command, config)
}

fn resolve_config(cli: &Cli) -> Result<MirrorConfig> {
    let cwd = std::env::current_dir()?;
    let root = context::workspace_root(cli.root.as_deref(), &cwd);
    let overrides = ConfigOverrides {
        packages_root: cli.packages_root.clone(),
        output_root: cli.output_root.clone(),
        markdown_mode: cli.markdown_mode.map(Into::into),
    };
    context::load_config(&root, &overrides)
}

fn execute_command(cmd: Commands, config: MirrorConfig) -> Result<()> {
    match cmd {
        Commands::Packages { json } => commands::run_packages(&config, json),
        Commands::Map => commands::run_map(&config),
        Commands::Sync { dry_run, json } => commands::run_sync(config, dry_run, json),
        Commands::Check { json } => commands::run_check(config, json),
        Commands::Corpus { map, output } => {
            commands::run_corpus(&config, map.as_deref(), output.as_deref())
        }
    }
}
