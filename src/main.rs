use clap::Parser;
use flowlens::cli::{Cli, Commands};
use flowlens::config::Settings;
use flowlens::logging;

fn main() {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        Settings::default()
    });

    logging::init_with_config(&settings.logging);

    match cli.command {
        Commands::Init { force } => flowlens::cli::commands::init::run_init(force),
        Commands::Config => flowlens::cli::commands::config::run_config(&settings),
        Commands::Analyze { path, dry_run, max_files } => {
            flowlens::cli::commands::analyze::run_analyze(path, dry_run, max_files, settings)
        }
        Commands::Export { path, out } => flowlens::cli::commands::export::run_export(path, out, settings),
    }
}
