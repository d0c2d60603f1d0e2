//! `init` and `config` commands.

use std::path::PathBuf;

use crate::config::Settings;

pub fn run_init(force: bool) {
    let config_path = PathBuf::from("flowlens.toml");

    if config_path.exists() && !force {
        eprintln!("Configuration file already exists at: {}", config_path.display());
        eprintln!("Use --force to overwrite");
        std::process::exit(1);
    }

    match Settings::init_config_file(&config_path, force) {
        Ok(()) => {
            println!("Created configuration file at: {}", config_path.display());
            println!("Edit this file to customize your settings.");
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
