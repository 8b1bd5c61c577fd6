//! Configuration management CLI commands.
//!
//! Provides `config path`, `config init` and `config show`.

use clap::Subcommand;
use dyntiles::config::ConfigFile;
use std::path::Path;

use crate::error::CliError;
use crate::runner::resolve_config_path;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Write a default configuration file if none exists
    Init,

    /// Print the effective settings
    Show,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, config_path: Option<&Path>) -> Result<(), CliError> {
    let path = resolve_config_path(config_path);
    match command {
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Init => run_init(&path),
        ConfigCommands::Show => run_show(&path),
    }
}

fn run_init(path: &Path) -> Result<(), CliError> {
    if ConfigFile::init_at(path)? {
        println!("Created {}", path.display());
    } else {
        println!("Configuration already exists: {}", path.display());
    }
    Ok(())
}

fn run_show(path: &Path) -> Result<(), CliError> {
    let config = ConfigFile::load_from(path)?;
    print!("{}", format_settings(&config));
    Ok(())
}

/// Effective settings as `section.key = value` lines.
pub fn format_settings(config: &ConfigFile) -> String {
    let scratch = config
        .cache
        .scratch_directory
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(system temp)".to_string());

    [
        ("server.document_url", config.server.document_url.clone()),
        ("server.tile_url", config.server.tile_url.clone()),
        ("server.placeholder_url", config.server.placeholder_url.clone()),
        ("tiles.size", config.tiles.size.to_string()),
        ("cache.directory", config.cache.directory.display().to_string()),
        ("cache.scratch_directory", scratch),
        ("download.timeout", config.download.timeout.to_string()),
        ("probe.cache_ttl", config.probe.cache_ttl.to_string()),
        ("logging.file", config.logging.file.display().to_string()),
    ]
    .iter()
    .map(|(key, value)| format!("{} = {}\n", key, value))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_then_show() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");

        run(ConfigCommands::Init, Some(&path)).unwrap();
        assert!(path.is_file());
        run(ConfigCommands::Init, Some(&path)).unwrap();
        run(ConfigCommands::Show, Some(&path)).unwrap();
    }

    #[test]
    fn test_format_settings() {
        let text = format_settings(&ConfigFile::default());
        assert!(text.contains("tiles.size = 256\n"));
        assert!(text.contains("cache.directory = dynamic_tiles\n"));
        assert!(text.contains("cache.scratch_directory = (system temp)\n"));
        assert!(text.contains("probe.cache_ttl = 0\n"));
        assert_eq!(text.lines().count(), 9);
    }
}
