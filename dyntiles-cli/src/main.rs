//! DynTiles CLI - Command-line interface
//!
//! Serves KML link documents and composited PNG tiles as CGI programs, and
//! provides tile geometry and configuration helpers.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::bounds::BoundsArgs;
use commands::cgi::{CgiArgs, Endpoint};
use commands::config::ConfigCommands;

#[derive(Parser)]
#[command(name = "dyntiles")]
#[command(version = dyntiles::VERSION)]
#[command(about = "Dynamic KML super-overlays for web tile servers and rasters", long_about = None)]
struct Cli {
    /// Config file (default: ~/.dyntiles/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve a KML link document
    Document(CgiArgs),

    /// Serve a composited PNG tile
    Tile(CgiArgs),

    /// Show the geometry of a tile
    Bounds(BoundsArgs),

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Document(args) => {
            commands::cgi::run(Endpoint::Document, args, config_path, cli.debug)
        }
        Commands::Tile(args) => commands::cgi::run(Endpoint::Tile, args, config_path, cli.debug),
        Commands::Bounds(args) => commands::bounds::run(args),
        Commands::Config(command) => commands::config::run(command, config_path),
    };

    if let Err(e) = result {
        e.exit();
    }
}
