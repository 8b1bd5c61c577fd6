//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use dyntiles::config::ConfigFileError;
use dyntiles::service::ServiceError;
use std::fmt;
use std::process;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Neither `--query` nor `QUERY_STRING` was given
    MissingQuery,
    /// Failed to create service
    ServiceCreation(ServiceError),
    /// Request could not be served
    Request(ServiceError),
    /// Failed to write the response
    Output(std::io::Error),
    /// Malformed tile address argument
    InvalidTile(String),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::MissingQuery => {
                eprintln!();
                eprintln!("Pass the request with --query, for example:");
                eprintln!("  dyntiles document --query 'url=/data/dem.tif;&zoom=1-12'");
            }
            CliError::Request(ServiceError::CompositeFailed(_)) => {
                eprintln!();
                eprintln!("Common issues:");
                eprintln!("  1. GDAL tools not installed or not on PATH (gdalwarp, gdal_translate)");
                eprintln!("  2. Dataset path not readable by the web server user");
                eprintln!("  3. Web tile server unreachable or timing out");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::MissingQuery => write!(f, "No query string given"),
            CliError::ServiceCreation(e) => write!(f, "Failed to create service: {}", e),
            CliError::Request(e) => write!(f, "{}", e),
            CliError::Output(e) => write!(f, "Failed to write response: {}", e),
            CliError::InvalidTile(msg) => write!(f, "Invalid tile address: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ServiceCreation(e) => Some(e),
            CliError::Request(e) => Some(e),
            CliError::Output(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ServiceError> for CliError {
    fn from(e: ServiceError) -> Self {
        CliError::Request(e)
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Output(e)
    }
}
