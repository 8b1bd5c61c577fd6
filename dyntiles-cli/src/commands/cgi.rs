//! CGI entry points.
//!
//! Both commands read the request from `--query` or the `QUERY_STRING`
//! environment variable and write a CGI response (header block, blank line,
//! body) to stdout.

use clap::Args;
use dyntiles::service::{DynTilesService, Response, ServiceError};
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Environment variable a web server passes the query string in.
pub const QUERY_STRING_VAR: &str = "QUERY_STRING";

/// Arguments shared by the request commands.
#[derive(Debug, Args)]
pub struct CgiArgs {
    /// Query string; defaults to $QUERY_STRING
    #[arg(long)]
    pub query: Option<String>,
}

/// Which endpoint a request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Document,
    Tile,
}

impl Endpoint {
    fn name(self) -> &'static str {
        match self {
            Endpoint::Document => "document",
            Endpoint::Tile => "tile",
        }
    }

    fn serve(self, service: &DynTilesService, query: &str) -> Result<Response, ServiceError> {
        match self {
            Endpoint::Document => service.document(query),
            Endpoint::Tile => service.tile(query),
        }
    }
}

/// Serve one request and write the response to stdout.
pub fn run(
    endpoint: Endpoint,
    args: CgiArgs,
    config_path: Option<&Path>,
    debug_mode: bool,
) -> Result<(), CliError> {
    let query = resolve_query(args.query, std::env::var(QUERY_STRING_VAR).ok())
        .ok_or(CliError::MissingQuery)?;

    let runner = CliRunner::new(config_path, debug_mode)?;
    runner.log_startup(endpoint.name());
    let service = runner.create_service()?;

    debug!(query = %query, "Serving request");
    let response = endpoint.serve(&service, &query)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_response(&mut out, &response)?;
    out.flush()?;
    Ok(())
}

/// The `--query` argument if given, else the environment value.
pub fn resolve_query(arg: Option<String>, env: Option<String>) -> Option<String> {
    arg.or(env)
}

/// Writes a CGI response: content type header, blank line, body.
pub fn write_response<W: Write>(out: &mut W, response: &Response) -> io::Result<()> {
    write!(out, "Content-Type: {}\n\n", response.content_type)?;
    out.write_all(&response.body)
}
