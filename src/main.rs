//! Command-line tool generating an OpenAPI 3.0 document from annotated source comments.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-annotations [OPTIONS] --controllers <DIR>
//! ```
//!
//! # Examples
//!
//! Generate JSON from a Rails-style application:
//! ```bash
//! openapi-from-annotations --models app/models --controllers app/controllers -o openapi.json
//! ```
//!
//! Generate YAML and fail on any diagnostic:
//! ```bash
//! openapi-from-annotations -c app/controllers -f yaml --strict
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_annotations::cli;

fn main() -> Result<()> {
    // Parse first so the verbose flag can pick the log level
    let parsed = cli::CliArgs::parse();

    let log_level = if parsed.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI generator starting...");

    let args = cli::parse_args_from_parsed(parsed)?;
    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
