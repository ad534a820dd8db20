//! web-openapi - Command-line demo for the declarative API builder.
//!
//! Builds the demo API, then prints its OpenAPI 3.1 document and optionally
//! writes the TypeScript client types.
//!
//! # Usage
//!
//! ```bash
//! web-openapi [OPTIONS]
//! ```
//!
//! # Examples
//!
//! Print the document as YAML:
//! ```bash
//! web-openapi -f yaml
//! ```
//!
//! Write JSON and TypeScript files:
//! ```bash
//! web-openapi -o openapi.json -t api.ts
//! ```
//!
//! Try a route against the assembled router:
//! ```bash
//! web-openapi -g /test/ferris -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use web_openapi::cli;

fn main() -> Result<()> {
    // Parse once up front so the verbose flag can pick the log level
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("web-openapi demo starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("Done");

    Ok(())
}
