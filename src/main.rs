//! Web API to OpenAPI - command-line tool for documenting .NET Web API controllers.
//!
//! # Usage
//!
//! ```bash
//! webapi-to-openapi [OPTIONS] <MODULE_PATHS>...
//! ```
//!
//! # Examples
//!
//! Document every controller of a project:
//! ```bash
//! webapi-to-openapi ./Shop.Api -o swagger.json
//! ```
//!
//! Only the order controllers, as YAML:
//! ```bash
//! webapi-to-openapi ./Shop.Api -c "Order*" -f yaml -o openapi.yaml
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! webapi-to-openapi ./Shop.Api -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use webapi_to_openapi::cli;

fn main() -> Result<()> {
    // Parse first so the verbose flag can pick the log level
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Web API to OpenAPI starting...");

    let args = cli::parse_args_from_parsed(args)?;

    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
