//! catalog-tool - operator CLI for catalog category snapshots
//!
//! Loads a JSON snapshot of categories and runs the catalog core over it:
//! tree building, integrity audit, fallback resolution, deletion planning,
//! key normalization and sibling reordering. Nothing is written back.
//!
//! # Environment
//!
//! `.env` is loaded first. `CATALOG_SNAPSHOT`, `LOG_LEVEL` and `LOG_DIR` back
//! the matching flags; `CATALOG_MAX_*` set the core limits.
//!
//! Exit codes: 0 success, 1 the core refused or found problems, 2 the
//! snapshot could not be loaded. Both failure kinds print an error envelope.

mod cli;
mod commands;
mod logger;
mod snapshot;

use catalog_core::CatalogConfig;
use clap::Parser;
use shared::error::{ApiResponse, AppError};
use std::process::ExitCode;

use cli::Cli;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logger::init_logger(&cli.log_level, cli.log_dir.as_deref());

    let config = CatalogConfig::from_env();
    tracing::debug!(?config, "Configuration loaded");

    match commands::run(&cli, &config) {
        Ok(report) => {
            println!("{}", report.body.trim_end());
            if report.is_success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "catalog-tool failed");
            let app = AppError::snapshot(format!("{err:#}"));
            match serde_json::to_string_pretty(&ApiResponse::error(&app)) {
                Ok(body) => println!("{body}"),
                Err(_) => eprintln!("Error: {err:#}"),
            }
            ExitCode::from(2)
        }
    }
}
