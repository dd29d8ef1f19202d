//! Command execution
//!
//! Results are rendered as pretty JSON inside an [`ApiResponse`]. A core
//! failure is rendered as an error envelope and marks the report unsuccessful.

use anyhow::{Context, Result};
use catalog_core::{
    CatalogConfig, CatalogError, CatalogResult, FallbackResolver, category, schema_key, tree,
};
use serde::Serialize;
use shared::error::{ApiResponse, AppError};
use shared::models::Category;

use crate::cli::{Cli, Command};
use crate::snapshot;

/// Rendered command output
#[derive(Debug)]
pub struct Report {
    pub body: String,
    pub is_success: bool,
}

#[derive(Serialize)]
struct FallbackChainView {
    chain: Vec<i64>,
    terminal: i64,
}

#[derive(Serialize)]
struct KeyView {
    key: String,
}

pub fn run(cli: &Cli, config: &CatalogConfig) -> Result<Report> {
    let categories = if cli.command.needs_snapshot() {
        let path = cli
            .snapshot
            .as_deref()
            .context("--snapshot (or CATALOG_SNAPSHOT) is required for this command")?;
        snapshot::load(path)?
    } else {
        Vec::new()
    };
    execute(&cli.command, &categories, config)
}

pub fn execute(command: &Command, categories: &[Category], config: &CatalogConfig) -> Result<Report> {
    tracing::debug!(?command, categories = categories.len(), "Executing command");

    match command {
        Command::Tree { outline: true } => match tree::build(categories, config.max_depth) {
            Ok(forest) => Ok(Report {
                body: render_outline(&forest),
                is_success: true,
            }),
            Err(err) => failure(err),
        },
        Command::Tree { outline: false } => {
            respond(tree::build(categories, config.max_depth).map(|forest| forest.into_roots()))
        }
        Command::Audit => {
            let findings = catalog_core::audit(categories, config);
            let message = match findings.len() {
                0 => "Snapshot is consistent".to_string(),
                n => format!("{n} problem(s) found"),
            };
            let is_success = findings.is_empty();
            let body = serde_json::to_string_pretty(&ApiResponse::success_with_message(message, findings))?;
            Ok(Report { body, is_success })
        }
        Command::FallbackChain { id } => respond(fallback_chain(*id, categories)),
        Command::PlanDelete {
            id,
            products,
            fallback,
        } => respond(category::find(categories, *id).and_then(|target| {
            FallbackResolver::new(categories).plan_deletion(target, *products, *fallback)
        })),
        Command::NormalizeKey { label, existing } => {
            respond(schema_key::normalize(label).and_then(|key| {
                schema_key::validate_unique(&key, existing.as_slice())?;
                Ok(KeyView { key })
            }))
        }
        Command::Reorder { parent, ids } => {
            respond(category::reorder_siblings(*parent, ids, categories))
        }
    }
}

fn fallback_chain(id: i64, categories: &[Category]) -> CatalogResult<FallbackChainView> {
    let target = category::find(categories, id)?;
    let chain = FallbackResolver::new(categories).fallback_chain(target)?;
    Ok(FallbackChainView {
        terminal: chain.last().copied().unwrap_or(id),
        chain,
    })
}

fn respond<T: Serialize>(result: CatalogResult<T>) -> Result<Report> {
    match result {
        Ok(data) => Ok(Report {
            body: serde_json::to_string_pretty(&ApiResponse::success(data))?,
            is_success: true,
        }),
        Err(err) => failure(err),
    }
}

fn failure(err: CatalogError) -> Result<Report> {
    tracing::debug!(error = %err, "Command failed");
    let app = AppError::from(err);
    Ok(Report {
        body: serde_json::to_string_pretty(&ApiResponse::error(&app))?,
        is_success: false,
    })
}

fn render_outline(forest: &catalog_core::CategoryForest) -> String {
    let mut out = String::new();
    for node in forest.iter() {
        let c = &node.category;
        out.push_str(&format!("{}{} ({})", "  ".repeat(node.depth as usize), c.name, c.id));
        if !c.is_active {
            out.push_str(" [inactive]");
        }
        if c.is_archived {
            out.push_str(" [archived]");
        }
        if node.exceeds_max_depth {
            out.push_str(" [too deep]");
        }
        out.push('\n');
    }
    out
}
