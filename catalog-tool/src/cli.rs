//! Command-line arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "catalog-tool")]
#[command(about = "Inspect and plan changes to a catalog category snapshot")]
#[command(version)]
pub struct Cli {
    /// Category snapshot (JSON array of categories)
    #[arg(short, long, env = "CATALOG_SNAPSHOT", global = true)]
    pub snapshot: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, env = "LOG_LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    /// Also write daily-rolling log files into this directory
    #[arg(long, env = "LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Build the category tree
    Tree {
        /// Print an indented outline instead of JSON
        #[arg(long)]
        outline: bool,
    },

    /// Report every integrity problem in the snapshot
    Audit,

    /// Follow fallback links from a category
    FallbackChain {
        /// Category id
        id: i64,
    },

    /// Check whether a category can be deleted and plan the deletion
    PlanDelete {
        /// Category id
        id: i64,

        /// Products currently in the category
        #[arg(long, default_value_t = 0)]
        products: u64,

        /// Fallback category to use instead of the stored one
        #[arg(long)]
        fallback: Option<i64>,
    },

    /// Derive a meta field key from a label (no snapshot needed)
    NormalizeKey {
        /// Field label, e.g. "Screen Size"
        label: String,

        /// Keys already used in the category
        #[arg(long, value_delimiter = ',')]
        existing: Vec<String>,
    },

    /// Compute sort orders for a new sibling order
    Reorder {
        /// Parent category id (omit for root categories)
        #[arg(long)]
        parent: Option<i64>,

        /// Sibling ids in the new order
        #[arg(required = true, value_delimiter = ',')]
        ids: Vec<i64>,
    },
}

impl Command {
    pub fn needs_snapshot(&self) -> bool {
        !matches!(self, Self::NormalizeKey { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan_delete() {
        let cli = Cli::try_parse_from([
            "catalog-tool",
            "--snapshot",
            "cats.json",
            "plan-delete",
            "7",
            "--products",
            "12",
            "--fallback",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.snapshot, Some(PathBuf::from("cats.json")));
        assert_eq!(
            cli.command,
            Command::PlanDelete {
                id: 7,
                products: 12,
                fallback: Some(3)
            }
        );
    }

    #[test]
    fn test_parse_lists() {
        let cli = Cli::try_parse_from(["catalog-tool", "reorder", "--parent", "1", "3,2"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Reorder {
                parent: Some(1),
                ids: vec![3, 2]
            }
        );

        let cli = Cli::try_parse_from([
            "catalog-tool",
            "normalize-key",
            "Screen Size",
            "--existing",
            "ram,cpu",
        ])
        .unwrap();
        assert!(!cli.command.needs_snapshot());
        assert_eq!(
            cli.command,
            Command::NormalizeKey {
                label: "Screen Size".to_string(),
                existing: vec!["ram".to_string(), "cpu".to_string()]
            }
        );
    }

    #[test]
    fn test_reorder_requires_ids() {
        assert!(Cli::try_parse_from(["catalog-tool", "reorder"]).is_err());
    }
}
