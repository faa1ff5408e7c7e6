//! Command-line interface for boxmigrate.

pub mod args;
mod commands;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::app::{App, AppError};
use crate::migrate::MigrateError;
use crate::report::ReportError;

pub use args::{FolderArgs, GlobalArgs, OutputSink};
pub use commands::list::ListArgs;
pub use commands::migrate::MigrateArgs;
pub use commands::plan::PlanArgs;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during CLI execution.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument processing error.
    #[error("{0}")]
    Args(#[from] args::ArgsError),

    /// App error.
    #[error("{0}")]
    App(#[from] AppError),

    /// Migration error.
    #[error("{0}")]
    Migrate(#[from] MigrateError),

    /// Report error.
    #[error("{0}")]
    Report(#[from] ReportError),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

// =============================================================================
// CLI Definition
// =============================================================================

/// boxmigrate - Copy account folders between Box folder trees.
#[derive(Parser, Debug)]
#[command(name = "boxmigrate", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Copy every origin sub-folder into its matching destination and log the outcome.
    Migrate(MigrateArgs),

    /// Show which folders would be migrated where, without copying anything.
    Plan(PlanArgs),

    /// Write the name and id of every child of a folder to a CSV file.
    List(ListArgs),
}

// =============================================================================
// CLI Execution
// =============================================================================

impl Cli {
    /// Parse command-line arguments and return the CLI instance.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        let app = App::new(self.global.to_app_context())?;

        match self.command {
            Command::Migrate(args) => args.run(&app, &self.global).await,
            Command::Plan(args) => args.run(&app, &self.global).await,
            Command::List(args) => args.run(&app, &self.global).await,
        }
    }
}

/// Main entry point for the CLI.
pub async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli.run().await
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_parse_migrate() {
        let cli = Cli::try_parse_from([
            "boxmigrate",
            "--config",
            "box.page_size=100",
            "migrate",
            "--origin-folder",
            "1",
            "--accounts-folder",
            "2",
            "--log-dir",
            "/tmp/logs",
            "--json",
        ])
        .unwrap();

        assert!(cli.global.json);
        assert_eq!(
            cli.global.config_overrides,
            vec![("box.page_size".to_string(), "100".to_string())]
        );
        let Command::Migrate(args) = cli.command else {
            panic!("expected migrate");
        };
        assert_eq!(args.folders.origin_folder.as_deref(), Some("1"));
        assert_eq!(args.folders.accounts_folder.as_deref(), Some("2"));
        assert_eq!(args.log_dir, Some(PathBuf::from("/tmp/logs")));
        assert!(!args.folders.mapping_only);
    }

    #[test]
    fn test_mapping_only_requires_mapping_file() {
        assert!(Cli::try_parse_from(["boxmigrate", "migrate", "--mapping-only"]).is_err());
        assert!(Cli::try_parse_from([
            "boxmigrate",
            "plan",
            "--mapping-only",
            "--mapping-file",
            "map.csv",
            "-o",
            "plan.txt",
        ])
        .is_ok());
    }

    #[test]
    fn test_parse_list() {
        let cli = Cli::try_parse_from(["boxmigrate", "list", "12345"]).unwrap();
        let Command::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.folder_id, "12345");
        assert_eq!(args.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
