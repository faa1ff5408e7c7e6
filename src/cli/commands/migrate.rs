//! The `migrate` command: run a full migration and write the log.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::app::App;
use crate::cli::{FolderArgs, GlobalArgs, OutputSink, Result};
use crate::migrate::{run_migration, RunSummary};

/// Arguments for the migrate command.
#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub folders: FolderArgs,

    /// Directory the migration log is written to.
    #[arg(long = "log-dir")]
    pub log_dir: Option<PathBuf>,

    /// Base name of the migration log file, without extension.
    #[arg(long = "log-name")]
    pub log_name: Option<String>,
}

#[derive(Serialize)]
struct MigrateReport<'a> {
    log_path: &'a Path,
    #[serde(flatten)]
    summary: &'a RunSummary,
}

impl MigrateArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let options = app.migration_options(&self.folders.to_migration_context())?;
        let client = app.connect().await?;
        let (log_path, mut log) =
            app.create_migration_log(self.log_dir.as_deref(), self.log_name.as_deref())?;
        info!(path = %log_path.display(), "writing migration log");

        let summary = run_migration(&client, &options, &mut log).await?;
        log.flush()?;

        let output = OutputSink::default();
        if global.json {
            output
                .write_json(&MigrateReport {
                    log_path: &log_path,
                    summary: &summary,
                })
                .await?;
        } else {
            output.write_str(&summary_text(&log_path, &summary)).await?;
        }
        Ok(())
    }
}

fn summary_text(log_path: &Path, summary: &RunSummary) -> String {
    let mut lines = vec![
        format!("Migration log: {}", log_path.display()),
        format!(
            "Units: {} processed, {} failed, {} unresolved",
            summary.units_processed, summary.units_failed, summary.units_unresolved
        ),
        format!(
            "Folders: {} copied, {} already existed, {} errors, {} unmatched",
            summary.success, summary.already_exists, summary.errors, summary.no_match
        ),
    ];
    let elapsed = summary.elapsed();
    lines.push(format!(
        "Elapsed: {} ms ({} minutes)",
        elapsed.as_millis(),
        elapsed.as_secs() / 60
    ));
    lines.join("\n")
}
