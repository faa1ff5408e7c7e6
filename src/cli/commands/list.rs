//! The `list` command: export the children of a folder to CSV.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::app::App;
use crate::cli::{GlobalArgs, OutputSink, Result};
use crate::report::write_contents_list;

/// Arguments for the list command.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Id of the folder to list.
    pub folder_id: String,

    /// Directory the contents list is written to.
    #[arg(long = "output-dir", default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(Serialize)]
struct ListReport {
    path: PathBuf,
    entries: usize,
}

impl ListArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let client = app.connect().await?;
        let (path, entries) = write_contents_list(&client, &self.folder_id, &self.output_dir).await?;

        let output = OutputSink::default();
        if global.json {
            output.write_json(&ListReport { path, entries }).await?;
        } else {
            output
                .write_str(&format!("Wrote {} entries to {}", entries, path.display()))
                .await?;
        }
        Ok(())
    }
}
