//! The `plan` command: show which folders would be migrated where.

use clap::Args;

use crate::app::App;
use crate::cli::{FolderArgs, GlobalArgs, OutputSink, Result};
use crate::migrate::{plan_migration, MigrationPlan};

/// Arguments for the plan command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub folders: FolderArgs,

    #[command(flatten)]
    pub output: OutputSink,
}

impl PlanArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let options = app.migration_options(&self.folders.to_migration_context())?;
        let client = app.connect().await?;
        let plan = plan_migration(&client, &options).await?;

        if global.json {
            self.output.write_json(&plan).await?;
        } else {
            self.output.write_str(&plan_text(&plan)).await?;
        }
        Ok(())
    }
}

fn plan_text(plan: &MigrationPlan) -> String {
    let units = plan.units.iter().map(|unit| unit.describe());
    let unresolved = plan.unresolved.iter().map(|u| {
        format!(
            "Unresolved mapping: {} -> {}: {}",
            u.mapping.origin_id,
            u.mapping.destination_id.as_deref().unwrap_or("null"),
            u.error
        )
    });
    units.chain(unresolved).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate::{FolderMapping, MigrationUnit, UnresolvedMapping};
    use crate::remote::FolderRef;

    #[test]
    fn test_plan_text() {
        let plan = MigrationPlan {
            units: vec![
                MigrationUnit::new(FolderRef::new("10", "Acme"), Some(FolderRef::new("30", "Acme"))),
                MigrationUnit::new(FolderRef::new("20", "Beta"), None),
            ],
            unresolved: vec![UnresolvedMapping {
                mapping: FolderMapping {
                    origin_id: "999".to_string(),
                    destination_id: None,
                },
                error: "folder 999 not found".to_string(),
            }],
        };

        assert_eq!(
            plan_text(&plan),
            "Original Box Folder: Acme - 10 New Box Folder: Acme - 30\n\
             Original Box Folder: Beta - 20 New Box Folder: null - null\n\
             Unresolved mapping: 999 -> null: folder 999 not found"
        );
    }
}
