use serde::Serialize;
use tracing::{info, warn};

use crate::migrate::error::{Result, UnitError};
use crate::migrate::folder_index::build_folder_index;
use crate::migrate::result::{CopyOutcome, MigrationResult};
use crate::remote::{FolderRef, RemoteClient};

/// One origin folder paired with the destination its sub-folders go into.
///
/// The origin is always present. A missing destination means no match was
/// found, and migrating the unit only records that fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationUnit {
    origin: FolderRef,
    destination: Option<FolderRef>,
}

impl MigrationUnit {
    pub fn new(origin: FolderRef, destination: Option<FolderRef>) -> Self {
        Self {
            origin,
            destination,
        }
    }

    pub fn origin(&self) -> &FolderRef {
        &self.origin
    }

    pub fn destination(&self) -> Option<&FolderRef> {
        self.destination.as_ref()
    }

    /// One-line description of the pairing.
    pub fn describe(&self) -> String {
        let destination = match &self.destination {
            Some(d) => format!("{} - {}", d.name, d.id),
            None => "null - null".to_string(),
        };
        format!(
            "Original Box Folder: {} - {} New Box Folder: {}",
            self.origin.name, self.origin.id, destination
        )
    }

    /// Copy every immediate sub-folder of the origin into the destination.
    ///
    /// Sub-folders whose name already exists in the destination are skipped
    /// and recorded as `FolderAlreadyExists`, so running a unit again is safe.
    /// A failed copy is recorded as `Error` and does not stop the unit. Files
    /// directly inside the origin are ignored. Outcomes follow the order the
    /// provider lists the origin's children.
    ///
    /// Errors are returned only when the destination or origin cannot be
    /// listed. The error carries the outcomes recorded up to that point,
    /// including copies that were already made.
    pub async fn migrate<C: RemoteClient>(
        &self,
        client: &C,
    ) -> std::result::Result<MigrationResult, UnitError> {
        info!(origin = %self.origin.name, origin_id = %self.origin.id, "migrating folder");

        let mut result = MigrationResult::new(self.origin.clone());
        match self.copy_children(client, &mut result).await {
            Ok(()) => Ok(result),
            Err(source) => Err(UnitError { result, source }),
        }
    }

    async fn copy_children<C: RemoteClient>(
        &self,
        client: &C,
        result: &mut MigrationResult,
    ) -> Result<()> {
        let Some(destination) = &self.destination else {
            result.push(CopyOutcome::no_match(&self.origin));
            return Ok(());
        };

        let existing = build_folder_index(client, &destination.id).await?;
        let mut children = client.list_folder(&self.origin.id).await?;

        while let Some(child) = children.next_folder().await? {
            let outcome = if existing.contains(&child.name) {
                CopyOutcome::already_exists(destination, child)
            } else {
                match client.copy_folder(&child.id, &destination.id).await {
                    Ok(copied) => CopyOutcome::success(destination, copied),
                    Err(e) => {
                        warn!(
                            folder = %child.name,
                            folder_id = %child.id,
                            destination_id = %destination.id,
                            error = %e,
                            "copy failed"
                        );
                        CopyOutcome::error(destination, child, &e)
                    }
                }
            };
            result.push(outcome);
        }

        Ok(())
    }
}
