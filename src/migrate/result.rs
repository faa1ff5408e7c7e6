//! Per-unit migration results and their projection to CSV rows.

use std::fmt;

use serde::Serialize;

use crate::remote::{FolderInfo, FolderRef, RemoteError};

/// Header row of the migration log.
pub const MIGRATION_LOG_COLUMNS: [&str; 9] = [
    "Origin Folder Name",
    "Origin Folder ID",
    "Destination Folder Name",
    "Destination Folder ID",
    "Migrated Folder Name",
    "Migrated Folder ID",
    "Number of Files",
    "Status",
    "Details",
];

/// Placeholder written for a missing name or id so every row has the same
/// number of columns.
pub const EMPTY_VALUE: &str = " ";

/// Size written when there is no migrated folder.
const EMPTY_SIZE: &str = "0";

/// What happened to one origin sub-folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CopyStatus {
    /// The folder was copied into the destination.
    Success,
    /// The copy was attempted and failed.
    Error,
    /// The destination already had a folder of that name; nothing was copied.
    FolderAlreadyExists,
    /// The origin folder had no destination to migrate into.
    NoMatch,
}

impl CopyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyStatus::Success => "Success",
            CopyStatus::Error => "Error",
            CopyStatus::FolderAlreadyExists => "FolderAlreadyExists",
            CopyStatus::NoMatch => "NoMatch",
        }
    }
}

impl fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The record of one attempted sub-folder copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyOutcome {
    /// The folder copied into, if there was one.
    pub destination: Option<FolderRef>,
    /// The folder that was (or would have been) migrated.
    pub migrated: Option<FolderInfo>,
    pub status: CopyStatus,
    pub details: String,
}

impl CopyOutcome {
    /// The origin folder had no destination.
    pub fn no_match(origin: &FolderRef) -> Self {
        Self {
            destination: None,
            migrated: None,
            status: CopyStatus::NoMatch,
            details: format!("No Match for Folder Named: {}", origin.name),
        }
    }

    /// `copied` is the metadata of the new folder the provider created.
    pub fn success(destination: &FolderRef, copied: FolderInfo) -> Self {
        Self {
            destination: Some(destination.clone()),
            migrated: Some(copied),
            status: CopyStatus::Success,
            details: String::new(),
        }
    }

    /// The destination already holds a folder named like `child`.
    pub fn already_exists(destination: &FolderRef, child: FolderInfo) -> Self {
        let details = format!(
            "Folder {} already exists in destination {}",
            child.name, destination.name
        );
        Self {
            destination: Some(destination.clone()),
            migrated: Some(child),
            status: CopyStatus::FolderAlreadyExists,
            details,
        }
    }

    /// Copying `child` into `destination` failed.
    pub fn error(destination: &FolderRef, child: FolderInfo, error: &RemoteError) -> Self {
        Self {
            destination: Some(destination.clone()),
            migrated: Some(child),
            status: CopyStatus::Error,
            details: format!("Error: {}", error),
        }
    }

    /// The seven columns after the origin pair.
    fn csv_fields(&self) -> [String; 7] {
        let (destination_name, destination_id) = match &self.destination {
            Some(d) => (d.name.clone(), d.id.clone()),
            None => (EMPTY_VALUE.to_string(), EMPTY_VALUE.to_string()),
        };
        let (migrated_name, migrated_id, migrated_size) = match &self.migrated {
            Some(m) => (m.name.clone(), m.id.clone(), m.size.to_string()),
            None => (
                EMPTY_VALUE.to_string(),
                EMPTY_VALUE.to_string(),
                EMPTY_SIZE.to_string(),
            ),
        };

        [
            destination_name,
            destination_id,
            migrated_name,
            migrated_id,
            migrated_size,
            self.status.to_string(),
            self.details.clone(),
        ]
    }
}

/// All outcomes for one origin folder, in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationResult {
    origin: FolderRef,
    outcomes: Vec<CopyOutcome>,
}

impl MigrationResult {
    /// Start an empty result for `origin`.
    pub fn new(origin: FolderRef) -> Self {
        Self {
            origin,
            outcomes: Vec::new(),
        }
    }

    pub fn origin(&self) -> &FolderRef {
        &self.origin
    }

    pub fn outcomes(&self) -> &[CopyOutcome] {
        &self.outcomes
    }

    /// Append an outcome.
    pub fn push(&mut self, outcome: CopyOutcome) {
        self.outcomes.push(outcome);
    }

    /// Number of outcomes with the given status.
    pub fn count(&self, status: CopyStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Flatten to CSV rows: one per outcome, each starting with the origin
    /// folder's name and id.
    pub fn csv_rows(&self) -> Vec<[String; 9]> {
        self.outcomes
            .iter()
            .map(|outcome| {
                let [a, b, c, d, e, f, g] = outcome.csv_fields();
                [
                    self.origin.name.clone(),
                    self.origin.id.clone(),
                    a,
                    b,
                    c,
                    d,
                    e,
                    f,
                    g,
                ]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> FolderRef {
        FolderRef::new("100", "Beta")
    }

    fn destination() -> FolderRef {
        FolderRef::new("200", "Beta Inc")
    }

    #[test]
    fn test_no_match_row() {
        let mut result = MigrationResult::new(origin());
        result.push(CopyOutcome::no_match(&origin()));

        let rows = result.csv_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0],
            [
                "Beta",
                "100",
                " ",
                " ",
                " ",
                " ",
                "0",
                "NoMatch",
                "No Match for Folder Named: Beta"
            ]
            .map(String::from)
        );
    }

    #[test]
    fn test_rows_share_origin_columns() {
        let mut result = MigrationResult::new(origin());
        result.push(CopyOutcome::success(
            &destination(),
            FolderInfo::new("301", "2019", 4096),
        ));
        result.push(CopyOutcome::already_exists(
            &destination(),
            FolderInfo::new("302", "2020", 10),
        ));
        result.push(CopyOutcome::error(
            &destination(),
            FolderInfo::new("303", "2021", 0),
            &RemoteError::Other("boom".to_string()),
        ));

        let rows = result.csv_rows();
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert_eq!(row[0], "Beta");
            assert_eq!(row[1], "100");
            assert_eq!(row[2], "Beta Inc");
            assert_eq!(row[3], "200");
        }

        assert_eq!(rows[0][4..].to_vec(), ["2019", "301", "4096", "Success", ""]);
        assert_eq!(rows[1][7], "FolderAlreadyExists");
        assert_eq!(rows[1][8], "Folder 2020 already exists in destination Beta Inc");
        assert_eq!(rows[2][7], "Error");
        assert_eq!(rows[2][8], "Error: boom");
    }

    #[test]
    fn test_empty_result_has_no_rows() {
        let result = MigrationResult::new(origin());
        assert!(result.csv_rows().is_empty());
    }

    #[test]
    fn test_count_by_status() {
        let mut result = MigrationResult::new(origin());
        result.push(CopyOutcome::success(&destination(), FolderInfo::new("1", "a", 0)));
        result.push(CopyOutcome::success(&destination(), FolderInfo::new("2", "b", 0)));
        result.push(CopyOutcome::already_exists(&destination(), FolderInfo::new("3", "c", 0)));

        assert_eq!(result.count(CopyStatus::Success), 2);
        assert_eq!(result.count(CopyStatus::FolderAlreadyExists), 1);
        assert_eq!(result.count(CopyStatus::Error), 0);
    }
}
