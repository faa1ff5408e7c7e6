//! Folder migration: matching origin folders to destinations, copying their
//! sub-folders, and recording an outcome for each one.

mod error;
mod folder_index;
mod mapping_file;
mod migration_unit;
mod result;
mod run_migration;

pub use error::{MappingError, MigrateError, Result, UnitError};
pub use folder_index::{build_folder_index, FolderIndex};
pub use mapping_file::{parse_mappings, read_mapping_file, FolderMapping, DESTINATION_ID_LEN};
pub use migration_unit::MigrationUnit;
pub use result::{CopyOutcome, CopyStatus, MigrationResult, EMPTY_VALUE, MIGRATION_LOG_COLUMNS};
pub use run_migration::{
    plan_migration, run_migration, MigrationPlan, NameMatching, RunMigrationOptions, RunSummary,
    UnresolvedMapping,
};
