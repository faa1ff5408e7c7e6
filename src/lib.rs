//! boxmigrate-rs - Copy account folders between Box folder trees, logging
//! every outcome to CSV.

pub mod app;
pub mod cli;
pub mod config;
pub mod migrate;
pub mod remote;
pub mod report;

pub use migrate::{
    build_folder_index, plan_migration, run_migration, CopyOutcome, CopyStatus, MigrationResult,
    MigrationUnit, RunMigrationOptions, RunSummary, UnitError,
};
pub use remote::{BoxClient, FolderList, MemoryClient, RemoteClient, RemoteError};
pub use report::MigrationLog;
