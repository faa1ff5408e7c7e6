use std::io::Write;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{error, info};

use crate::migrate::error::{MigrateError, Result};
use crate::migrate::folder_index::build_folder_index;
use crate::migrate::mapping_file::FolderMapping;
use crate::migrate::migration_unit::MigrationUnit;
use crate::migrate::result::{CopyStatus, MigrationResult};
use crate::remote::{FolderRef, RemoteClient, RemoteError};
use crate::report::MigrationLog;

/// Match origin folders to account folders by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMatching {
    /// Folder whose immediate sub-folders are migrated.
    pub origin_folder_id: String,
    /// Folder holding one destination folder per account.
    pub accounts_folder_id: String,
}

/// Where migration units come from.
#[derive(Debug, Clone, Default)]
pub struct RunMigrationOptions {
    pub name_matching: Option<NameMatching>,
    /// Explicit pairs, planned after the name-matched units.
    pub mappings: Vec<FolderMapping>,
}

/// A mapping whose folders could not be looked up.
#[derive(Debug, Clone, Serialize)]
pub struct UnresolvedMapping {
    pub mapping: FolderMapping,
    pub error: String,
}

/// The units a run would process, in processing order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationPlan {
    pub units: Vec<MigrationUnit>,
    pub unresolved: Vec<UnresolvedMapping>,
}

/// Totals for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub units_processed: usize,
    /// Units that stopped early; their outcomes so far are still counted.
    pub units_failed: usize,
    pub units_unresolved: usize,
    pub success: usize,
    pub errors: usize,
    pub already_exists: usize,
    pub no_match: usize,
    pub elapsed_ms: u64,
}

impl RunSummary {
    fn record(&mut self, result: &MigrationResult) {
        self.units_processed += 1;
        self.count_outcomes(result);
    }

    fn count_outcomes(&mut self, result: &MigrationResult) {
        self.success += result.count(CopyStatus::Success);
        self.errors += result.count(CopyStatus::Error);
        self.already_exists += result.count(CopyStatus::FolderAlreadyExists);
        self.no_match += result.count(CopyStatus::NoMatch);
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}

/// Build the list of units without changing anything on the provider.
///
/// Name matching indexes the accounts folder once and pairs each origin
/// sub-folder with the account folder of the same name, if any. Failing to
/// list either folder fails the plan. Mappings are resolved one at a time; a
/// mapping whose folders cannot be fetched is logged and set aside.
pub async fn plan_migration<C: RemoteClient>(
    client: &C,
    options: &RunMigrationOptions,
) -> Result<MigrationPlan> {
    let mut plan = MigrationPlan::default();

    if let Some(matching) = &options.name_matching {
        info!(
            origin_folder_id = %matching.origin_folder_id,
            accounts_folder_id = %matching.accounts_folder_id,
            "matching folders by name"
        );
        let accounts = build_folder_index(client, &matching.accounts_folder_id).await?;
        let mut origins = client.list_folder(&matching.origin_folder_id).await?;

        let mut matched = 0;
        while let Some(origin) = origins.next_folder().await? {
            let destination = accounts.get(&origin.name).cloned();
            matched += usize::from(destination.is_some());
            plan.units.push(MigrationUnit::new(origin.folder_ref(), destination));
        }
        info!(units = plan.units.len(), matched, "finished matching folders");
    }

    for mapping in &options.mappings {
        match resolve_mapping(client, mapping).await {
            Ok(unit) => plan.units.push(unit),
            Err(e) => {
                error!(
                    origin_id = %mapping.origin_id,
                    destination_id = mapping.destination_id.as_deref().unwrap_or(""),
                    error = %e,
                    "could not resolve folder mapping"
                );
                plan.unresolved.push(UnresolvedMapping {
                    mapping: mapping.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(plan)
}

async fn resolve_mapping<C: RemoteClient>(
    client: &C,
    mapping: &FolderMapping,
) -> std::result::Result<MigrationUnit, RemoteError> {
    let origin = client.get_folder_info(&mapping.origin_id).await?;
    let destination = match &mapping.destination_id {
        Some(id) => Some(client.get_folder_info(id).await?.folder_ref()),
        None => None,
    };
    Ok(MigrationUnit::new(origin.folder_ref(), destination))
}

/// Plan and run a migration, writing every outcome to `log`.
///
/// Units run one after another in plan order. The log is flushed after each
/// unit. A unit that fails to list its folders is logged and counted as
/// failed after the rows it produced are written; the remaining units still
/// run. Only a failure to plan or to write the log ends the run early.
pub async fn run_migration<C: RemoteClient, W: Write>(
    client: &C,
    options: &RunMigrationOptions,
    log: &mut MigrationLog<W>,
) -> Result<RunSummary> {
    let started = Instant::now();
    info!("starting folder migration");

    let plan = plan_migration(client, options).await?;
    let mut summary = RunSummary {
        units_unresolved: plan.unresolved.len(),
        ..RunSummary::default()
    };

    for unit in &plan.units {
        info!("{}", unit.describe());
        match unit.migrate(client).await {
            Ok(result) => {
                log.write_result(&result)?;
                log.flush()?;
                summary.record(&result);
            }
            Err(failure) => {
                log.write_result(&failure.result)?;
                log.flush()?;
                summary.count_outcomes(&failure.result);
                log_unit_failure(unit.origin(), &failure.source);
                summary.units_failed += 1;
            }
        }
    }

    let elapsed = started.elapsed();
    summary.elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    info!(
        elapsed_ms = summary.elapsed_ms,
        elapsed_minutes = elapsed.as_secs() / 60,
        units = summary.units_processed,
        failed = summary.units_failed,
        "folder migration finished"
    );

    Ok(summary)
}

fn log_unit_failure(origin: &FolderRef, e: &MigrateError) {
    match e {
        MigrateError::Remote(RemoteError::Api {
            status,
            code,
            message,
            request_id,
        }) => error!(
            origin = %origin.name,
            origin_id = %origin.id,
            status,
            code = %code,
            request_id = request_id.as_deref().unwrap_or(""),
            "unit failed: {}",
            message
        ),
        _ => error!(origin = %origin.name, origin_id = %origin.id, "unit failed: {}", e),
    }
}
