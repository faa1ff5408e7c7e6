use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::migrate::{MigrationResult, MIGRATION_LOG_COLUMNS};
use crate::report::error::Result;
use crate::report::log_file::create_log_file;

/// CSV sink for migration outcomes.
///
/// The header row is written on construction. Rows are buffered until
/// `flush`, which the orchestrator calls after each unit.
pub struct MigrationLog<W: Write> {
    writer: csv::Writer<W>,
    rows_written: usize,
}

impl MigrationLog<File> {
    /// Create a fresh log file in `dir`, never replacing an existing one.
    pub fn create(dir: &Path, base_name: &str) -> Result<(PathBuf, Self)> {
        let (path, file) = create_log_file(dir, base_name)?;
        let log = Self::new(file)?;
        Ok((path, log))
    }
}

impl<W: Write> MigrationLog<W> {
    /// Wrap a writer and emit the header row.
    pub fn new(inner: W) -> Result<Self> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(MIGRATION_LOG_COLUMNS)?;
        writer.flush()?;
        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Append one row per outcome in `result`.
    pub fn write_result(&mut self, result: &MigrationResult) -> Result<()> {
        for row in result.csv_rows() {
            self.writer.write_record(&row)?;
            self.rows_written += 1;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Data rows written so far, not counting the header.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| e.into_error().into())
    }
}
