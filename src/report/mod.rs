//! CSV output: the migration log and folder contents lists.

mod contents_list;
mod error;
mod log_file;
mod migration_log;

pub use contents_list::{write_contents_list, CONTENTS_LIST_COLUMNS};
pub use error::{ReportError, Result};
pub use log_file::{create_log_file, unique_log_path};
pub use migration_log::MigrationLog;
