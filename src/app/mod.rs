//! Application-level utilities.

#[allow(clippy::module_inception)]
mod app;

pub use app::{App, AppContext, AppError, AppMigrationContext, Result};
