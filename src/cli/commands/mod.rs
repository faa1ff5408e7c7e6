//! Subcommand implementations.

pub mod list;
pub mod migrate;
pub mod plan;
