//! CLI subcommand implementations.

pub mod report;
pub mod stats;
pub mod status;
pub mod track;
