//! CLI subcommand implementations.

pub mod company;
pub mod entry;
pub mod project;
pub mod report;
pub mod status;
pub mod task;
pub mod user;
pub mod util;
