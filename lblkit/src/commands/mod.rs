//! CLI subcommands.

pub mod build;
pub mod check;
pub mod env;
pub mod rundirs;
pub mod setup;
pub mod tape3;
