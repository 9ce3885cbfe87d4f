//! CLI subcommands.

pub mod build;
pub mod dev;
pub mod generate;
pub mod init;
pub mod serve;
pub mod types;
