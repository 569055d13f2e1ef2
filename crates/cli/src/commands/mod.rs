//! Subcommand implementations.

pub mod geocode;
pub mod migrate;
