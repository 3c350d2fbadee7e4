// crates/hive-cli/src/commands/mod.rs
//
// Command module declarations for the Hive CLI.

pub mod schedule;
pub mod simulate;
