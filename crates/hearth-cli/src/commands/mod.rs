// crates/hearth-cli/src/commands/mod.rs
//
// Command module declarations for the hearth CLI.

pub mod check;
pub mod eligibility;
pub mod genesis;
pub mod revoke;
pub mod score;
pub mod vouch;
