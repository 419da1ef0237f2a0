// crates/hearth-core/src/lib.rs
//
// hearth-core: Core types, configuration, errors, and storage traits for the
// Hearth web-of-trust engine.
//
// This is the leaf crate that all other crates in the workspace depend on.

pub mod config;
pub mod error;
pub mod genesis;
pub mod traits;
pub mod trust;
pub mod vouch;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use hearth_core::Vouch;`

pub use config::{actions, TrustConfig};
pub use error::HearthError;
pub use genesis::GenesisNode;
pub use traits::{GenesisRegistry, RelationshipHistory, TrustScoreCache, TrustStore, VouchLedger};
pub use trust::{ThresholdCheck, TrustScore, VouchChain, VouchEligibility};
pub use vouch::{Vouch, VouchStatus};
