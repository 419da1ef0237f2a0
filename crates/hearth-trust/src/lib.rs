// crates/hearth-trust/src/lib.rs
//
// hearth-trust: The web-of-trust engine.
//
// Trust flows outward from a small set of genesis nodes along vouches,
// attenuating 20% per hop by default. A user's score is the best chain from
// any genesis root. Vouch creation is gated by an eligibility guard, and
// revoking a vouch cascades a recompute through everyone downstream.

pub mod cascade;
pub mod discovery;
pub mod eligibility;
pub mod engine;
pub mod graph;
pub mod score;

pub use cascade::{CascadeCoordinator, CascadeReport, RevocationRequest, RevocationState};
pub use discovery::discover_chains;
pub use eligibility::EligibilityGuard;
pub use engine::TrustEngine;
pub use graph::TrustGraph;
pub use score::{best_chain, chain_trust, ScoreCalculator};
