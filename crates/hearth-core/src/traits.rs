// crates/hearth-core/src/traits.rs

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::HearthError;
use crate::genesis::GenesisNode;
use crate::trust::TrustScore;
use crate::vouch::Vouch;

/// Durable store of directed trust assertions.
///
/// Implemented by hearth-store (in-memory and RocksDB backends).
#[async_trait]
pub trait VouchLedger: Send + Sync {
    /// Create a vouch from `voucher_id` to `vouchee_id`.
    ///
    /// The (voucher, vouchee) pair is unique for all time and the check must be
    /// atomic with the insert. If an active vouch for the pair exists it is
    /// returned unchanged; a revoked pair fails with `VouchConflict`.
    async fn create_vouch(
        &self,
        voucher_id: &str,
        vouchee_id: &str,
        context: &str,
    ) -> Result<Vouch, HearthError>;

    /// Retrieve a vouch by id.
    async fn get_vouch(&self, id: &Uuid) -> Result<Option<Vouch>, HearthError>;

    /// Mark a vouch revoked. Fails with `NotFound` for an unknown id.
    async fn revoke_vouch(&self, id: &Uuid, reason: &str) -> Result<(), HearthError>;

    /// Vouches received by `user_id`.
    async fn get_vouches_for_user(
        &self,
        user_id: &str,
        include_revoked: bool,
    ) -> Result<Vec<Vouch>, HearthError>;

    /// Vouches given by `user_id`, active and revoked.
    async fn get_vouches_by_user(&self, user_id: &str) -> Result<Vec<Vouch>, HearthError>;

    /// Vouches given by `user_id` created on or after `cutoff`.
    async fn get_vouches_since(
        &self,
        user_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Vouch>, HearthError>;

    /// Every active vouch in the ledger.
    async fn active_vouches(&self) -> Result<Vec<Vouch>, HearthError>;
}

/// The set of axiomatically trusted bootstrap identities.
#[async_trait]
pub trait GenesisRegistry: Send + Sync {
    /// Add a genesis node. Returns false if the user is already one.
    async fn add_genesis_node(
        &self,
        user_id: &str,
        added_by: Option<&str>,
        notes: Option<&str>,
    ) -> Result<bool, HearthError>;

    async fn is_genesis_node(&self, user_id: &str) -> Result<bool, HearthError>;

    async fn get_genesis_node(&self, user_id: &str) -> Result<Option<GenesisNode>, HearthError>;

    async fn list_genesis_nodes(&self) -> Result<BTreeSet<String>, HearthError>;
}

/// Cache of derived trust scores.
#[async_trait]
pub trait TrustScoreCache: Send + Sync {
    async fn get_trust_score(&self, user_id: &str) -> Result<Option<TrustScore>, HearthError>;

    /// Insert or unconditionally overwrite the cached score.
    async fn upsert_trust_score(&self, score: &TrustScore) -> Result<(), HearthError>;
}

/// Everything the trust engine needs from a storage backend.
pub trait TrustStore: VouchLedger + GenesisRegistry + TrustScoreCache {}

impl<T> TrustStore for T where T: VouchLedger + GenesisRegistry + TrustScoreCache {}

/// Source of interaction history between two users.
///
/// Supplied by a collaborator outside the engine; used to enforce the
/// minimum relationship duration before a vouch. When no provider is
/// configured the duration rule is not applied.
#[async_trait]
pub trait RelationshipHistory: Send + Sync {
    /// When `a` and `b` first interacted. None means they never have.
    async fn first_interaction(
        &self,
        a: &str,
        b: &str,
    ) -> Result<Option<DateTime<Utc>>, HearthError>;
}
