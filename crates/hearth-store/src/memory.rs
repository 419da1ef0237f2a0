// crates/hearth-store/src/memory.rs
//
// In-memory store implementing the ledger, genesis registry, and score cache
// traits.
//
// All state lives behind a single RwLock, so the (voucher, vouchee) uniqueness
// check and the insert happen under one write guard.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use hearth_core::error::HearthError;
use hearth_core::genesis::GenesisNode;
use hearth_core::traits::{GenesisRegistry, TrustScoreCache, VouchLedger};
use hearth_core::trust::TrustScore;
use hearth_core::vouch::Vouch;

#[derive(Debug, Default)]
struct Inner {
    vouches: HashMap<Uuid, Vouch>,
    /// Vouch ids in insertion order.
    order: Vec<Uuid>,
    /// Uniqueness index: (voucher_id, vouchee_id) -> vouch id.
    pairs: HashMap<(String, String), Uuid>,
    scores: HashMap<String, TrustScore>,
    genesis: BTreeMap<String, GenesisNode>,
}

/// Volatile store backed by hash maps.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of vouch records, active and revoked.
    pub fn vouch_count(&self) -> Result<usize, HearthError> {
        Ok(self.read()?.vouches.len())
    }

    /// Insert a fully-formed vouch record, bypassing creation timestamps.
    ///
    /// Used to seed historical data (e.g. vouches older than the rate-limit
    /// window). Fails with `VouchConflict` if the pair already exists.
    pub fn insert_vouch(&self, vouch: Vouch) -> Result<(), HearthError> {
        let mut inner = self.write()?;
        let pair = (vouch.voucher_id.clone(), vouch.vouchee_id.clone());
        if inner.pairs.contains_key(&pair) {
            return Err(HearthError::VouchConflict(format!(
                "A vouch from {} to {} already exists",
                pair.0, pair.1
            )));
        }
        inner.pairs.insert(pair, vouch.id);
        inner.order.push(vouch.id);
        inner.vouches.insert(vouch.id, vouch);
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, HearthError> {
        self.inner
            .read()
            .map_err(|e| HearthError::StorageUnavailable(format!("RwLock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, HearthError> {
        self.inner
            .write()
            .map_err(|e| HearthError::StorageUnavailable(format!("RwLock poisoned: {}", e)))
    }

    fn collect<F>(&self, filter: F) -> Result<Vec<Vouch>, HearthError>
    where
        F: Fn(&Vouch) -> bool,
    {
        let inner = self.read()?;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.vouches.get(id))
            .filter(|v| filter(v))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl VouchLedger for InMemoryStore {
    async fn create_vouch(
        &self,
        voucher_id: &str,
        vouchee_id: &str,
        context: &str,
    ) -> Result<Vouch, HearthError> {
        let mut inner = self.write()?;
        let pair = (voucher_id.to_string(), vouchee_id.to_string());

        if let Some(existing_id) = inner.pairs.get(&pair) {
            let existing = inner.vouches.get(existing_id).ok_or_else(|| {
                HearthError::StorageUnavailable(format!(
                    "Pair index points at missing vouch {}",
                    existing_id
                ))
            })?;
            if existing.is_active() {
                return Ok(existing.clone());
            }
            return Err(HearthError::VouchConflict(format!(
                "Vouch from {} to {} was revoked and cannot be recreated",
                voucher_id, vouchee_id
            )));
        }

        let vouch = Vouch::new(voucher_id, vouchee_id, context);
        inner.pairs.insert(pair, vouch.id);
        inner.order.push(vouch.id);
        inner.vouches.insert(vouch.id, vouch.clone());
        Ok(vouch)
    }

    async fn get_vouch(&self, id: &Uuid) -> Result<Option<Vouch>, HearthError> {
        Ok(self.read()?.vouches.get(id).cloned())
    }

    async fn revoke_vouch(&self, id: &Uuid, reason: &str) -> Result<(), HearthError> {
        let mut inner = self.write()?;
        let vouch = inner
            .vouches
            .get_mut(id)
            .ok_or_else(|| HearthError::NotFound(format!("Vouch {}", id)))?;
        vouch.mark_revoked(reason, Utc::now());
        Ok(())
    }

    async fn get_vouches_for_user(
        &self,
        user_id: &str,
        include_revoked: bool,
    ) -> Result<Vec<Vouch>, HearthError> {
        self.collect(|v| v.vouchee_id == user_id && (include_revoked || v.is_active()))
    }

    async fn get_vouches_by_user(&self, user_id: &str) -> Result<Vec<Vouch>, HearthError> {
        self.collect(|v| v.voucher_id == user_id)
    }

    async fn get_vouches_since(
        &self,
        user_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Vouch>, HearthError> {
        self.collect(|v| v.voucher_id == user_id && v.created_at >= cutoff)
    }

    async fn active_vouches(&self) -> Result<Vec<Vouch>, HearthError> {
        self.collect(Vouch::is_active)
    }
}

#[async_trait]
impl GenesisRegistry for InMemoryStore {
    async fn add_genesis_node(
        &self,
        user_id: &str,
        added_by: Option<&str>,
        notes: Option<&str>,
    ) -> Result<bool, HearthError> {
        let mut inner = self.write()?;
        if inner.genesis.contains_key(user_id) {
            return Ok(false);
        }
        inner
            .genesis
            .insert(user_id.to_string(), GenesisNode::new(user_id, added_by, notes));
        Ok(true)
    }

    async fn is_genesis_node(&self, user_id: &str) -> Result<bool, HearthError> {
        Ok(self.read()?.genesis.contains_key(user_id))
    }

    async fn get_genesis_node(&self, user_id: &str) -> Result<Option<GenesisNode>, HearthError> {
        Ok(self.read()?.genesis.get(user_id).cloned())
    }

    async fn list_genesis_nodes(&self) -> Result<BTreeSet<String>, HearthError> {
        Ok(self.read()?.genesis.keys().cloned().collect())
    }
}

#[async_trait]
impl TrustScoreCache for InMemoryStore {
    async fn get_trust_score(&self, user_id: &str) -> Result<Option<TrustScore>, HearthError> {
        Ok(self.read()?.scores.get(user_id).cloned())
    }

    async fn upsert_trust_score(&self, score: &TrustScore) -> Result<(), HearthError> {
        self.write()?
            .scores
            .insert(score.user_id.clone(), score.clone());
        Ok(())
    }
}
