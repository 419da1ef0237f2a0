// crates/hearth-store/src/rocks.rs
//
// RocksDB-backed persistent storage for vouches, genesis nodes, and the trust
// score cache.
//
// Key format:
//   - Vouch:     `vouch:{uuid}` -> JSON StoredVouch
//   - Pair:      `pair:{voucher}\x1f{vouchee}` -> uuid (uniqueness index)
//   - Outgoing:  `out:{voucher}\x1f{uuid}` -> empty value (index only)
//   - Incoming:  `in:{vouchee}\x1f{uuid}` -> empty value (index only)
//   - Score:     `score:{user}` -> JSON StoredTrustScore
//   - Genesis:   `genesis:{user}` -> JSON GenesisNode
//
// The unit separator keeps user ids containing ':' from colliding. Ids that
// contain the separator itself are rejected before any edge is written.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocksdb::{DBWithThreadMode, MultiThreaded, Options, WriteBatch};
use uuid::Uuid;

use hearth_core::error::HearthError;
use hearth_core::genesis::GenesisNode;
use hearth_core::traits::{GenesisRegistry, TrustScoreCache, VouchLedger};
use hearth_core::trust::TrustScore;
use hearth_core::vouch::Vouch;

use crate::records::{StoredTrustScore, StoredVouch};

const SEP: char = '\x1f';

/// RocksDB wrapper implementing the ledger, registry, and cache traits.
pub struct RocksStore {
    db: DBWithThreadMode<MultiThreaded>,
    /// Serializes read-check-write sequences (pair uniqueness, revocation,
    /// genesis insertion) so they are atomic with respect to each other.
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for RocksStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksStore")
            .field("path", &self.db.path())
            .finish()
    }
}

impl RocksStore {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str) -> Result<Self, HearthError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path).map_err(|e| {
            HearthError::StorageUnavailable(format!("Failed to open RocksDB at {}: {}", path, e))
        })?;

        tracing::debug!("Opened vouch store at {}", path);
        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    fn vouch_key(id: &Uuid) -> Vec<u8> {
        format!("vouch:{}", id).into_bytes()
    }

    fn pair_key(voucher_id: &str, vouchee_id: &str) -> Vec<u8> {
        format!("pair:{}{}{}", voucher_id, SEP, vouchee_id).into_bytes()
    }

    fn out_prefix(voucher_id: &str) -> String {
        format!("out:{}{}", voucher_id, SEP)
    }

    fn in_prefix(vouchee_id: &str) -> String {
        format!("in:{}{}", vouchee_id, SEP)
    }

    fn score_key(user_id: &str) -> Vec<u8> {
        format!("score:{}", user_id).into_bytes()
    }

    fn genesis_key(user_id: &str) -> Vec<u8> {
        format!("genesis:{}", user_id).into_bytes()
    }

    fn check_user_id(user_id: &str) -> Result<(), HearthError> {
        if user_id.contains(SEP) {
            return Err(HearthError::InvalidUserId(format!(
                "{:?} contains the reserved key separator",
                user_id
            )));
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, HearthError> {
        self.write_lock
            .lock()
            .map_err(|e| HearthError::StorageUnavailable(format!("Mutex poisoned: {}", e)))
    }

    /// Get raw bytes from RocksDB, mapping errors to StorageUnavailable.
    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, HearthError> {
        self.db
            .get(key)
            .map_err(|e| HearthError::StorageUnavailable(format!("RocksDB get failed: {}", e)))
    }

    fn put_raw(&self, key: &[u8], value: &[u8]) -> Result<(), HearthError> {
        self.db
            .put(key, value)
            .map_err(|e| HearthError::StorageUnavailable(format!("RocksDB put failed: {}", e)))
    }

    fn write_batch(&self, batch: WriteBatch) -> Result<(), HearthError> {
        self.db
            .write(batch)
            .map_err(|e| HearthError::StorageUnavailable(format!("RocksDB write failed: {}", e)))
    }

    /// Keys under `prefix`, with the prefix stripped.
    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, HearthError> {
        let prefix = prefix.as_bytes();
        let mut out = Vec::new();
        for item in self.db.prefix_iterator(prefix) {
            let (key, value) = item.map_err(|e| {
                HearthError::StorageUnavailable(format!("RocksDB iteration error: {}", e))
            })?;
            // No prefix extractor is configured, so stop once the prefix no longer matches.
            if !key.starts_with(prefix) {
                break;
            }
            let suffix = String::from_utf8_lossy(&key[prefix.len()..]).into_owned();
            out.push((suffix, value.to_vec()));
        }
        Ok(out)
    }

    /// Synchronous vouch lookup for internal callers.
    pub fn get_vouch_sync(&self, id: &Uuid) -> Result<Option<Vouch>, HearthError> {
        match self.get_raw(&Self::vouch_key(id))? {
            Some(bytes) => {
                let row: StoredVouch = serde_json::from_slice(&bytes)?;
                Ok(Some(Vouch::try_from(row)?))
            }
            None => Ok(None),
        }
    }

    fn put_vouch(&self, batch: &mut WriteBatch, vouch: &Vouch) -> Result<(), HearthError> {
        let json = serde_json::to_vec(&StoredVouch::from(vouch))?;
        batch.put(Self::vouch_key(&vouch.id), json);
        Ok(())
    }

    /// Load every vouch referenced by an edge index prefix.
    fn vouches_by_index(&self, prefix: &str) -> Result<Vec<Vouch>, HearthError> {
        let mut vouches = Vec::new();
        for (suffix, _) in self.scan_prefix(prefix)? {
            let id = Uuid::parse_str(&suffix).map_err(|e| {
                HearthError::Deserialization(format!("Bad vouch id in index '{}': {}", suffix, e))
            })?;
            match self.get_vouch_sync(&id)? {
                Some(v) => vouches.push(v),
                None => tracing::warn!("Edge index references missing vouch {}", id),
            }
        }
        Ok(vouches)
    }

    /// Store a fully-formed vouch, bypassing creation timestamps.
    ///
    /// Used to import historical records. Fails with `VouchConflict` if the
    /// pair already exists.
    pub fn import_vouch(&self, vouch: &Vouch) -> Result<(), HearthError> {
        Self::check_user_id(&vouch.voucher_id)?;
        Self::check_user_id(&vouch.vouchee_id)?;
        let _guard = self.lock()?;
        if self
            .get_raw(&Self::pair_key(&vouch.voucher_id, &vouch.vouchee_id))?
            .is_some()
        {
            return Err(HearthError::VouchConflict(format!(
                "A vouch from {} to {} already exists",
                vouch.voucher_id, vouch.vouchee_id
            )));
        }
        self.insert_new_vouch(vouch)
    }

    fn insert_new_vouch(&self, vouch: &Vouch) -> Result<(), HearthError> {
        let mut batch = WriteBatch::default();
        self.put_vouch(&mut batch, vouch)?;
        batch.put(
            Self::pair_key(&vouch.voucher_id, &vouch.vouchee_id),
            vouch.id.to_string().as_bytes(),
        );
        batch.put(
            format!("{}{}", Self::out_prefix(&vouch.voucher_id), vouch.id).into_bytes(),
            b"",
        );
        batch.put(
            format!("{}{}", Self::in_prefix(&vouch.vouchee_id), vouch.id).into_bytes(),
            b"",
        );
        self.write_batch(batch)
    }
}

#[async_trait]
impl VouchLedger for RocksStore {
    async fn create_vouch(
        &self,
        voucher_id: &str,
        vouchee_id: &str,
        context: &str,
    ) -> Result<Vouch, HearthError> {
        Self::check_user_id(voucher_id)?;
        Self::check_user_id(vouchee_id)?;
        let _guard = self.lock()?;

        if let Some(id_bytes) = self.get_raw(&Self::pair_key(voucher_id, vouchee_id))? {
            let id_str = String::from_utf8_lossy(&id_bytes);
            let id = Uuid::parse_str(&id_str).map_err(|e| {
                HearthError::Deserialization(format!("Bad vouch id in pair index: {}", e))
            })?;
            let existing = self.get_vouch_sync(&id)?.ok_or_else(|| {
                HearthError::StorageUnavailable(format!("Pair index points at missing vouch {}", id))
            })?;
            if existing.is_active() {
                return Ok(existing);
            }
            return Err(HearthError::VouchConflict(format!(
                "Vouch from {} to {} was revoked and cannot be recreated",
                voucher_id, vouchee_id
            )));
        }

        let vouch = Vouch::new(voucher_id, vouchee_id, context);
        self.insert_new_vouch(&vouch)?;
        Ok(vouch)
    }

    async fn get_vouch(&self, id: &Uuid) -> Result<Option<Vouch>, HearthError> {
        self.get_vouch_sync(id)
    }

    async fn revoke_vouch(&self, id: &Uuid, reason: &str) -> Result<(), HearthError> {
        let _guard = self.lock()?;
        let mut vouch = self
            .get_vouch_sync(id)?
            .ok_or_else(|| HearthError::NotFound(format!("Vouch {}", id)))?;
        vouch.mark_revoked(reason, Utc::now());
        let mut batch = WriteBatch::default();
        self.put_vouch(&mut batch, &vouch)?;
        self.write_batch(batch)
    }

    async fn get_vouches_for_user(
        &self,
        user_id: &str,
        include_revoked: bool,
    ) -> Result<Vec<Vouch>, HearthError> {
        let mut vouches = self.vouches_by_index(&Self::in_prefix(user_id))?;
        if !include_revoked {
            vouches.retain(Vouch::is_active);
        }
        Ok(vouches)
    }

    async fn get_vouches_by_user(&self, user_id: &str) -> Result<Vec<Vouch>, HearthError> {
        self.vouches_by_index(&Self::out_prefix(user_id))
    }

    async fn get_vouches_since(
        &self,
        user_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Vouch>, HearthError> {
        let mut vouches = self.vouches_by_index(&Self::out_prefix(user_id))?;
        vouches.retain(|v| v.created_at >= cutoff);
        Ok(vouches)
    }

    async fn active_vouches(&self) -> Result<Vec<Vouch>, HearthError> {
        let mut vouches = Vec::new();
        for (_, bytes) in self.scan_prefix("vouch:")? {
            let row: StoredVouch = serde_json::from_slice(&bytes)?;
            let vouch = Vouch::try_from(row)?;
            if vouch.is_active() {
                vouches.push(vouch);
            }
        }
        Ok(vouches)
    }
}

#[async_trait]
impl GenesisRegistry for RocksStore {
    async fn add_genesis_node(
        &self,
        user_id: &str,
        added_by: Option<&str>,
        notes: Option<&str>,
    ) -> Result<bool, HearthError> {
        let _guard = self.lock()?;
        let key = Self::genesis_key(user_id);
        if self.get_raw(&key)?.is_some() {
            return Ok(false);
        }
        let node = GenesisNode::new(user_id, added_by, notes);
        self.put_raw(&key, &serde_json::to_vec(&node)?)?;
        Ok(true)
    }

    async fn is_genesis_node(&self, user_id: &str) -> Result<bool, HearthError> {
        Ok(self.get_raw(&Self::genesis_key(user_id))?.is_some())
    }

    async fn get_genesis_node(&self, user_id: &str) -> Result<Option<GenesisNode>, HearthError> {
        match self.get_raw(&Self::genesis_key(user_id))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn list_genesis_nodes(&self) -> Result<BTreeSet<String>, HearthError> {
        Ok(self
            .scan_prefix("genesis:")?
            .into_iter()
            .map(|(user_id, _)| user_id)
            .collect())
    }
}

#[async_trait]
impl TrustScoreCache for RocksStore {
    async fn get_trust_score(&self, user_id: &str) -> Result<Option<TrustScore>, HearthError> {
        match self.get_raw(&Self::score_key(user_id))? {
            Some(bytes) => {
                let row: StoredTrustScore = serde_json::from_slice(&bytes)?;
                Ok(Some(TrustScore::try_from(row)?))
            }
            None => Ok(None),
        }
    }

    async fn upsert_trust_score(&self, score: &TrustScore) -> Result<(), HearthError> {
        let json = serde_json::to_vec(&StoredTrustScore::from(score))?;
        self.put_raw(&Self::score_key(&score.user_id), &json)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn temp_db_path(label: &str) -> String {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("hearth_test_{}_{}", label, Uuid::now_v7()));
        path.to_string_lossy().to_string()
    }

    #[tokio::test]
    async fn create_and_reload_vouch() {
        let path = temp_db_path("reload");
        let id = {
            let store = RocksStore::open(&path).unwrap();
            store.create_vouch("g", "a", "garden").await.unwrap().id
        };
        let store = RocksStore::open(&path).unwrap();
        let v = store.get_vouch(&id).await.unwrap().unwrap();
        assert_eq!(v.voucher_id, "g");
        assert_eq!(v.context, "garden");
        std::fs::remove_dir_all(&path).ok();
    }

    #[tokio::test]
    async fn duplicate_and_revoked_pairs() {
        let path = temp_db_path("pairs");
        let store = RocksStore::open(&path).unwrap();
        let first = store.create_vouch("g", "a", "").await.unwrap();
        let again = store.create_vouch("g", "a", "").await.unwrap();
        assert_eq!(first.id, again.id);

        store.revoke_vouch(&first.id, "moved").await.unwrap();
        let err = store.create_vouch("g", "a", "").await.unwrap_err();
        assert!(matches!(err, HearthError::VouchConflict(_)));
        std::fs::remove_dir_all(&path).ok();
    }

    #[tokio::test]
    async fn edge_indexes_do_not_collide_on_prefix() {
        let path = temp_db_path("prefix");
        let store = RocksStore::open(&path).unwrap();
        store.create_vouch("al", "x", "").await.unwrap();
        store.create_vouch("alice", "y", "").await.unwrap();
        store.create_vouch("alice", "x", "").await.unwrap();

        assert_eq!(store.get_vouches_by_user("al").await.unwrap().len(), 1);
        assert_eq!(store.get_vouches_by_user("alice").await.unwrap().len(), 2);
        assert_eq!(store.get_vouches_for_user("x", false).await.unwrap().len(), 2);
        std::fs::remove_dir_all(&path).ok();
    }

    #[tokio::test]
    async fn separator_in_user_id_rejected() {
        let path = temp_db_path("separator");
        let store = RocksStore::open(&path).unwrap();
        let err = store.create_vouch("a", "b\x1fc", "").await.unwrap_err();
        assert!(matches!(err, HearthError::InvalidUserId(_)));
        let err = store.create_vouch("a\x1fb", "c", "").await.unwrap_err();
        assert!(matches!(err, HearthError::InvalidUserId(_)));
        let err = store.import_vouch(&Vouch::new("a\x1fb", "c", "")).unwrap_err();
        assert!(matches!(err, HearthError::InvalidUserId(_)));

        // Nothing was written for either id.
        assert!(store.get_vouches_by_user("a").await.unwrap().is_empty());
        assert!(store.active_vouches().await.unwrap().is_empty());
        std::fs::remove_dir_all(&path).ok();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_converge_on_one_vouch() {
        let path = temp_db_path("concurrent");
        let store = Arc::new(RocksStore::open(&path).unwrap());
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .create_vouch("g", "a", &format!("attempt {}", i))
                    .await
                    .unwrap()
                    .id
            }));
        }
        let mut ids = BTreeSet::new();
        for h in handles {
            ids.insert(h.await.unwrap());
        }
        assert_eq!(ids.len(), 1);
        assert_eq!(store.active_vouches().await.unwrap().len(), 1);
        assert_eq!(store.get_vouches_by_user("g").await.unwrap().len(), 1);
        assert_eq!(store.get_vouches_for_user("a", true).await.unwrap().len(), 1);
        drop(store);
        std::fs::remove_dir_all(&path).ok();
    }

    #[tokio::test]
    async fn revoked_vouches_filtered_from_snapshot() {
        let path = temp_db_path("snapshot");
        let store = RocksStore::open(&path).unwrap();
        let ga = store.create_vouch("g", "a", "").await.unwrap();
        store.create_vouch("a", "b", "").await.unwrap();
        store.revoke_vouch(&ga.id, "").await.unwrap();

        let active = store.active_vouches().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].voucher_id, "a");
        let incoming = store.get_vouches_for_user("a", true).await.unwrap();
        assert_eq!(incoming.len(), 1);
        assert!(incoming[0].is_revoked());
        std::fs::remove_dir_all(&path).ok();
    }

    #[tokio::test]
    async fn genesis_and_scores_persist() {
        let path = temp_db_path("genesis");
        let store = RocksStore::open(&path).unwrap();
        assert!(store.add_genesis_node("g", None, None).await.unwrap());
        assert!(!store.add_genesis_node("g", None, None).await.unwrap());
        assert!(store.add_genesis_node("h", Some("g"), Some("second")).await.unwrap());
        let roots = store.list_genesis_nodes().await.unwrap();
        assert_eq!(roots.into_iter().collect::<Vec<_>>(), vec!["g", "h"]);

        let score = TrustScore::genesis("g", 2, 1);
        store.upsert_trust_score(&score).await.unwrap();
        assert_eq!(store.get_trust_score("g").await.unwrap(), Some(score));
        assert!(store.get_trust_score("nobody").await.unwrap().is_none());
        std::fs::remove_dir_all(&path).ok();
    }

    #[tokio::test]
    async fn corrupted_status_surfaces_deserialization_error() {
        let path = temp_db_path("corrupt");
        let store = RocksStore::open(&path).unwrap();
        let v = store.create_vouch("g", "a", "").await.unwrap();
        let mut row = StoredVouch::from(&v);
        row.status = "paused".to_string();
        store
            .put_raw(&RocksStore::vouch_key(&v.id), &serde_json::to_vec(&row).unwrap())
            .unwrap();
        let err = store.get_vouch(&v.id).await.unwrap_err();
        assert!(matches!(err, HearthError::Deserialization(_)));
        std::fs::remove_dir_all(&path).ok();
    }
}
