// crates/hearth-trust/src/score.rs
//
// Score calculator: converts discovered chains into a single trust value and
// owns the trust score cache.
//
//   trust(chain) = attenuation ^ hops
//   computed_trust = max over chains, or 0.0 when there are none
//
// Genesis users bypass discovery with trust 1.0 at distance 0.

use std::sync::Arc;

use chrono::Utc;

use hearth_core::config::TrustConfig;
use hearth_core::error::HearthError;
use hearth_core::traits::TrustStore;
use hearth_core::trust::{TrustScore, VouchChain};

use crate::discovery::discover_chains;
use crate::graph::TrustGraph;

/// Trust carried by a single chain.
pub fn chain_trust(chain: &VouchChain, attenuation: f64) -> f64 {
    attenuation.powi(chain.hops() as i32)
}

/// The best (trust, hops) over a set of chains.
///
/// Chains are compared by computed trust, not hop count. On a tie the chain
/// with fewer hops wins, then the earliest discovered.
pub fn best_chain(chains: &[VouchChain], attenuation: f64) -> Option<(f64, u32)> {
    let mut best: Option<(f64, u32)> = None;
    for chain in chains {
        let trust = chain_trust(chain, attenuation);
        let hops = chain.hops();
        best = match best {
            Some((t, h)) if t > trust || (t == trust && h <= hops) => Some((t, h)),
            _ => Some((trust, hops)),
        };
    }
    best
}

/// Computes and caches trust scores.
#[derive(Clone)]
pub struct ScoreCalculator {
    store: Arc<dyn TrustStore>,
    config: Arc<TrustConfig>,
}

impl ScoreCalculator {
    pub fn new(store: Arc<dyn TrustStore>, config: Arc<TrustConfig>) -> Self {
        Self { store, config }
    }

    /// Take a read snapshot of the active vouch graph and genesis set.
    pub async fn snapshot(&self) -> Result<TrustGraph, HearthError> {
        let vouches = self.store.active_vouches().await?;
        let genesis = self.store.list_genesis_nodes().await?;
        Ok(TrustGraph::build(&vouches, &genesis))
    }

    /// Return the cached score if fresh, otherwise recompute and persist it.
    ///
    /// `force_recompute` skips the cache entirely.
    pub async fn compute_trust_score(
        &self,
        user_id: &str,
        force_recompute: bool,
    ) -> Result<TrustScore, HearthError> {
        if !force_recompute {
            if let Some(cached) = self.store.get_trust_score(user_id).await? {
                if cached.is_fresh(Utc::now(), self.config.cache_ttl()) {
                    tracing::debug!("Trust cache hit for {}", user_id);
                    return Ok(cached);
                }
            }
        }

        let graph = self.snapshot().await?;
        self.compute_with_snapshot(user_id, &graph).await
    }

    /// Recompute a user's score over an existing snapshot and upsert it.
    pub async fn compute_with_snapshot(
        &self,
        user_id: &str,
        graph: &TrustGraph,
    ) -> Result<TrustScore, HearthError> {
        let incoming = self.store.get_vouches_for_user(user_id, true).await?;
        let vouch_count = incoming.iter().filter(|v| v.is_active()).count() as u32;
        let revocation_count = incoming.len() as u32 - vouch_count;

        let score = if graph.is_genesis(user_id) {
            TrustScore::genesis(user_id, vouch_count, revocation_count)
        } else {
            let chains = discover_chains(graph, user_id, self.config.max_vouch_distance);
            let best = best_chain(&chains, self.config.attenuation);
            TrustScore {
                user_id: user_id.to_string(),
                computed_trust: best.map(|(t, _)| t).unwrap_or(0.0),
                vouch_chains: chains,
                best_chain_distance: best.map(|(_, h)| h),
                is_genesis: false,
                last_computed: Utc::now(),
                vouch_count,
                revocation_count,
            }
        };

        tracing::debug!(
            "Computed trust for {}: {:.4} (distance {:?}, {} chains)",
            user_id,
            score.computed_trust,
            score.best_chain_distance,
            score.vouch_chains.len()
        );

        self.store.upsert_trust_score(&score).await?;
        Ok(score)
    }

    /// Read the cached score without recomputing.
    pub async fn cached_trust_score(&self, user_id: &str) -> Result<Option<TrustScore>, HearthError> {
        self.store.get_trust_score(user_id).await
    }
}
