// crates/hearth-trust/src/cascade.rs
//
// Revocation cascade coordinator.
//
// Valid transitions for a single revocation request:
//   Pending -> Applied -> Done
//   Pending -> Rejected
//
// After the vouch is revoked, every user downstream of the vouchee (following
// active vouches, transitively) is force-recomputed once over a single
// post-revocation snapshot. Removing an edge can only lower or keep each
// downstream score, so the unconditional recompute is always correct.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hearth_core::config::TrustConfig;
use hearth_core::error::HearthError;
use hearth_core::traits::TrustStore;

use crate::graph::TrustGraph;
use crate::score::ScoreCalculator;

/// Lifecycle of a revocation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevocationState {
    /// Received, not yet validated.
    Pending,
    /// The vouch has been revoked in the ledger.
    Applied,
    /// Downstream scores have been recomputed.
    Done,
    /// Unknown vouch, or already revoked.
    Rejected,
}

impl fmt::Display for RevocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevocationState::Pending => write!(f, "Pending"),
            RevocationState::Applied => write!(f, "Applied"),
            RevocationState::Done => write!(f, "Done"),
            RevocationState::Rejected => write!(f, "Rejected"),
        }
    }
}

/// State machine tracking one revocation request.
#[derive(Debug)]
pub struct RevocationRequest {
    pub vouch_id: Uuid,
    pub state: RevocationState,
}

impl RevocationRequest {
    pub fn new(vouch_id: Uuid) -> Self {
        Self {
            vouch_id,
            state: RevocationState::Pending,
        }
    }

    /// Attempt to move to `next`. Fails with `InvalidState` on an illegal transition.
    pub fn transition(&mut self, next: RevocationState) -> Result<(), HearthError> {
        let valid = matches!(
            (self.state, next),
            (RevocationState::Pending, RevocationState::Applied)
                | (RevocationState::Pending, RevocationState::Rejected)
                | (RevocationState::Applied, RevocationState::Done)
        );
        if !valid {
            return Err(HearthError::InvalidState(format!(
                "Invalid revocation transition for {}: {} -> {}",
                self.vouch_id, self.state, next
            )));
        }
        tracing::debug!("Revocation {}: {} -> {}", self.vouch_id, self.state, next);
        self.state = next;
        Ok(())
    }
}

/// Outcome of a completed revocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CascadeReport {
    pub vouch_id: Uuid,
    pub voucher_id: String,
    pub vouchee_id: String,
    pub state: RevocationState,
    /// Every user whose score was recomputed, the vouchee first.
    pub affected_users: Vec<String>,
    /// True when the visit budget stopped the cascade early. Users beyond the
    /// budget keep stale cached scores until their next forced recompute or
    /// cache expiry.
    pub truncated: bool,
}

/// Orchestrates revocation and the downstream recomputation it triggers.
#[derive(Clone)]
pub struct CascadeCoordinator {
    store: Arc<dyn TrustStore>,
    config: Arc<TrustConfig>,
    scores: ScoreCalculator,
}

impl CascadeCoordinator {
    pub fn new(store: Arc<dyn TrustStore>, config: Arc<TrustConfig>, scores: ScoreCalculator) -> Self {
        Self {
            store,
            config,
            scores,
        }
    }

    /// Revoke a vouch and recompute everyone downstream of its vouchee.
    ///
    /// # Errors
    /// `NotFound` for an unknown vouch, `AlreadyRevoked` on a double revoke.
    pub async fn revoke_vouch_with_cascade(
        &self,
        vouch_id: &Uuid,
        reason: &str,
    ) -> Result<CascadeReport, HearthError> {
        let mut request = RevocationRequest::new(*vouch_id);

        let vouch = match self.store.get_vouch(vouch_id).await? {
            Some(v) => v,
            None => {
                request.transition(RevocationState::Rejected)?;
                return Err(HearthError::NotFound(format!("Vouch {}", vouch_id)));
            }
        };
        if vouch.is_revoked() {
            request.transition(RevocationState::Rejected)?;
            return Err(HearthError::AlreadyRevoked(format!(
                "Vouch {} from {} to {}",
                vouch_id, vouch.voucher_id, vouch.vouchee_id
            )));
        }

        self.store.revoke_vouch(vouch_id, reason).await?;
        request.transition(RevocationState::Applied)?;

        let graph = self.scores.snapshot().await?;
        let (affected_users, truncated) = self.cascade_from(&vouch.vouchee_id, &graph).await?;
        request.transition(RevocationState::Done)?;

        if truncated {
            tracing::warn!(
                "Revocation cascade for {} stopped at budget of {} users",
                vouch_id,
                affected_users.len()
            );
        }
        tracing::info!(
            "Revoked vouch {} ({} -> {}); recomputed {} users",
            vouch_id,
            vouch.voucher_id,
            vouch.vouchee_id,
            affected_users.len()
        );

        Ok(CascadeReport {
            vouch_id: *vouch_id,
            voucher_id: vouch.voucher_id,
            vouchee_id: vouch.vouchee_id,
            state: request.state,
            affected_users,
            truncated,
        })
    }

    /// Force-recompute `start` and everyone reachable from it via active vouches.
    ///
    /// Each user is recomputed at most once. Returns the recomputed users in
    /// visit order and whether the visit budget was exhausted.
    async fn cascade_from(
        &self,
        start: &str,
        graph: &TrustGraph,
    ) -> Result<(Vec<String>, bool), HearthError> {
        let budget = self.config.max_cascade_nodes;

        self.scores.compute_with_snapshot(start, graph).await?;
        let mut affected = vec![start.to_string()];

        let Some(start_idx) = graph.node(start) else {
            return Ok((affected, false));
        };

        let mut visited = vec![false; graph.node_count()];
        visited[start_idx as usize] = true;
        let mut queue = VecDeque::from([start_idx]);

        while let Some(current) = queue.pop_front() {
            for &next in graph.successors(current) {
                if visited[next as usize] {
                    continue;
                }
                if budget.is_some_and(|max| affected.len() >= max) {
                    return Ok((affected, true));
                }
                visited[next as usize] = true;

                let user_id = graph.name(next);
                self.scores.compute_with_snapshot(user_id, graph).await?;
                affected.push(user_id.to_string());
                queue.push_back(next);
            }
        }

        Ok((affected, false))
    }
}
