// crates/hearth-trust/src/engine.rs
//
// TrustEngine: the single surface collaborators (governance modules, steward
// gating, onboarding flows) call through.
//
// Wires one storage backend and one immutable TrustConfig into the score
// calculator, eligibility guard, and cascade coordinator.

use std::collections::BTreeSet;
use std::sync::Arc;

use uuid::Uuid;

use hearth_core::config::{actions, TrustConfig};
use hearth_core::error::HearthError;
use hearth_core::genesis::GenesisNode;
use hearth_core::traits::{RelationshipHistory, TrustStore};
use hearth_core::trust::{ThresholdCheck, TrustScore, VouchEligibility};
use hearth_core::vouch::Vouch;

use crate::cascade::{CascadeCoordinator, CascadeReport};
use crate::eligibility::EligibilityGuard;
use crate::score::ScoreCalculator;

/// Facade over the web-of-trust components.
#[derive(Clone)]
pub struct TrustEngine {
    store: Arc<dyn TrustStore>,
    config: Arc<TrustConfig>,
    scores: ScoreCalculator,
    guard: EligibilityGuard,
    cascade: CascadeCoordinator,
}

impl TrustEngine {
    /// Build an engine over `store`. The configuration is validated first.
    pub fn new(store: Arc<dyn TrustStore>, config: TrustConfig) -> Result<Self, HearthError> {
        config.validate()?;
        let config = Arc::new(config);
        let scores = ScoreCalculator::new(store.clone(), config.clone());
        let guard = EligibilityGuard::new(store.clone(), config.clone(), scores.clone());
        let cascade = CascadeCoordinator::new(store.clone(), config.clone(), scores.clone());
        Ok(Self {
            store,
            config,
            scores,
            guard,
            cascade,
        })
    }

    /// Enforce the minimum relationship duration using `history`.
    pub fn with_relationship_history(mut self, history: Arc<dyn RelationshipHistory>) -> Self {
        self.guard = self.guard.with_relationship_history(history);
        self
    }

    pub fn config(&self) -> &TrustConfig {
        &self.config
    }

    // ---------------------------------------------------------------
    // Scores
    // ---------------------------------------------------------------

    pub async fn compute_trust_score(
        &self,
        user_id: &str,
        force_recompute: bool,
    ) -> Result<TrustScore, HearthError> {
        self.scores.compute_trust_score(user_id, force_recompute).await
    }

    pub async fn check_trust_threshold(
        &self,
        user_id: &str,
        action: &str,
    ) -> Result<ThresholdCheck, HearthError> {
        self.guard.check_trust_threshold(user_id, action).await
    }

    /// Whether `user_id` meets the steward_actions threshold.
    pub async fn is_steward(&self, user_id: &str) -> Result<bool, HearthError> {
        Ok(self
            .check_trust_threshold(user_id, actions::STEWARD_ACTIONS)
            .await?
            .meets_threshold)
    }

    // ---------------------------------------------------------------
    // Vouches
    // ---------------------------------------------------------------

    pub async fn get_vouch_eligibility(
        &self,
        voucher_id: &str,
        vouchee_id: &str,
    ) -> Result<VouchEligibility, HearthError> {
        self.guard.get_vouch_eligibility(voucher_id, vouchee_id).await
    }

    /// Create a vouch after it passes the eligibility guard, then refresh the
    /// vouchee's cached score.
    ///
    /// # Errors
    /// `IneligibleVouch` carrying the guard's reason when a rule fails.
    pub async fn create_vouch(
        &self,
        voucher_id: &str,
        vouchee_id: &str,
        context: &str,
    ) -> Result<Vouch, HearthError> {
        let eligibility = self.guard.get_vouch_eligibility(voucher_id, vouchee_id).await?;
        if !eligibility.can_vouch {
            let reason = eligibility
                .reason
                .unwrap_or_else(|| "Vouch not permitted".to_string());
            return Err(HearthError::IneligibleVouch(reason));
        }

        let vouch = self.store.create_vouch(voucher_id, vouchee_id, context).await?;
        tracing::info!("{} vouched for {} ({})", voucher_id, vouchee_id, vouch.id);

        // A score cached before the vouch existed would otherwise be served
        // until it expires.
        self.scores.compute_trust_score(vouchee_id, true).await?;
        Ok(vouch)
    }

    pub async fn revoke_vouch_with_cascade(
        &self,
        vouch_id: &Uuid,
        reason: &str,
    ) -> Result<CascadeReport, HearthError> {
        self.cascade.revoke_vouch_with_cascade(vouch_id, reason).await
    }

    pub async fn vouches_given(&self, user_id: &str) -> Result<Vec<Vouch>, HearthError> {
        self.store.get_vouches_by_user(user_id).await
    }

    pub async fn vouches_received(
        &self,
        user_id: &str,
        include_revoked: bool,
    ) -> Result<Vec<Vouch>, HearthError> {
        self.store.get_vouches_for_user(user_id, include_revoked).await
    }

    // ---------------------------------------------------------------
    // Genesis
    // ---------------------------------------------------------------

    /// Register a genesis node without any authorization check.
    ///
    /// Returns false if the user already is one. A newly added node's cached
    /// score is refreshed immediately.
    pub async fn add_genesis_node(
        &self,
        user_id: &str,
        added_by: Option<&str>,
        notes: Option<&str>,
    ) -> Result<bool, HearthError> {
        let added = self.store.add_genesis_node(user_id, added_by, notes).await?;
        if added {
            tracing::info!("Added genesis node {}", user_id);
            self.scores.compute_trust_score(user_id, true).await?;
        }
        Ok(added)
    }

    /// Register a genesis node on behalf of `caller`.
    ///
    /// The first genesis node may be added by anyone; after that `caller` must
    /// already be a genesis node.
    pub async fn add_genesis_node_authorized(
        &self,
        caller: &str,
        user_id: &str,
        notes: Option<&str>,
    ) -> Result<bool, HearthError> {
        let existing = self.store.list_genesis_nodes().await?;
        if existing.is_empty() {
            return self.add_genesis_node(user_id, None, notes).await;
        }
        if !existing.contains(caller) {
            return Err(HearthError::Unauthorized(format!(
                "{} is not a genesis node and cannot add {}",
                caller, user_id
            )));
        }
        self.add_genesis_node(user_id, Some(caller), notes).await
    }

    pub async fn is_genesis_node(&self, user_id: &str) -> Result<bool, HearthError> {
        self.store.is_genesis_node(user_id).await
    }

    pub async fn get_genesis_node(&self, user_id: &str) -> Result<Option<GenesisNode>, HearthError> {
        self.store.get_genesis_node(user_id).await
    }

    pub async fn list_genesis_nodes(&self) -> Result<BTreeSet<String>, HearthError> {
        self.store.list_genesis_nodes().await
    }
}
