// crates/hearth-trust/src/eligibility.rs
//
// Eligibility guard: the anti-abuse rules deciding whether a vouch may be
// created, and the threshold check every trust-gated action goes through.
//
// Rules, evaluated in order (first failure wins):
//   0. no self-vouching
//   1. voucher trust >= `vouch_others` threshold
//   2. fewer than `max_vouches_per_month` vouches in the trailing window
//   3. no existing vouch for the pair (active, or revoked and severed)
//   4. relationship at least `min_known_hours` old, when a history provider
//      is configured

use std::sync::Arc;

use chrono::Utc;

use hearth_core::config::{actions, TrustConfig};
use hearth_core::error::HearthError;
use hearth_core::traits::{RelationshipHistory, TrustStore};
use hearth_core::trust::{ThresholdCheck, VouchEligibility};

use crate::score::ScoreCalculator;

/// Decides whether vouches may be created and whether users meet action thresholds.
#[derive(Clone)]
pub struct EligibilityGuard {
    store: Arc<dyn TrustStore>,
    config: Arc<TrustConfig>,
    scores: ScoreCalculator,
    history: Option<Arc<dyn RelationshipHistory>>,
}

impl EligibilityGuard {
    pub fn new(store: Arc<dyn TrustStore>, config: Arc<TrustConfig>, scores: ScoreCalculator) -> Self {
        Self {
            store,
            config,
            scores,
            history: None,
        }
    }

    /// Enable the minimum relationship duration rule.
    pub fn with_relationship_history(mut self, history: Arc<dyn RelationshipHistory>) -> Self {
        self.history = Some(history);
        self
    }

    /// Evaluate every vouch rule for `voucher_id` -> `vouchee_id`.
    ///
    /// Rejections are returned as a decision with a display-ready reason; only
    /// storage and configuration failures are errors.
    pub async fn get_vouch_eligibility(
        &self,
        voucher_id: &str,
        vouchee_id: &str,
    ) -> Result<VouchEligibility, HearthError> {
        let required = self.config.threshold(actions::VOUCH_OTHERS)?;
        let trust = self
            .scores
            .compute_trust_score(voucher_id, false)
            .await?
            .computed_trust;

        if voucher_id == vouchee_id {
            return Ok(VouchEligibility::denied("Cannot vouch for yourself", trust));
        }

        if trust < required {
            tracing::debug!(
                "{} denied vouch for {}: trust {:.4} below {:.2}",
                voucher_id,
                vouchee_id,
                trust,
                required
            );
            return Ok(VouchEligibility::denied(
                format!(
                    "Insufficient trust to vouch for others: {:.2} (requires {:.2})",
                    trust, required
                ),
                trust,
            ));
        }

        let now = Utc::now();
        let window = self.config.rate_limit_window();
        let cutoff = now.checked_sub_signed(window).ok_or_else(|| {
            HearthError::Configuration(format!(
                "rate_limit_window_days of {} is out of range",
                self.config.rate_limit_window_days
            ))
        })?;
        let recent = self.store.get_vouches_since(voucher_id, cutoff).await?;
        let limit = self.config.max_vouches_per_month as usize;
        if recent.len() >= limit {
            let resets = recent
                .iter()
                .map(|v| v.created_at)
                .min()
                .and_then(|oldest| oldest.checked_add_signed(window));
            let reason = match resets {
                Some(reset) => format!(
                    "Vouch limit reached: {} of {} in the last {} days. Resets around {}",
                    recent.len(),
                    limit,
                    self.config.rate_limit_window_days,
                    reset.format("%Y-%m-%d")
                ),
                None => format!("Vouch limit reached: limit is {}", limit),
            };
            return Ok(VouchEligibility::denied(reason, trust));
        }

        let given = self.store.get_vouches_by_user(voucher_id).await?;
        if let Some(existing) = given.iter().find(|v| v.vouchee_id == vouchee_id) {
            let reason = if existing.is_active() {
                format!("You have already vouched for {}", vouchee_id)
            } else {
                format!(
                    "Your vouch for {} was revoked and cannot be renewed",
                    vouchee_id
                )
            };
            return Ok(VouchEligibility::denied(reason, trust));
        }

        if let Some(history) = &self.history {
            let min_known = self.config.min_known();
            let known_long_enough = match history.first_interaction(voucher_id, vouchee_id).await? {
                Some(first) => now - first >= min_known,
                None => false,
            };
            if !known_long_enough {
                return Ok(VouchEligibility::denied(
                    format!(
                        "You must have known {} for at least {} hours before vouching",
                        vouchee_id, self.config.min_known_hours
                    ),
                    trust,
                ));
            }
        }

        Ok(VouchEligibility::allowed(trust))
    }

    /// Check whether `user_id` meets the configured threshold for `action`.
    ///
    /// An unknown action is a `Configuration` error.
    pub async fn check_trust_threshold(
        &self,
        user_id: &str,
        action: &str,
    ) -> Result<ThresholdCheck, HearthError> {
        let required = self.config.threshold(action)?;
        let actual_trust = self
            .scores
            .compute_trust_score(user_id, false)
            .await?
            .computed_trust;
        Ok(ThresholdCheck {
            action: action.to_string(),
            meets_threshold: actual_trust >= required,
            actual_trust,
            required,
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, Duration};
    use hearth_core::traits::{GenesisRegistry, VouchLedger};
    use hearth_core::vouch::Vouch;
    use hearth_store::InMemoryStore;

    use super::*;

    fn guard(store: Arc<InMemoryStore>, config: TrustConfig) -> EligibilityGuard {
        let config = Arc::new(config);
        let scores = ScoreCalculator::new(store.clone(), config.clone());
        EligibilityGuard::new(store, config, scores)
    }

    async fn seeded() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store.add_genesis_node("g", None, None).await.unwrap();
        store
    }

    struct FixedHistory(Option<DateTime<Utc>>);

    #[async_trait]
    impl RelationshipHistory for FixedHistory {
        async fn first_interaction(
            &self,
            _a: &str,
            _b: &str,
        ) -> Result<Option<DateTime<Utc>>, HearthError> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn genesis_may_vouch() {
        let store = seeded().await;
        let e = guard(store, TrustConfig::default())
            .get_vouch_eligibility("g", "a")
            .await
            .unwrap();
        assert!(e.can_vouch);
        assert_eq!(e.voucher_trust, 1.0);
        assert!(e.reason.is_none());
    }

    #[tokio::test]
    async fn self_vouch_rejected() {
        let store = seeded().await;
        let e = guard(store, TrustConfig::default())
            .get_vouch_eligibility("g", "g")
            .await
            .unwrap();
        assert!(!e.can_vouch);
        assert!(e.reason.unwrap().contains("yourself"));
    }

    #[tokio::test]
    async fn low_trust_rejected_with_reason() {
        let store = seeded().await;
        store.create_vouch("g", "a", "").await.unwrap();
        store.create_vouch("a", "b", "").await.unwrap();
        // b sits at 0.64, below 0.7.
        let e = guard(store, TrustConfig::default())
            .get_vouch_eligibility("b", "c")
            .await
            .unwrap();
        assert!(!e.can_vouch);
        assert!((e.voucher_trust - 0.64).abs() < 1e-9);
        assert!(e.reason.unwrap().contains("Insufficient trust"));
    }

    #[tokio::test]
    async fn rate_limit_counts_only_the_window() {
        let store = seeded().await;
        let mut old = Vouch::new("g", "old", "");
        old.created_at = Utc::now() - Duration::days(45);
        store.insert_vouch(old).unwrap();
        for i in 0..4 {
            store.create_vouch("g", &format!("u{}", i), "").await.unwrap();
        }
        let guard = guard(store.clone(), TrustConfig::default());
        assert!(guard.get_vouch_eligibility("g", "u4").await.unwrap().can_vouch);

        store.create_vouch("g", "u4", "").await.unwrap();
        let e = guard.get_vouch_eligibility("g", "u5").await.unwrap();
        assert!(!e.can_vouch);
        let reason = e.reason.unwrap();
        assert!(reason.contains("5 of 5"), "{}", reason);
        assert!(reason.contains("Resets around"));
    }

    #[tokio::test]
    async fn unrepresentable_window_is_configuration_error() {
        let store = seeded().await;
        let config = TrustConfig {
            rate_limit_window_days: 9_000_000_000_000,
            ..TrustConfig::default()
        };
        let err = guard(store, config)
            .get_vouch_eligibility("g", "a")
            .await
            .unwrap_err();
        assert!(matches!(err, HearthError::Configuration(_)));
    }

    #[tokio::test]
    async fn existing_active_vouch_rejected() {
        let store = seeded().await;
        store.create_vouch("g", "a", "").await.unwrap();
        let e = guard(store, TrustConfig::default())
            .get_vouch_eligibility("g", "a")
            .await
            .unwrap();
        assert!(!e.can_vouch);
        assert!(e.reason.unwrap().contains("already vouched"));
    }

    #[tokio::test]
    async fn revoked_pair_reported_as_severed() {
        let store = seeded().await;
        let v = store.create_vouch("g", "a", "").await.unwrap();
        store.revoke_vouch(&v.id, "").await.unwrap();
        let e = guard(store, TrustConfig::default())
            .get_vouch_eligibility("g", "a")
            .await
            .unwrap();
        assert!(!e.can_vouch);
        assert!(e.reason.unwrap().contains("revoked"));
    }

    #[tokio::test]
    async fn relationship_history_enforces_min_known() {
        let store = seeded().await;
        let recent = Arc::new(FixedHistory(Some(Utc::now() - Duration::hours(2))));
        let e = guard(store.clone(), TrustConfig::default())
            .with_relationship_history(recent)
            .get_vouch_eligibility("g", "a")
            .await
            .unwrap();
        assert!(!e.can_vouch);
        assert!(e.reason.unwrap().contains("24 hours"));

        let never = Arc::new(FixedHistory(None));
        let e = guard(store.clone(), TrustConfig::default())
            .with_relationship_history(never)
            .get_vouch_eligibility("g", "a")
            .await
            .unwrap();
        assert!(!e.can_vouch);

        let old = Arc::new(FixedHistory(Some(Utc::now() - Duration::days(3))));
        let e = guard(store, TrustConfig::default())
            .with_relationship_history(old)
            .get_vouch_eligibility("g", "a")
            .await
            .unwrap();
        assert!(e.can_vouch);
    }

    #[tokio::test]
    async fn threshold_check_and_unknown_action() {
        let store = seeded().await;
        store.create_vouch("g", "a", "").await.unwrap();
        let guard = guard(store, TrustConfig::default());

        let check = guard.check_trust_threshold("a", actions::SEND_MESSAGES).await.unwrap();
        assert!(check.meets_threshold);
        assert_eq!(check.required, 0.6);

        let check = guard.check_trust_threshold("a", actions::STEWARD_ACTIONS).await.unwrap();
        assert!(!check.meets_threshold);
        assert!((check.actual_trust - 0.8).abs() < 1e-9);

        let err = guard.check_trust_threshold("a", "fly").await.unwrap_err();
        assert!(matches!(err, HearthError::Configuration(_)));
    }

    #[tokio::test]
    async fn lowered_threshold_via_config() {
        let store = seeded().await;
        store.create_vouch("g", "a", "").await.unwrap();
        store.create_vouch("a", "b", "").await.unwrap();
        let mut config = TrustConfig::default();
        config.thresholds.insert(actions::VOUCH_OTHERS.to_string(), 0.6);
        let e = guard(store, config).get_vouch_eligibility("b", "c").await.unwrap();
        assert!(e.can_vouch);
    }
}
