// crates/hearth-core/src/trust.rs
//
// Derived trust facts: vouch chains, cached trust scores, and the structured
// decisions returned by eligibility and threshold checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An ordered path of user ids from a genesis node to a scored identity.
///
/// A chain of length 1 is a genesis node on its own (zero hops).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct VouchChain(Vec<String>);

impl VouchChain {
    pub fn new(members: Vec<String>) -> Self {
        Self(members)
    }

    /// Number of vouch edges along the chain.
    pub fn hops(&self) -> u32 {
        self.0.len().saturating_sub(1) as u32
    }

    /// The genesis node the chain starts from.
    pub fn root(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn members(&self) -> &[String] {
        &self.0
    }

    pub fn into_members(self) -> Vec<String> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for VouchChain {
    fn from(members: Vec<String>) -> Self {
        Self(members)
    }
}

/// Cached trust score for a user. Rebuildable at any time from the vouch
/// ledger and genesis registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrustScore {
    pub user_id: String,
    /// Trust in [0.0, 1.0].
    pub computed_trust: f64,
    /// Every discovered chain from a genesis root to this user.
    pub vouch_chains: Vec<VouchChain>,
    /// Hop count of the best chain. None when the user is unreachable.
    pub best_chain_distance: Option<u32>,
    pub is_genesis: bool,
    pub last_computed: DateTime<Utc>,
    /// Active incoming vouches.
    pub vouch_count: u32,
    /// Revoked incoming vouches.
    pub revocation_count: u32,
}

impl TrustScore {
    /// Score for a genesis node: full trust at distance zero.
    pub fn genesis(user_id: &str, vouch_count: u32, revocation_count: u32) -> Self {
        Self {
            user_id: user_id.to_string(),
            computed_trust: 1.0,
            vouch_chains: vec![VouchChain::new(vec![user_id.to_string()])],
            best_chain_distance: Some(0),
            is_genesis: true,
            last_computed: Utc::now(),
            vouch_count,
            revocation_count,
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.best_chain_distance.is_some()
    }

    /// Whether this cached value is still within the freshness window.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.last_computed < ttl
    }
}

/// Outcome of the eligibility guard for a proposed vouch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VouchEligibility {
    pub can_vouch: bool,
    /// Human-readable reason when `can_vouch` is false.
    pub reason: Option<String>,
    /// The voucher's trust at the time of the check.
    pub voucher_trust: f64,
}

impl VouchEligibility {
    pub fn allowed(voucher_trust: f64) -> Self {
        Self {
            can_vouch: true,
            reason: None,
            voucher_trust,
        }
    }

    pub fn denied(reason: impl Into<String>, voucher_trust: f64) -> Self {
        Self {
            can_vouch: false,
            reason: Some(reason.into()),
            voucher_trust,
        }
    }
}

/// Outcome of a trust-gated action check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThresholdCheck {
    pub action: String,
    pub meets_threshold: bool,
    pub actual_trust: f64,
    pub required: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(ids: &[&str]) -> VouchChain {
        VouchChain::new(ids.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn chain_hops_and_root() {
        let c = chain(&["g", "a", "b"]);
        assert_eq!(c.hops(), 2);
        assert_eq!(c.root(), Some("g"));
        assert_eq!(chain(&["g"]).hops(), 0);
    }

    #[test]
    fn chain_serializes_as_plain_list() {
        let json = serde_json::to_string(&chain(&["g", "a"])).unwrap();
        assert_eq!(json, r#"["g","a"]"#);
    }

    #[test]
    fn genesis_score_is_full_trust() {
        let s = TrustScore::genesis("g", 0, 0);
        assert_eq!(s.computed_trust, 1.0);
        assert_eq!(s.best_chain_distance, Some(0));
        assert_eq!(s.vouch_chains, vec![chain(&["g"])]);
        assert!(s.is_genesis);
    }

    #[test]
    fn freshness_window() {
        let mut s = TrustScore::genesis("g", 0, 0);
        let now = Utc::now();
        s.last_computed = now - chrono::Duration::minutes(59);
        assert!(s.is_fresh(now, chrono::Duration::hours(1)));
        s.last_computed = now - chrono::Duration::minutes(61);
        assert!(!s.is_fresh(now, chrono::Duration::hours(1)));
    }
}
