// crates/hearth-store/src/records.rs
//
// Persisted row shapes for the `vouches` and `trust_scores` tables.
//
// Domain types never go to disk directly. Status is stored as a free-text tag
// and chains as a plain list of lists; both are validated when a row is read
// back, so an unrecognized status fails loudly instead of being accepted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hearth_core::error::HearthError;
use hearth_core::trust::{TrustScore, VouchChain};
use hearth_core::vouch::{Vouch, VouchStatus};

/// A row of the `vouches` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredVouch {
    pub id: Uuid,
    pub voucher_id: String,
    pub vouchee_id: String,
    pub context: String,
    pub created_at: DateTime<Utc>,
    pub status: String,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_reason: Option<String>,
}

impl From<&Vouch> for StoredVouch {
    fn from(v: &Vouch) -> Self {
        Self {
            id: v.id,
            voucher_id: v.voucher_id.clone(),
            vouchee_id: v.vouchee_id.clone(),
            context: v.context.clone(),
            created_at: v.created_at,
            status: v.status.as_str().to_string(),
            revoked_at: v.revoked_at,
            revoked_reason: v.revoked_reason.clone(),
        }
    }
}

impl TryFrom<StoredVouch> for Vouch {
    type Error = HearthError;

    fn try_from(row: StoredVouch) -> Result<Self, Self::Error> {
        let status: VouchStatus = row.status.parse()?;
        if status == VouchStatus::Revoked && row.revoked_at.is_none() {
            return Err(HearthError::Deserialization(format!(
                "Vouch {} is revoked but has no revoked_at",
                row.id
            )));
        }
        Ok(Vouch {
            id: row.id,
            voucher_id: row.voucher_id,
            vouchee_id: row.vouchee_id,
            context: row.context,
            created_at: row.created_at,
            status,
            revoked_at: row.revoked_at,
            revoked_reason: row.revoked_reason,
        })
    }
}

/// A row of the `trust_scores` cache table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTrustScore {
    pub user_id: String,
    pub computed_trust: f64,
    pub vouch_chains: Vec<Vec<String>>,
    pub best_chain_distance: Option<u32>,
    pub is_genesis: bool,
    pub last_computed: DateTime<Utc>,
    pub vouch_count: u32,
    pub revocation_count: u32,
}

impl From<&TrustScore> for StoredTrustScore {
    fn from(s: &TrustScore) -> Self {
        Self {
            user_id: s.user_id.clone(),
            computed_trust: s.computed_trust,
            vouch_chains: s
                .vouch_chains
                .iter()
                .map(|c| c.members().to_vec())
                .collect(),
            best_chain_distance: s.best_chain_distance,
            is_genesis: s.is_genesis,
            last_computed: s.last_computed,
            vouch_count: s.vouch_count,
            revocation_count: s.revocation_count,
        }
    }
}

impl TryFrom<StoredTrustScore> for TrustScore {
    type Error = HearthError;

    fn try_from(row: StoredTrustScore) -> Result<Self, Self::Error> {
        if !(0.0..=1.0).contains(&row.computed_trust) {
            return Err(HearthError::Deserialization(format!(
                "Trust score for {} out of range: {}",
                row.user_id, row.computed_trust
            )));
        }
        if row.vouch_chains.iter().any(|c| c.is_empty()) {
            return Err(HearthError::Deserialization(format!(
                "Trust score for {} contains an empty chain",
                row.user_id
            )));
        }
        Ok(TrustScore {
            user_id: row.user_id,
            computed_trust: row.computed_trust,
            vouch_chains: row.vouch_chains.into_iter().map(VouchChain::new).collect(),
            best_chain_distance: row.best_chain_distance,
            is_genesis: row.is_genesis,
            last_computed: row.last_computed,
            vouch_count: row.vouch_count,
            revocation_count: row.revocation_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_vouch_keeps_status_tag() {
        let mut v = Vouch::new("g", "a", "neighbour");
        v.mark_revoked("moved away", Utc::now());
        let row = StoredVouch::from(&v);
        assert_eq!(row.status, "revoked");
        let back = Vouch::try_from(row).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn unknown_status_rejected_at_boundary() {
        let mut row = StoredVouch::from(&Vouch::new("g", "a", ""));
        row.status = "suspended".to_string();
        let err = Vouch::try_from(row).unwrap_err();
        assert!(matches!(err, HearthError::Deserialization(_)));
    }

    #[test]
    fn revoked_row_without_timestamp_rejected() {
        let mut row = StoredVouch::from(&Vouch::new("g", "a", ""));
        row.status = "revoked".to_string();
        assert!(Vouch::try_from(row).is_err());
    }

    #[test]
    fn stored_score_chains_are_list_of_lists() {
        let score = TrustScore::genesis("g", 1, 0);
        let row = StoredTrustScore::from(&score);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["vouch_chains"], serde_json::json!([["g"]]));
        assert_eq!(TrustScore::try_from(row).unwrap(), score);
    }

    #[test]
    fn out_of_range_trust_rejected() {
        let mut row = StoredTrustScore::from(&TrustScore::genesis("g", 0, 0));
        row.computed_trust = 1.5;
        assert!(matches!(
            TrustScore::try_from(row),
            Err(HearthError::Deserialization(_))
        ));
    }
}
