// crates/hearth-core/src/vouch.rs
//
// Vouches: directed trust assertions from a voucher to a vouchee.
//
//   Active --revoke--> Revoked   (terminal, never un-revoked)

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HearthError;

/// Revocation state of a vouch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VouchStatus {
    /// The vouch contributes to trust chains.
    Active,
    /// The vouch has been revoked and no longer carries trust.
    Revoked,
}

impl VouchStatus {
    /// Stable tag used when the status is persisted.
    pub fn as_str(&self) -> &'static str {
        match self {
            VouchStatus::Active => "active",
            VouchStatus::Revoked => "revoked",
        }
    }
}

impl fmt::Display for VouchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VouchStatus {
    type Err = HearthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(VouchStatus::Active),
            "revoked" => Ok(VouchStatus::Revoked),
            other => Err(HearthError::Deserialization(format!(
                "Unrecognized vouch status '{}'",
                other
            ))),
        }
    }
}

/// A directed, attributable trust assertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vouch {
    /// Unique identifier (UUID v7 for time-ordering).
    pub id: Uuid,
    /// The identity extending trust.
    pub voucher_id: String,
    /// The identity receiving trust.
    pub vouchee_id: String,
    /// Free-text reason given by the voucher.
    pub context: String,
    pub created_at: DateTime<Utc>,
    pub status: VouchStatus,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_reason: Option<String>,
}

impl Vouch {
    /// Create a new active vouch stamped with the current time.
    pub fn new(voucher_id: &str, vouchee_id: &str, context: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            voucher_id: voucher_id.to_string(),
            vouchee_id: vouchee_id.to_string(),
            context: context.to_string(),
            created_at: Utc::now(),
            status: VouchStatus::Active,
            revoked_at: None,
            revoked_reason: None,
        }
    }

    pub fn is_revoked(&self) -> bool {
        self.status == VouchStatus::Revoked
    }

    pub fn is_active(&self) -> bool {
        self.status == VouchStatus::Active
    }

    /// Flip this vouch to revoked.
    ///
    /// Does not check whether the vouch was already revoked; callers that
    /// must reject double revocation do so before calling this.
    pub fn mark_revoked(&mut self, reason: &str, at: DateTime<Utc>) {
        self.status = VouchStatus::Revoked;
        self.revoked_at = Some(at);
        self.revoked_reason = Some(reason.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tags_parse_back() {
        assert_eq!("active".parse::<VouchStatus>().unwrap(), VouchStatus::Active);
        assert_eq!("revoked".parse::<VouchStatus>().unwrap(), VouchStatus::Revoked);
        assert_eq!(VouchStatus::Revoked.to_string(), "revoked");
    }

    #[test]
    fn unknown_status_is_a_deserialization_error() {
        let err = "pending".parse::<VouchStatus>().unwrap_err();
        assert!(matches!(err, HearthError::Deserialization(_)));
    }

    #[test]
    fn new_vouch_is_active() {
        let v = Vouch::new("alice", "bob", "met at the garden");
        assert!(v.is_active());
        assert!(v.revoked_at.is_none());
        assert_eq!(v.voucher_id, "alice");
        assert_eq!(v.vouchee_id, "bob");
    }

    #[test]
    fn mark_revoked_records_reason() {
        let mut v = Vouch::new("alice", "bob", "");
        let now = Utc::now();
        v.mark_revoked("left the community", now);
        assert!(v.is_revoked());
        assert_eq!(v.revoked_at, Some(now));
        assert_eq!(v.revoked_reason.as_deref(), Some("left the community"));
    }
}
