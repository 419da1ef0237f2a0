// crates/hearth-core/src/genesis.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bootstrap identity with axiomatic trust 1.0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenesisNode {
    pub user_id: String,
    pub added_at: DateTime<Utc>,
    /// The genesis member who added this node. None for the very first node.
    pub added_by: Option<String>,
    pub notes: Option<String>,
}

impl GenesisNode {
    pub fn new(user_id: &str, added_by: Option<&str>, notes: Option<&str>) -> Self {
        Self {
            user_id: user_id.to_string(),
            added_at: Utc::now(),
            added_by: added_by.map(str::to_string),
            notes: notes.map(str::to_string),
        }
    }
}
