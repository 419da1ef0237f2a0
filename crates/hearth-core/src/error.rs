use thiserror::Error;

/// Engine-wide error types for Hearth.
///
/// Eligibility and threshold decisions are returned as structured values, not
/// errors. Only `Configuration` and `StorageUnavailable` are expected to surface
/// from those checks.
#[derive(Debug, Error)]
pub enum HearthError {
    /// Unknown vouch or user id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Attempt to revoke a vouch that is already revoked.
    #[error("Vouch already revoked: {0}")]
    AlreadyRevoked(String),

    /// Business-rule rejection of a vouch (low trust, rate limit, duplicate, self-vouch).
    #[error("Ineligible vouch: {0}")]
    IneligibleVouch(String),

    /// The (voucher, vouchee) uniqueness constraint was violated by a revoked pair.
    #[error("Vouch conflict: {0}")]
    VouchConflict(String),

    /// A user id the storage backend cannot key on.
    #[error("Invalid user id: {0}")]
    InvalidUserId(String),

    /// Caller is not permitted to perform the operation.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Invalid state transition.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Invalid or unknown configuration, e.g. an unrecognized action name.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Storage backend failure (RocksDB, poisoned lock).
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A persisted value could not be mapped back into a domain type.
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<serde_json::Error> for HearthError {
    fn from(e: serde_json::Error) -> Self {
        HearthError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for HearthError {
    fn from(e: toml::de::Error) -> Self {
        HearthError::Configuration(e.to_string())
    }
}
