// crates/hearth-store/src/lib.rs
//
// hearth-store: Storage layer for the Hearth web-of-trust engine.
//
// Provides an in-memory store for tests and embedding, a RocksDB-backed store
// for durable deployments, and the record types that map domain values onto
// persisted rows.

pub mod memory;
pub mod records;
pub mod rocks;

// Re-export key types for ergonomic access from downstream crates.
pub use memory::InMemoryStore;
pub use records::{StoredTrustScore, StoredVouch};
pub use rocks::RocksStore;
