#![deny(missing_docs)]
#![doc = "Read-only collaborators of the minimisation engine: balance tables and audit digests."]

/// Per-arm covariate balance tables.
pub mod balance;
/// Canonical JSON encoding and SHA-256 digests.
pub mod digest;

pub use balance::{BalanceRow, BalanceTable, VariableBalance};
pub use digest::{config_digest, registry_digest, stable_hash_string, to_canonical_json_bytes};
