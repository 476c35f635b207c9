use degbench_core::errors::DegError;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::serde::to_canonical_json_bytes;

/// Computes a stable hexadecimal SHA-256 of the canonical JSON form of
/// `value`.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, DegError> {
    let bytes = to_canonical_json_bytes(value)?;
    let digest = Sha256::digest(bytes);
    Ok(format!("{:x}", digest))
}
