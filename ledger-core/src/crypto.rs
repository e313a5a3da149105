//! Group secret handling
//!
//! Secrets are random UUIDv4 strings handed to the group creator once.
//! Only their SHA-256 digest (lower-case hex) is ever stored.

use sha2::{Digest, Sha256};

/// Generate a fresh group secret
pub fn generate_secret() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Hash arbitrary bytes using SHA-256
pub fn hash_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hex-encoded SHA-256 digest of a secret
pub fn hash_secret(secret: &str) -> String {
    hex::encode(hash_bytes(secret.as_bytes()))
}

/// Check a plain-text secret against a stored digest
pub fn verify_secret(secret: &str, secret_hash: &str) -> bool {
    let computed = hash_secret(secret);
    // Compare every byte so timing does not depend on the mismatch position
    computed.len() == secret_hash.len()
        && computed
            .bytes()
            .zip(secret_hash.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
