//! Keccak-256 hashing.
//!
//! Keccak-256 is the only hash in the protocol. It is used twice: over the
//! uncompressed ECDH shared point (giving the view tag and `sh`), and over the
//! uncompressed stealth public key (giving the address). No domain separators
//! are prepended.

use sha3::{Digest, Keccak256};

use shade_core::constants::KECCAK256_SIZE;

/// Computes Keccak-256.
///
/// Note: Keccak-256 is NOT SHA3-256. They use different padding.
pub fn keccak256(input: &[u8]) -> [u8; KECCAK256_SIZE] {
    let mut hasher = Keccak256::new();
    hasher.update(input);
    hasher.finalize().into()
}
