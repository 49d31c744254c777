//! Stealth key and address derivation.
//!
//! ## Derivation Flow
//!
//! ```text
//! sh = keccak256(uncompressed(shared_point)) mod n
//!       ↓
//! stealth_pub  = spend_pub + sh * G
//! stealth_priv = spend_priv + sh   (mod n)
//!       ↓
//! address = keccak256(uncompressed(stealth_pub))[12..32]
//! ```
//!
//! Because scalar multiplication distributes over addition,
//! `stealth_priv * G == stealth_pub` for every matching pair.

use shade_core::constants::{KECCAK256_SIZE, STEALTH_ADDRESS_SIZE};
use shade_core::curve::{self, Scalar};
use shade_core::error::Result;
use shade_core::types::{PublicKey, StealthAddress};

use crate::hash::keccak256;

// ═══════════════════════════════════════════════════════════════════════════════
// STEALTH PUBLIC KEY DERIVATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Computes `spend_pub + sh * G`.
///
/// # Errors
/// `InvalidPoint` if the sum is the point at infinity (only when
/// `sh == -spend_priv`).
pub fn derive_stealth_public_key(spend_pub: &PublicKey, sh: &Scalar) -> Result<PublicKey> {
    let tweak = curve::scalar_mul_base(sh);
    PublicKey::from_point(curve::add(spend_pub.as_point(), &tweak))
}

// ═══════════════════════════════════════════════════════════════════════════════
// STEALTH PRIVATE KEY DERIVATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Computes `(spend_priv + sh) mod n`.
///
/// # Security
/// The output spends the funds at the stealth address. It is zeroized on drop.
///
/// # Errors
/// `InvalidScalar` if the sum is zero.
pub fn derive_stealth_private_key(spend_priv: &Scalar, sh: &Scalar) -> Result<Scalar> {
    spend_priv.add(sh)
}

// ═══════════════════════════════════════════════════════════════════════════════
// ADDRESS DERIVATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Last 20 bytes of `keccak256(uncompressed(pk))`.
///
/// The hash covers all 65 bytes of the encoding, including the `0x04` tag.
pub fn derive_stealth_address(pk: &PublicKey) -> StealthAddress {
    let hash = keccak256(&pk.to_uncompressed());
    let mut bytes = [0u8; STEALTH_ADDRESS_SIZE];
    bytes.copy_from_slice(&hash[KECCAK256_SIZE - STEALTH_ADDRESS_SIZE..]);
    StealthAddress::from_array(bytes)
}
