//! ECDH shared secret between an ephemeral key and a view key.
//!
//! ```text
//! shared_point = a * B            (a: private scalar, B: counterparty public key)
//! digest       = keccak256(uncompressed(shared_point))
//! view_tag     = digest[0]
//! sh           = digest mod n
//! ```
//!
//! The sender computes it as `ephemPriv * viewPub`, the recipient as
//! `viewPriv * ephemPub`; both land on the same point.

use zeroize::{Zeroize, ZeroizeOnDrop};

use shade_core::constants::KECCAK256_SIZE;
use shade_core::curve::{self, Scalar};
use shade_core::error::Result;
use shade_core::types::{PublicKey, ViewTag};

use crate::hash::keccak256;

/// Hashed ECDH shared point.
///
/// Holds the unreduced digest so that the view tag can be read without
/// paying for the reduction or any further curve work.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret {
    digest: [u8; KECCAK256_SIZE],
}

impl SharedSecret {
    /// Computes `keccak256(uncompressed(secret * public))`.
    ///
    /// # Errors
    /// `InvalidPoint` if the product is the point at infinity, which cannot
    /// happen for a non-zero scalar and a point of the prime-order group.
    pub fn derive(secret: &Scalar, public: &PublicKey) -> Result<Self> {
        let shared = PublicKey::from_point(curve::scalar_mul(secret, public.as_point()))?;
        Ok(Self {
            digest: keccak256(&shared.to_uncompressed()),
        })
    }

    /// First byte of the digest, before reduction.
    pub fn view_tag(&self) -> ViewTag {
        self.digest[0]
    }

    /// The shared secret hash `sh = digest mod n`.
    ///
    /// # Errors
    /// `InvalidScalar` if the digest reduces to zero.
    pub fn to_scalar(&self) -> Result<Scalar> {
        Scalar::reduce(&self.digest)
    }

    /// Raw digest bytes.
    ///
    /// # Security
    /// Anyone holding these can link the payment. Do not log them.
    pub fn as_bytes(&self) -> &[u8; KECCAK256_SIZE] {
        &self.digest
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SharedSecret([REDACTED])")
    }
}
