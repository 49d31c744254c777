//! Scalars modulo the secp256k1 group order.

use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::PrimeField;
use k256::{FieldBytes, Scalar as K256Scalar, U256};
use rand::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::constants::{MAX_SCALAR_DRAWS, SCALAR_SIZE};
use crate::error::{Result, ShadeError};

/// A scalar in `[1, n-1]`.
///
/// Zero and values `>= n` cannot be constructed. Used for private keys and
/// for the hashed shared secret. Zeroized on drop; never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Scalar {
    inner: K256Scalar,
}

impl Scalar {
    /// Parses a 32-byte big-endian scalar.
    ///
    /// # Errors
    /// `InvalidScalar` when the length is not 32, the value is zero, or the
    /// value is not below the group order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; SCALAR_SIZE] = bytes.try_into().map_err(|_| {
            ShadeError::InvalidScalar(format!(
                "expected {} bytes, got {}",
                SCALAR_SIZE,
                bytes.len()
            ))
        })?;
        Self::from_array(&arr)
    }

    /// Parses a fixed-size big-endian scalar.
    pub fn from_array(bytes: &[u8; SCALAR_SIZE]) -> Result<Self> {
        let parsed: Option<K256Scalar> = K256Scalar::from_repr(FieldBytes::from(*bytes)).into();
        let inner = parsed
            .ok_or_else(|| ShadeError::InvalidScalar("value is not below the group order".into()))?;
        Self::from_k256(inner)
    }

    /// Creates a scalar from a small integer (test vectors, fixtures).
    pub fn from_u64(value: u64) -> Result<Self> {
        Self::from_k256(K256Scalar::from(value))
    }

    /// Reduces a 32-byte big-endian digest modulo n.
    ///
    /// # Errors
    /// `InvalidScalar` if the digest reduces to zero.
    pub fn reduce(digest: &[u8; SCALAR_SIZE]) -> Result<Self> {
        let inner = <K256Scalar as Reduce<U256>>::reduce_bytes(&FieldBytes::from(*digest));
        Self::from_k256(inner)
    }

    /// Draws a uniformly random scalar from a caller-supplied CSPRNG.
    ///
    /// Out-of-range draws are rejected and redrawn. A source that errors, or
    /// keeps producing out-of-range values, is treated as broken.
    ///
    /// # Errors
    /// `EntropySourceFailure` in both cases. Weaker randomness is never
    /// substituted.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let mut bytes = Zeroizing::new([0u8; SCALAR_SIZE]);

        for _ in 0..MAX_SCALAR_DRAWS {
            rng.try_fill_bytes(bytes.as_mut())
                .map_err(|e| ShadeError::EntropySourceFailure(e.to_string()))?;

            if let Ok(scalar) = Self::from_array(&bytes) {
                return Ok(scalar);
            }
        }

        Err(ShadeError::EntropySourceFailure(format!(
            "no valid scalar after {} draws",
            MAX_SCALAR_DRAWS
        )))
    }

    /// Returns `(self + other) mod n`.
    ///
    /// # Errors
    /// `InvalidScalar` if the sum is zero (`other == -self`).
    pub fn add(&self, other: &Scalar) -> Result<Scalar> {
        Self::from_k256(self.inner + other.inner)
    }

    /// Returns the 32-byte big-endian encoding.
    ///
    /// # Security
    /// Handle the returned bytes carefully - do not log or expose them.
    pub fn to_bytes(&self) -> [u8; SCALAR_SIZE] {
        self.inner.to_bytes().into()
    }

    /// Returns the hex-encoded scalar.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parses a hex-encoded scalar (with or without 0x prefix).
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = Zeroizing::new(hex::decode(s)?);
        Self::from_bytes(&bytes)
    }

    pub(crate) fn as_k256(&self) -> &K256Scalar {
        &self.inner
    }

    fn from_k256(inner: K256Scalar) -> Result<Self> {
        if bool::from(inner.ct_eq(&K256Scalar::ZERO)) {
            return Err(ShadeError::InvalidScalar("value is zero".into()));
        }
        Ok(Self { inner })
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.inner.ct_eq(&other.inner).into()
    }
}

impl Eq for Scalar {}

impl std::fmt::Debug for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Scalar([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CURVE_ORDER;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use test_case::test_case;

    fn order_minus(k: u8) -> [u8; 32] {
        let mut bytes = CURVE_ORDER;
        bytes[31] -= k;
        bytes
    }

    /// Always returns the same byte, like a stuck hardware source.
    struct StuckRng(u8);

    impl RngCore for StuckRng {
        fn next_u32(&mut self) -> u32 {
            u32::from_le_bytes([self.0; 4])
        }
        fn next_u64(&mut self) -> u64 {
            u64::from_le_bytes([self.0; 8])
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(self.0);
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for StuckRng {}

    /// Reports failure on every read.
    struct ExhaustedRng;

    impl RngCore for ExhaustedRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, _dest: &mut [u8]) {}
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            Err(rand::Error::new("entropy pool exhausted"))
        }
    }

    impl CryptoRng for ExhaustedRng {}

    #[test_case([0u8; 32] ; "zero")]
    #[test_case(CURVE_ORDER ; "group order")]
    #[test_case([0xFF; 32] ; "above group order")]
    fn test_from_array_rejects(bytes: [u8; 32]) {
        assert!(matches!(
            Scalar::from_array(&bytes),
            Err(ShadeError::InvalidScalar(_))
        ));
    }

    #[test]
    fn test_from_array_accepts_bounds() {
        let mut one = [0u8; 32];
        one[31] = 1;
        assert!(Scalar::from_array(&one).is_ok());
        assert!(Scalar::from_array(&order_minus(1)).is_ok());
    }

    #[test]
    fn test_from_bytes_wrong_length() {
        assert!(matches!(
            Scalar::from_bytes(&[1u8; 31]),
            Err(ShadeError::InvalidScalar(_))
        ));
    }

    #[test]
    fn test_bytes_roundtrip_big_endian() {
        let s = Scalar::from_u64(0x0102).unwrap();
        let bytes = s.to_bytes();
        assert_eq!(bytes[30], 0x01);
        assert_eq!(bytes[31], 0x02);
        assert_eq!(Scalar::from_bytes(&bytes).unwrap(), s);
    }

    #[test]
    fn test_from_u64_zero_rejected() {
        assert!(Scalar::from_u64(0).is_err());
    }

    #[test]
    fn test_reduce_wraps_modulo_order() {
        // n + 5 reduces to 5
        let mut above = CURVE_ORDER;
        above[31] += 5;
        let reduced = Scalar::reduce(&above).unwrap();
        assert_eq!(reduced, Scalar::from_u64(5).unwrap());

        assert!(Scalar::reduce(&CURVE_ORDER).is_err());
        assert!(Scalar::reduce(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_add_modulo_order() {
        let a = Scalar::from_array(&order_minus(1)).unwrap();
        let b = Scalar::from_u64(3).unwrap();
        assert_eq!(a.add(&b).unwrap(), Scalar::from_u64(2).unwrap());

        // (n - 1) + 1 == 0 is not a valid scalar
        let one = Scalar::from_u64(1).unwrap();
        assert!(matches!(a.add(&one), Err(ShadeError::InvalidScalar(_))));
    }

    #[test]
    fn test_random_is_seed_deterministic() {
        let a = Scalar::random(&mut ChaCha20Rng::seed_from_u64(7)).unwrap();
        let b = Scalar::random(&mut ChaCha20Rng::seed_from_u64(7)).unwrap();
        let c = Scalar::random(&mut ChaCha20Rng::seed_from_u64(8)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_random_rejects_stuck_source() {
        assert!(matches!(
            Scalar::random(&mut StuckRng(0x00)),
            Err(ShadeError::EntropySourceFailure(_))
        ));
        assert!(matches!(
            Scalar::random(&mut StuckRng(0xFF)),
            Err(ShadeError::EntropySourceFailure(_))
        ));
    }

    #[test]
    fn test_random_propagates_source_error() {
        let err = Scalar::random(&mut ExhaustedRng).unwrap_err();
        assert!(matches!(err, ShadeError::EntropySourceFailure(_)));
        assert!(err.to_string().contains("exhausted"));
    }

    #[test]
    fn test_hex_roundtrip() {
        let s = Scalar::from_u64(0xDEADBEEF).unwrap();
        assert_eq!(Scalar::from_hex(&s.to_hex()).unwrap(), s);
        assert_eq!(Scalar::from_hex(&format!("0x{}", s.to_hex())).unwrap(), s);
    }

    #[test]
    fn test_debug_redacted() {
        let s = Scalar::from_u64(42).unwrap();
        let debug = format!("{:?}", s);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("2a"));
    }
}
