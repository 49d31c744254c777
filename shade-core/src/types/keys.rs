//! Key types for SHADE.
//!
//! - [`PublicKey`]: a curve point that is never infinity
//! - [`KeyPair`]: secret scalar + public key, `public = secret * G`
//! - [`ShadeKeys`]: spend + view key pairs of a recipient
//! - [`ViewingKey`]: view secret + spend public, the scanning capability
//! - [`StealthKeyPair`]: one-time key controlling a stealth address

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::address::{MetaAddress, StealthAddress};
use crate::constants::{COMPRESSED_POINT_SIZE, UNCOMPRESSED_POINT_SIZE};
use crate::curve::{Point, Scalar};
use crate::error::{Result, ShadeError};

// ═══════════════════════════════════════════════════════════════════════════════
// PUBLIC KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// secp256k1 public key.
///
/// Safe to share. Guaranteed not to be the point at infinity, so its
/// encodings are infallible.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    point: Point,
}

impl PublicKey {
    /// Wraps a point.
    ///
    /// # Errors
    /// `InvalidPoint` if the point is at infinity.
    pub fn from_point(point: Point) -> Result<Self> {
        if point.is_infinity() {
            return Err(ShadeError::InvalidPoint(
                "point at infinity is not a public key".into(),
            ));
        }
        Ok(Self { point })
    }

    /// Derives `secret * G`. Never infinity since the scalar is non-zero.
    pub fn from_secret(secret: &Scalar) -> Self {
        Self {
            point: Point::mul_base(secret),
        }
    }

    /// Parses a 33-byte compressed key.
    pub fn from_compressed(bytes: &[u8]) -> Result<Self> {
        Self::from_point(Point::from_compressed(bytes)?)
    }

    /// Parses a 65-byte uncompressed key.
    pub fn from_uncompressed(bytes: &[u8]) -> Result<Self> {
        Self::from_point(Point::from_uncompressed(bytes)?)
    }

    /// Returns the underlying point.
    pub fn as_point(&self) -> &Point {
        &self.point
    }

    /// 33-byte compressed encoding.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_POINT_SIZE] {
        self.point.compressed_unchecked()
    }

    /// 65-byte uncompressed encoding.
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_POINT_SIZE] {
        self.point.uncompressed_unchecked()
    }

    /// Returns the hex-encoded compressed key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// Parses a hex-encoded compressed key (with or without 0x prefix).
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        Self::from_compressed(&hex::decode(s)?)
    }
}

impl From<PublicKey> for Point {
    fn from(pk: PublicKey) -> Point {
        pk.point
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// KEY PAIR
// ═══════════════════════════════════════════════════════════════════════════════

/// A secp256k1 key pair with `public = secret * G`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyPair {
    /// Secret scalar (keep private, auto-zeroized)
    secret: Scalar,
    /// Public key (safe to share)
    #[zeroize(skip)]
    public: PublicKey,
}

impl KeyPair {
    /// Builds the pair for an existing secret.
    pub fn from_secret(secret: Scalar) -> Self {
        let public = PublicKey::from_secret(&secret);
        Self { secret, public }
    }

    /// Draws a fresh key pair from a caller-supplied CSPRNG.
    ///
    /// # Errors
    /// `EntropySourceFailure` if the source cannot produce a valid scalar.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        Ok(Self::from_secret(Scalar::random(rng)?))
    }

    /// Returns the secret scalar.
    pub fn secret(&self) -> &Scalar {
        &self.secret
    }

    /// Returns the public key.
    pub fn public(&self) -> &PublicKey {
        &self.public
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SHADE KEY TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Complete recipient key set.
///
/// The spend pair controls funds; the view pair only detects payments and
/// can be handed to a scanning delegate via [`ShadeKeys::viewing_key`].
#[derive(Clone, ZeroizeOnDrop)]
pub struct ShadeKeys {
    /// Spend key pair
    pub spend: KeyPair,
    /// View key pair
    pub view: KeyPair,
}

impl ShadeKeys {
    /// Creates a key set from existing pairs.
    pub fn new(spend: KeyPair, view: KeyPair) -> Self {
        Self { spend, view }
    }

    /// Draws independent spend and view pairs.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let spend = KeyPair::generate(rng)?;
        let view = KeyPair::generate(rng)?;
        Ok(Self { spend, view })
    }

    /// Returns the publishable meta-address.
    pub fn meta_address(&self) -> MetaAddress {
        MetaAddress::new(*self.spend.public(), *self.view.public())
    }

    /// Returns the scanning capability (no spend rights).
    pub fn viewing_key(&self) -> ViewingKey {
        ViewingKey::new(self.view.secret().clone(), *self.spend.public())
    }
}

impl std::fmt::Debug for ShadeKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShadeKeys")
            .field("spend", &self.spend)
            .field("view", &self.view)
            .finish()
    }
}

/// View private key plus spend public key.
///
/// Enough to decide ownership of announcements, not enough to spend.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ViewingKey {
    view_secret: Scalar,
    #[zeroize(skip)]
    spend_public: PublicKey,
}

impl ViewingKey {
    /// Creates a viewing key.
    pub fn new(view_secret: Scalar, spend_public: PublicKey) -> Self {
        Self {
            view_secret,
            spend_public,
        }
    }

    /// Returns the view secret.
    pub fn view_secret(&self) -> &Scalar {
        &self.view_secret
    }

    /// Returns the spend public key.
    pub fn spend_public(&self) -> &PublicKey {
        &self.spend_public
    }
}

impl std::fmt::Debug for ViewingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewingKey")
            .field("view_secret", &"[REDACTED]")
            .field("spend_public", &self.spend_public)
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STEALTH KEY PAIR
// ═══════════════════════════════════════════════════════════════════════════════

/// One-time key pair controlling a stealth address.
///
/// `public = spend_pub + sh * G` and `private = spend_priv + sh (mod n)`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct StealthKeyPair {
    private: Scalar,
    #[zeroize(skip)]
    public: PublicKey,
    #[zeroize(skip)]
    address: StealthAddress,
}

impl StealthKeyPair {
    /// Assembles a stealth key pair. The caller has already checked that
    /// `public` and `address` derive from `private`.
    pub fn new(private: Scalar, public: PublicKey, address: StealthAddress) -> Self {
        Self {
            private,
            public,
            address,
        }
    }

    /// Returns the stealth private key.
    ///
    /// # Security
    /// This key spends the funds at [`Self::address`].
    pub fn private(&self) -> &Scalar {
        &self.private
    }

    /// Returns the stealth public key.
    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    /// Returns the stealth address.
    pub fn address(&self) -> &StealthAddress {
        &self.address
    }
}

impl std::fmt::Debug for StealthKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StealthKeyPair")
            .field("address", &self.address)
            .field("public", &self.public)
            .field("private", &"[REDACTED]")
            .finish()
    }
}
