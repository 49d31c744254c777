//! Address types for SHADE.
//!
//! - [`MetaAddress`]: the recipient's publishable identity (spend + view keys)
//! - [`StealthAddress`]: 20-byte one-time receiving address
//! - [`GeneratedStealthAddress`]: what a sender gets back from generation

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use super::keys::PublicKey;
use crate::constants::{COMPRESSED_POINT_SIZE, META_ADDRESS_SIZE, STEALTH_ADDRESS_SIZE};
use crate::error::{Result, ShadeError};

/// One-byte scanning hint: the first byte of the shared-secret digest.
///
/// Not a security boundary; unrelated announcements match with probability 1/256.
pub type ViewTag = u8;

// ═══════════════════════════════════════════════════════════════════════════════
// META-ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// A recipient's long-lived public identity.
///
/// The spend key gates fund control; the view key gates scanning. The
/// encoding is exactly 66 bytes: compressed spend key || compressed view key,
/// with no version byte or other framing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaAddress {
    spend_pub: PublicKey,
    view_pub: PublicKey,
}

impl MetaAddress {
    /// Creates a meta-address from its two public keys.
    pub fn new(spend_pub: PublicKey, view_pub: PublicKey) -> Self {
        Self {
            spend_pub,
            view_pub,
        }
    }

    /// Returns the spend public key.
    pub fn spend_pub(&self) -> &PublicKey {
        &self.spend_pub
    }

    /// Returns the view public key.
    pub fn view_pub(&self) -> &PublicKey {
        &self.view_pub
    }

    /// Encodes as `compressed(spend) || compressed(view)`.
    pub fn encode(&self) -> [u8; META_ADDRESS_SIZE] {
        let mut out = [0u8; META_ADDRESS_SIZE];
        out[..COMPRESSED_POINT_SIZE].copy_from_slice(&self.spend_pub.to_compressed());
        out[COMPRESSED_POINT_SIZE..].copy_from_slice(&self.view_pub.to_compressed());
        out
    }

    /// Decodes the 66-byte encoding.
    ///
    /// # Errors
    /// - `InvalidMetaAddressLength` unless exactly 66 bytes
    /// - `InvalidPoint` if either half is not a valid compressed point
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != META_ADDRESS_SIZE {
            return Err(ShadeError::InvalidMetaAddressLength {
                expected: META_ADDRESS_SIZE,
                actual: bytes.len(),
            });
        }

        let spend_pub = PublicKey::from_compressed(&bytes[..COMPRESSED_POINT_SIZE])?;
        let view_pub = PublicKey::from_compressed(&bytes[COMPRESSED_POINT_SIZE..])?;
        Ok(Self::new(spend_pub, view_pub))
    }

    /// Returns the hex-encoded 66-byte encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.encode())
    }

    /// Parses a hex-encoded meta-address (with or without 0x prefix).
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        Self::decode(&bytes)
    }
}

impl std::fmt::Display for MetaAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STEALTH ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// A 20-byte one-time address: `last20(keccak256(uncompressed stealth pub))`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StealthAddress {
    bytes: [u8; STEALTH_ADDRESS_SIZE],
}

impl StealthAddress {
    /// Creates an address from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; STEALTH_ADDRESS_SIZE] = bytes.try_into().map_err(|_| {
            ShadeError::InvalidStealthAddress(format!(
                "expected {} bytes, got {}",
                STEALTH_ADDRESS_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    /// Creates from a fixed-size array.
    pub fn from_array(bytes: [u8; STEALTH_ADDRESS_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; STEALTH_ADDRESS_SIZE] {
        &self.bytes
    }

    /// Returns `0x`-prefixed lowercase hex.
    pub fn to_hex_string(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }

    /// Parses from hex string (with or without 0x prefix).
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        Self::from_bytes(&bytes)
    }

    /// Constant-time comparison, for ownership checks.
    pub fn ct_eq(&self, other: &StealthAddress) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl std::fmt::Debug for StealthAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StealthAddress({})", self.to_hex_string())
    }
}

impl std::fmt::Display for StealthAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

impl std::str::FromStr for StealthAddress {
    type Err = ShadeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for StealthAddress {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex_string())
    }
}

impl<'de> Deserialize<'de> for StealthAddress {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// GENERATION RESULT
// ═══════════════════════════════════════════════════════════════════════════════

/// Output of stealth address generation.
///
/// Everything the sender needs to pay and to announce. The ephemeral private
/// key is not part of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedStealthAddress {
    /// Where to send funds
    pub address: StealthAddress,
    /// Ephemeral public key to announce
    pub ephemeral_pub: PublicKey,
    /// View tag to announce
    pub view_tag: ViewTag,
}
