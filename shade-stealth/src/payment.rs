//! Stealth address generation (sender side).
//!
//! ```text
//! ephemPriv   <- CSPRNG
//! ephemPub     = ephemPriv * G
//! shared       = keccak256(uncompressed(ephemPriv * viewPub))
//! view_tag     = shared[0]
//! sh           = shared mod n
//! stealthPub   = spendPub + sh * G
//! address      = last20(keccak256(uncompressed(stealthPub)))
//! ```
//!
//! The ephemeral private key never leaves this module; it is zeroized when
//! the call returns.

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use shade_core::error::{Result, ShadeError};
use shade_core::types::{Announcement, GeneratedStealthAddress, MetaAddress, PublicKey, StealthAddress};
use shade_core::Scalar;
use shade_crypto::{derive_stealth_address, derive_stealth_public_key, SharedSecret};

// ═══════════════════════════════════════════════════════════════════════════════
// GENERATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Generates a one-time stealth address for `meta`.
///
/// # Errors
/// `EntropySourceFailure` if `rng` fails; no partial result is returned.
pub fn generate_stealth_address<R: RngCore + CryptoRng>(
    meta: &MetaAddress,
    rng: &mut R,
) -> Result<GeneratedStealthAddress> {
    let ephemeral_priv = Scalar::random(rng)?;
    generate_with_ephemeral(meta, &ephemeral_priv)
}

/// Deterministic generation with a caller-chosen ephemeral key.
///
/// Identical inputs give byte-identical output. Reusing an ephemeral key for
/// two recipients links the payments, so only tests and replay tools should
/// call this directly.
pub fn generate_with_ephemeral(
    meta: &MetaAddress,
    ephemeral_priv: &Scalar,
) -> Result<GeneratedStealthAddress> {
    let ephemeral_pub = PublicKey::from_secret(ephemeral_priv);

    let shared = SharedSecret::derive(ephemeral_priv, meta.view_pub())?;
    let sh = shared.to_scalar()?;
    let stealth_pub = derive_stealth_public_key(meta.spend_pub(), &sh)?;

    Ok(GeneratedStealthAddress {
        address: derive_stealth_address(&stealth_pub),
        ephemeral_pub,
        view_tag: shared.view_tag(),
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// PAYMENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Stealth payment: address to send to and announcement to publish.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StealthPayment {
    /// The one-time address to send funds to
    pub stealth_address: StealthAddress,
    /// The announcement to publish (ephemeral key + view tag + metadata)
    pub announcement: Announcement,
    /// Metadata about the payment
    pub metadata: PaymentMetadata,
}

/// Informational payment metadata, carried as JSON in the announcement.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMetadata {
    /// Payment amount (informational only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    /// Payment token (e.g., "ETH", "USDC")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Optional memo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl PaymentMetadata {
    /// Returns true when no field is set.
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.token.is_none() && self.memo.is_none()
    }

    /// Encodes as announcement metadata bytes. Empty metadata encodes to no bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes metadata bytes of an announcement.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Generates a stealth address and wraps it into a publishable announcement.
pub fn create_stealth_payment<R: RngCore + CryptoRng>(
    meta_address: &MetaAddress,
    rng: &mut R,
) -> Result<StealthPayment> {
    create_stealth_payment_with_metadata(meta_address, PaymentMetadata::default(), rng)
}

/// Like [`create_stealth_payment`], attaching metadata to the announcement.
pub fn create_stealth_payment_with_metadata<R: RngCore + CryptoRng>(
    meta_address: &MetaAddress,
    metadata: PaymentMetadata,
    rng: &mut R,
) -> Result<StealthPayment> {
    let generated = generate_stealth_address(meta_address, rng)?;
    let announcement = Announcement::new(
        generated.address,
        generated.ephemeral_pub,
        generated.view_tag,
    )
    .with_metadata(metadata.to_bytes()?);
    announcement.validate()?;

    Ok(StealthPayment {
        stealth_address: generated.address,
        announcement,
        metadata,
    })
}

/// Builder for stealth payments with optional metadata.
#[derive(Default)]
pub struct StealthPaymentBuilder {
    meta_address: Option<MetaAddress>,
    amount: Option<String>,
    token: Option<String>,
    memo: Option<String>,
}

impl StealthPaymentBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the recipient meta-address (required).
    pub fn recipient(mut self, meta_address: MetaAddress) -> Self {
        self.meta_address = Some(meta_address);
        self
    }

    /// Sets the amount.
    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    /// Sets the token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the memo.
    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Builds the payment, drawing the ephemeral key from `rng`.
    pub fn build<R: RngCore + CryptoRng>(self, rng: &mut R) -> Result<StealthPayment> {
        let meta_address = self.meta_address.ok_or_else(|| {
            ShadeError::ValidationError("recipient meta-address is required".into())
        })?;

        let metadata = PaymentMetadata {
            amount: self.amount,
            token: self.token,
            memo: self.memo,
        };

        create_stealth_payment_with_metadata(&meta_address, metadata, rng)
    }
}
