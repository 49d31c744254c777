//! Error types for SHADE.
//!
//! This module provides the protocol error taxonomy using `thiserror`.
//! Every failure in the core is local and synchronous; nothing is retried
//! internally.

use thiserror::Error;

/// Result type alias using `ShadeError`.
pub type Result<T> = std::result::Result<T, ShadeError>;

/// Main error type for all SHADE operations.
#[derive(Debug, Error)]
pub enum ShadeError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CRYPTOGRAPHIC ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Scalar is zero or not below the group order.
    #[error("Invalid scalar: {0}")]
    InvalidScalar(String),

    /// Coordinates not on the curve, bad encoding, or infinity where a public key is required.
    #[error("Invalid point: {0}")]
    InvalidPoint(String),

    /// The caller-supplied randomness source could not produce a valid scalar.
    #[error("Entropy source failure: {0}")]
    EntropySourceFailure(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // STEALTH ADDRESS ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Encoded meta-address has the wrong length.
    #[error("Invalid meta-address: expected {expected} bytes, got {actual}")]
    InvalidMetaAddressLength { expected: usize, actual: usize },

    /// Recovered stealth key does not derive the expected address.
    #[error("Stealth address mismatch: expected {expected}, derived {derived}")]
    AddressMismatch { expected: String, derived: String },

    /// Invalid stealth address format.
    #[error("Invalid stealth address: {0}")]
    InvalidStealthAddress(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // COLLABORATOR ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Invalid announcement format.
    #[error("Invalid announcement: {0}")]
    InvalidAnnouncement(String),

    /// Stealth address funds were already claimed.
    #[error("Stealth address already claimed: {0}")]
    AlreadyClaimed(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid hex encoding.
    #[error("Invalid hex encoding: {0}")]
    HexError(#[from] hex::FromHexError),

    /// File I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Input validation failed.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ShadeError {
    /// Returns true if this error is recoverable (can retry).
    ///
    /// Only file I/O can fail transiently; the cryptographic core never does.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ShadeError::IoError(_))
    }

    /// Returns true if this is a cryptographic error.
    pub fn is_crypto_error(&self) -> bool {
        matches!(
            self,
            ShadeError::InvalidScalar(_)
                | ShadeError::InvalidPoint(_)
                | ShadeError::EntropySourceFailure(_)
                | ShadeError::AddressMismatch { .. }
        )
    }

    /// Returns true if this is a validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            ShadeError::ValidationError(_)
                | ShadeError::InvalidMetaAddressLength { .. }
                | ShadeError::InvalidStealthAddress(_)
                | ShadeError::InvalidAnnouncement(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ShadeError::InvalidMetaAddressLength {
            expected: 66,
            actual: 65,
        };
        assert!(err.to_string().contains("66"));
        assert!(err.to_string().contains("65"));
    }

    #[test]
    fn test_error_classification() {
        let io = std::io::Error::new(std::io::ErrorKind::Interrupted, "interrupted");
        assert!(ShadeError::from(io).is_recoverable());
        assert!(!ShadeError::InvalidScalar("zero".into()).is_recoverable());
        assert!(!ShadeError::AlreadyClaimed("0x00".into()).is_recoverable());

        assert!(ShadeError::InvalidPoint("off curve".into()).is_crypto_error());
        assert!(ShadeError::EntropySourceFailure("exhausted".into()).is_crypto_error());
        assert!(!ShadeError::AlreadyClaimed("0x00".into()).is_crypto_error());

        assert!(ShadeError::InvalidMetaAddressLength { expected: 66, actual: 1 }.is_validation_error());
    }

    #[test]
    fn test_hex_error_conversion() {
        let result: std::result::Result<Vec<u8>, _> = hex::decode("zz");
        let shade_result: Result<Vec<u8>> = result.map_err(ShadeError::from);
        assert!(matches!(shade_result, Err(ShadeError::HexError(_))));
    }
}
