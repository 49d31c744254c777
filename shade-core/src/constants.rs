//! Protocol constants for SHADE.
//!
//! All sizes follow SEC1 encodings of secp256k1 points and 32-byte
//! big-endian scalars.

// ═══════════════════════════════════════════════════════════════════════════════
// SECP256K1 SIZES
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of a scalar (private key, shared secret hash) in bytes.
pub const SCALAR_SIZE: usize = 32;

/// Size of a field element (point coordinate) in bytes.
pub const COORDINATE_SIZE: usize = 32;

/// Size of a compressed SEC1 point: parity byte || x.
pub const COMPRESSED_POINT_SIZE: usize = 1 + COORDINATE_SIZE;

/// Size of an uncompressed SEC1 point: 0x04 || x || y.
pub const UNCOMPRESSED_POINT_SIZE: usize = 1 + 2 * COORDINATE_SIZE;

/// Compressed point prefix for even y.
pub const TAG_COMPRESSED_EVEN: u8 = 0x02;

/// Compressed point prefix for odd y.
pub const TAG_COMPRESSED_ODD: u8 = 0x03;

/// Uncompressed point prefix.
pub const TAG_UNCOMPRESSED: u8 = 0x04;

/// secp256k1 group order n, big-endian.
pub const CURVE_ORDER: [u8; SCALAR_SIZE] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

// ═══════════════════════════════════════════════════════════════════════════════
// PROTOCOL SIZES
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of an encoded meta-address: compressed spend key || compressed view key.
pub const META_ADDRESS_SIZE: usize = 2 * COMPRESSED_POINT_SIZE;

/// Size of a stealth address in bytes (last 20 bytes of Keccak-256).
pub const STEALTH_ADDRESS_SIZE: usize = 20;

/// Size of Keccak-256 output.
pub const KECCAK256_SIZE: usize = 32;

// ═══════════════════════════════════════════════════════════════════════════════
// VIEW TAG CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of view tag in bytes.
/// Using 1 byte gives 99.6% filtering efficiency (1/256 false positive rate).
pub const VIEW_TAG_SIZE: usize = 1;

/// Number of possible view tag values (2^8 = 256).
pub const VIEW_TAG_SPACE: usize = 256;

/// Expected filtering efficiency as a percentage.
pub const VIEW_TAG_EFFICIENCY: f64 = 99.609375; // (255/256) * 100

// ═══════════════════════════════════════════════════════════════════════════════
// ANNOUNCEMENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum size of the free-form metadata attached to an announcement.
pub const MAX_ANNOUNCEMENT_METADATA_SIZE: usize = 1024;

/// Fixed part of the binary announcement encoding:
/// address (20) || ephemeral key (33) || view tag (1) || timestamp (8) || metadata length (4).
pub const ANNOUNCEMENT_HEADER_SIZE: usize =
    STEALTH_ADDRESS_SIZE + COMPRESSED_POINT_SIZE + VIEW_TAG_SIZE + 8 + 4;

/// Tolerated clock skew for announcement timestamps, in seconds.
pub const MAX_TIMESTAMP_SKEW_SECS: u64 = 3600;

// ═══════════════════════════════════════════════════════════════════════════════
// ENTROPY
// ═══════════════════════════════════════════════════════════════════════════════

/// Draws attempted before an entropy source is declared broken.
///
/// A healthy CSPRNG lands outside [1, n-1] with probability below 2^-127.
pub const MAX_SCALAR_DRAWS: usize = 8;

// ═══════════════════════════════════════════════════════════════════════════════
// PERFORMANCE TUNING
// ═══════════════════════════════════════════════════════════════════════════════

/// Default batch size for scanning announcements.
pub const DEFAULT_SCAN_BATCH_SIZE: usize = 1000;

/// Maximum announcements to fetch in a single batch.
pub const MAX_SCAN_BATCH_SIZE: usize = 10_000;

/// Default number of parallel scan workers.
pub const DEFAULT_SCAN_WORKERS: usize = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_sizes_match_sec1() {
        assert_eq!(COMPRESSED_POINT_SIZE, 33);
        assert_eq!(UNCOMPRESSED_POINT_SIZE, 65);
    }

    #[test]
    fn test_meta_address_size() {
        // spend (33) + view (33)
        assert_eq!(META_ADDRESS_SIZE, 66);
    }

    #[test]
    fn test_view_tag_efficiency_calculation() {
        let expected_efficiency = (255.0 / 256.0) * 100.0;
        assert!((VIEW_TAG_EFFICIENCY - expected_efficiency).abs() < 0.0001);
    }

    #[test]
    fn test_announcement_header_size() {
        assert_eq!(ANNOUNCEMENT_HEADER_SIZE, 66);
    }

    #[test]
    fn test_batch_bounds() {
        assert!(DEFAULT_SCAN_BATCH_SIZE <= MAX_SCAN_BATCH_SIZE);
    }
}
