//! View tag checks for efficient scanning.
//!
//! View tags let recipients cheaply filter announcements:
//! - Each announcement carries a 1-byte view tag
//! - Recipients recompute the tag from `viewPriv * ephemPub`
//! - Only announcements whose tag matches need the full ownership check
//!
//! ## Efficiency
//!
//! With 1-byte view tags (256 possible values), ~99.6% of announcements
//! are rejected after one scalar multiplication and one hash, skipping the
//! `sh * G` multiplication, the point addition and the address hash.
//!
//! ## Security
//!
//! The tag is public and leaks 8 bits of the shared-secret digest. It is a
//! filter, not a security boundary: `sh` is still drawn from the full digest.

use subtle::ConstantTimeEq;

use shade_core::constants::VIEW_TAG_SPACE;
use shade_core::types::ViewTag;

use crate::ecdh::SharedSecret;

/// Checks in constant time whether the shared secret yields `expected_tag`.
pub fn verify_view_tag(shared: &SharedSecret, expected_tag: ViewTag) -> bool {
    shared.view_tag().ct_eq(&expected_tag).into()
}

/// View tag distribution tracker.
///
/// Useful for checking that announcements in a log spread evenly across tags.
#[derive(Debug, Clone)]
pub struct ViewTagStats {
    /// Count of each view tag value
    pub distribution: Vec<u64>,
    /// Total number of tags analyzed
    pub total: u64,
}

impl Default for ViewTagStats {
    fn default() -> Self {
        Self {
            distribution: vec![0; VIEW_TAG_SPACE],
            total: 0,
        }
    }
}

impl ViewTagStats {
    /// Creates a new stats tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a view tag.
    pub fn add(&mut self, tag: ViewTag) {
        self.distribution[tag as usize] += 1;
        self.total += 1;
    }

    /// Returns the most common view tag.
    pub fn most_common(&self) -> Option<(ViewTag, u64)> {
        self.distribution
            .iter()
            .enumerate()
            .max_by_key(|(_, &count)| count)
            .map(|(tag, &count)| (tag as ViewTag, count))
    }

    /// Returns the expected count per tag for uniform distribution.
    pub fn expected_uniform_count(&self) -> f64 {
        self.total as f64 / VIEW_TAG_SPACE as f64
    }

    /// Computes chi-squared statistic for uniformity test.
    pub fn chi_squared(&self) -> f64 {
        let expected = self.expected_uniform_count();
        if expected == 0.0 {
            return 0.0;
        }

        self.distribution
            .iter()
            .map(|&observed| {
                let diff = observed as f64 - expected;
                (diff * diff) / expected
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use shade_core::types::KeyPair;
    use shade_core::Scalar;

    #[test]
    fn test_verify_view_tag() {
        let a = KeyPair::from_secret(Scalar::from_u64(99).unwrap());
        let b = KeyPair::from_secret(Scalar::from_u64(100).unwrap());
        let shared = SharedSecret::derive(a.secret(), b.public()).unwrap();

        let correct = shared.view_tag();
        assert!(verify_view_tag(&shared, correct));
        assert!(!verify_view_tag(&shared, correct.wrapping_add(1)));
    }

    #[test]
    fn test_view_tag_distribution() {
        // Tags of random ECDH secrets should be close to uniform
        let mut rng = ChaCha20Rng::seed_from_u64(0x5EED);
        let view = KeyPair::generate(&mut rng).unwrap();
        let mut stats = ViewTagStats::new();

        for _ in 0..5000 {
            let ephemeral = KeyPair::generate(&mut rng).unwrap();
            let shared = SharedSecret::derive(ephemeral.secret(), view.public()).unwrap();
            stats.add(shared.view_tag());
        }

        // 255 degrees of freedom; critical value at p=0.001 is ~330
        let chi_sq = stats.chi_squared();
        assert!(chi_sq < 500.0, "view tags are not uniformly distributed: χ² = {}", chi_sq);
    }

    #[test]
    fn test_view_tag_stats() {
        let mut stats = ViewTagStats::new();
        assert_eq!(stats.chi_squared(), 0.0);

        stats.add(0);
        stats.add(0);
        stats.add(1);
        stats.add(255);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.distribution[0], 2);
        assert_eq!(stats.distribution[1], 1);
        assert_eq!(stats.distribution[255], 1);

        let (most_common, count) = stats.most_common().unwrap();
        assert_eq!(most_common, 0);
        assert_eq!(count, 2);
    }
}
