//! Payment discovery (recipient scan).
//!
//! Needs only the viewing capability: view private key + spend public key.
//! With a view tag, a foreign announcement costs one scalar multiplication
//! and one hash; the `sh * G` multiplication, point addition and address
//! hash run only when the tag matches.

use std::time::Instant;

use shade_core::error::ShadeError;
use shade_core::types::{Announcement, PublicKey, StealthAddress, ViewTag, ViewingKey};
use shade_core::Scalar;
use shade_crypto::{derive_stealth_address, derive_stealth_public_key, verify_view_tag, SharedSecret};

/// Result of scanning a single announcement.
#[derive(Debug)]
pub enum ScanResult {
    /// View tag didn't match - rejected on the fast path
    TagMismatch,
    /// Full check ran and the address is not ours
    NotOwned,
    /// The address belongs to the scanning key
    Owned,
    /// The announcement could not be processed
    Invalid(ShadeError),
}

impl ScanResult {
    /// Returns true if the announcement is ours.
    pub fn is_owned(&self) -> bool {
        matches!(self, ScanResult::Owned)
    }
}

/// Decides whether `candidate` belongs to the holder of `view_priv`.
///
/// With `tag_hint`, a mismatching tag returns `false` early. The tag never
/// causes a false negative: an owned address always carries the matching tag.
pub fn check_ownership(
    candidate: &StealthAddress,
    ephemeral_pub: &PublicKey,
    view_priv: &Scalar,
    spend_pub: &PublicKey,
    tag_hint: Option<ViewTag>,
) -> bool {
    classify(candidate, ephemeral_pub, view_priv, spend_pub, tag_hint).is_owned()
}

/// Scans one announcement with the viewing capability.
///
/// `use_view_tag = false` forces the full check on every announcement.
pub fn scan_announcement(
    announcement: &Announcement,
    viewing_key: &ViewingKey,
    use_view_tag: bool,
) -> ScanResult {
    if let Err(e) = announcement.validate() {
        return ScanResult::Invalid(e);
    }

    classify(
        &announcement.stealth_address,
        &announcement.ephemeral_pub,
        viewing_key.view_secret(),
        viewing_key.spend_public(),
        use_view_tag.then_some(announcement.view_tag),
    )
}

fn classify(
    candidate: &StealthAddress,
    ephemeral_pub: &PublicKey,
    view_priv: &Scalar,
    spend_pub: &PublicKey,
    tag_hint: Option<ViewTag>,
) -> ScanResult {
    let shared = match SharedSecret::derive(view_priv, ephemeral_pub) {
        Ok(s) => s,
        Err(e) => return ScanResult::Invalid(e),
    };

    if let Some(tag) = tag_hint {
        if !verify_view_tag(&shared, tag) {
            return ScanResult::TagMismatch;
        }
    }

    let derived = shared
        .to_scalar()
        .and_then(|sh| derive_stealth_public_key(spend_pub, &sh))
        .map(|pk| derive_stealth_address(&pk));

    match derived {
        Ok(address) if address.ct_eq(candidate) => ScanResult::Owned,
        Ok(_) => ScanResult::NotOwned,
        Err(e) => ScanResult::Invalid(e),
    }
}

/// An announcement found to be ours.
#[derive(Clone, Debug)]
pub struct DiscoveredPayment {
    /// Position in the scanned slice
    pub index: usize,
    /// The matching announcement
    pub announcement: Announcement,
}

/// Scans a slice of announcements, recording into `stats`.
pub fn scan_announcements(
    announcements: &[Announcement],
    viewing_key: &ViewingKey,
    use_view_tags: bool,
    stats: &mut ScanStats,
) -> Vec<DiscoveredPayment> {
    let start = Instant::now();

    let found = announcements
        .iter()
        .enumerate()
        .filter_map(|(index, ann)| {
            let result = scan_announcement(ann, viewing_key, use_view_tags);
            stats.record(&result);
            result.is_owned().then(|| DiscoveredPayment {
                index,
                announcement: ann.clone(),
            })
        })
        .collect();

    stats.duration_ms += start.elapsed().as_millis() as u64;
    found
}

/// Statistics for scanning operations.
#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    /// Total announcements scanned
    pub total_scanned: u64,
    /// Rejected by the view tag alone
    pub tag_rejections: u64,
    /// Full ownership checks performed
    pub full_checks: u64,
    /// Announcements found to be ours
    pub owned: u64,
    /// Announcements that could not be processed
    pub errors: u64,
    /// Duration of the scan in milliseconds
    pub duration_ms: u64,
}

impl ScanStats {
    /// Creates a new stats tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a scan result.
    pub fn record(&mut self, result: &ScanResult) {
        self.total_scanned += 1;
        match result {
            ScanResult::TagMismatch => self.tag_rejections += 1,
            ScanResult::NotOwned => self.full_checks += 1,
            ScanResult::Owned => {
                self.full_checks += 1;
                self.owned += 1;
            }
            ScanResult::Invalid(_) => self.errors += 1,
        }
    }

    /// Adds counters from another run.
    pub fn merge(&mut self, other: &ScanStats) {
        self.total_scanned += other.total_scanned;
        self.tag_rejections += other.tag_rejections;
        self.full_checks += other.full_checks;
        self.owned += other.owned;
        self.errors += other.errors;
        self.duration_ms += other.duration_ms;
    }

    /// Returns the scan rate (announcements per second).
    pub fn rate(&self) -> f64 {
        if self.duration_ms == 0 {
            0.0
        } else {
            (self.total_scanned as f64 / self.duration_ms as f64) * 1000.0
        }
    }

    /// Returns the filter efficiency (percentage of announcements rejected by tag).
    pub fn filter_efficiency(&self) -> f64 {
        if self.total_scanned == 0 {
            0.0
        } else {
            (self.tag_rejections as f64 / self.total_scanned as f64) * 100.0
        }
    }
}
