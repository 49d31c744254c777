//! Collaborator interfaces for SHADE.
//!
//! The core never stores anything. Announcements and claims live behind
//! these traits so that different backends can be plugged in.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Announcement, StealthAddress, ViewTag};

// ═══════════════════════════════════════════════════════════════════════════════
// ANNOUNCEMENT LOG
// ═══════════════════════════════════════════════════════════════════════════════

/// Append-only log of announcements.
///
/// Implementations might use:
/// - In-memory storage (for testing/development)
/// - A database table
/// - On-chain events
#[async_trait]
pub trait AnnouncementLog: Send + Sync {
    /// Appends an announcement and returns its assigned id.
    ///
    /// Ids increase in publication order.
    async fn publish(&self, announcement: Announcement) -> Result<u64>;

    /// Returns up to `limit` announcements with `id >= from_id`, in publication order.
    async fn get_range(&self, from_id: u64, limit: usize) -> Result<Vec<Announcement>>;

    /// Retrieves a specific announcement by id.
    async fn get_by_id(&self, id: u64) -> Result<Option<Announcement>>;

    /// Retrieves announcements carrying the given view tag, in publication order.
    async fn get_by_view_tag(&self, view_tag: ViewTag) -> Result<Vec<Announcement>>;

    /// Returns total announcement count.
    async fn count(&self) -> Result<u64>;

    /// Returns the id of the most recent announcement, if any.
    async fn latest_id(&self) -> Result<Option<u64>>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLAIM REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

/// Records which stealth addresses have been claimed.
#[async_trait]
pub trait ClaimRegistry: Send + Sync {
    /// Returns true if the address was already claimed.
    async fn is_claimed(&self, address: &StealthAddress) -> Result<bool>;

    /// Marks the address as claimed.
    ///
    /// At most one call per address succeeds, even under concurrency; every
    /// later call fails with `AlreadyClaimed`.
    async fn mark_claimed(&self, address: &StealthAddress) -> Result<()>;
}
