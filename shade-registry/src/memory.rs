//! In-memory announcement log.
//!
//! Fast, thread-safe storage suitable for development, testing,
//! and single-process deployments.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, instrument};

use shade_core::constants::VIEW_TAG_SPACE;
use shade_core::error::Result;
use shade_core::traits::AnnouncementLog;
use shade_core::types::{Announcement, AnnouncementStats, ViewTag};

/// In-memory announcement log.
///
/// # Indexing
///
/// Announcements are indexed by:
/// - ID: for direct lookup and publication-order ranges
/// - View tag: for tag-bucket queries
///
/// # Thread Safety
///
/// All operations are thread-safe. Publishing is serialized so that ids and
/// index buckets always agree with publication order.
#[derive(Debug)]
pub struct MemoryAnnouncementLog {
    /// Primary storage: ID → Announcement
    announcements: DashMap<u64, Announcement>,
    /// View tag index: tag → [announcement IDs], ascending
    view_tag_index: DashMap<ViewTag, Vec<u64>>,
    /// Next announcement ID
    next_id: AtomicU64,
    /// Held while an announcement is being appended
    append_lock: Mutex<()>,
    /// Log statistics
    stats: RwLock<AnnouncementStats>,
}

impl MemoryAnnouncementLog {
    /// Creates a new empty log. The first id is 1.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a log with preallocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            announcements: DashMap::with_capacity(capacity),
            view_tag_index: DashMap::with_capacity(VIEW_TAG_SPACE),
            next_id: AtomicU64::new(1),
            append_lock: Mutex::new(()),
            stats: RwLock::new(AnnouncementStats::new()),
        }
    }

    /// Returns the current statistics.
    pub fn stats(&self) -> AnnouncementStats {
        self.stats.read().clone()
    }

    /// Clears all announcements and restarts ids at 1.
    pub fn clear(&self) {
        let _guard = self.append_lock.lock();
        self.announcements.clear();
        self.view_tag_index.clear();
        self.next_id.store(1, Ordering::SeqCst);
        *self.stats.write() = AnnouncementStats::new();
    }

    /// Returns the number of announcements.
    pub fn len(&self) -> usize {
        self.announcements.len()
    }

    /// Returns true if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.announcements.is_empty()
    }

    /// Returns all announcements in publication order (for export/backup).
    pub fn all_announcements(&self) -> Vec<Announcement> {
        let mut all: Vec<Announcement> = self
            .announcements
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by_key(|a| a.id);
        all
    }

    /// Imports announcements, assigning fresh ids in the given order.
    ///
    /// Stops at the first invalid announcement; earlier ones stay imported.
    pub fn import(&self, announcements: Vec<Announcement>) -> Result<usize> {
        let mut imported = 0;
        for ann in announcements {
            self.append(ann)?;
            imported += 1;
        }
        Ok(imported)
    }

    fn append(&self, mut announcement: Announcement) -> Result<u64> {
        announcement.validate()?;

        let _guard = self.append_lock.lock();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        announcement.id = id;

        self.view_tag_index
            .entry(announcement.view_tag)
            .or_default()
            .push(id);
        self.stats.write().add(&announcement);
        self.announcements.insert(id, announcement);

        Ok(id)
    }
}

impl Default for MemoryAnnouncementLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnnouncementLog for MemoryAnnouncementLog {
    /// Validates, assigns the next id, indexes by view tag and stores.
    #[instrument(skip(self, announcement), fields(view_tag = announcement.view_tag))]
    async fn publish(&self, announcement: Announcement) -> Result<u64> {
        let id = self.append(announcement)?;
        debug!(id, "Published announcement");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn get_range(&self, from_id: u64, limit: usize) -> Result<Vec<Announcement>> {
        let end = self.next_id.load(Ordering::SeqCst);
        let announcements: Vec<Announcement> = (from_id.max(1)..end)
            .filter_map(|id| self.announcements.get(&id).map(|entry| entry.clone()))
            .take(limit)
            .collect();

        debug!(count = announcements.len(), "Retrieved range");
        Ok(announcements)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: u64) -> Result<Option<Announcement>> {
        Ok(self.announcements.get(&id).map(|entry| entry.clone()))
    }

    /// O(1) bucket lookup, then O(k) for the announcements in that bucket.
    #[instrument(skip(self))]
    async fn get_by_view_tag(&self, view_tag: ViewTag) -> Result<Vec<Announcement>> {
        let ids = match self.view_tag_index.get(&view_tag) {
            Some(ids) => ids.clone(),
            None => return Ok(Vec::new()),
        };

        let announcements: Vec<Announcement> = ids
            .into_iter()
            .filter_map(|id| self.announcements.get(&id).map(|entry| entry.clone()))
            .collect();

        debug!(view_tag, count = announcements.len(), "Retrieved by view tag");
        Ok(announcements)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.announcements.len() as u64)
    }

    async fn latest_id(&self) -> Result<Option<u64>> {
        let next = self.next_id.load(Ordering::SeqCst);
        Ok((next > 1 && !self.announcements.is_empty()).then(|| next - 1))
    }
}
