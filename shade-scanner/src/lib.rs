//! # SHADE Scanner
//!
//! Batch scanning of an announcement log to discover payments.
//!
//! ## Features
//!
//! - **Batch Processing**: Walks the log in publication order, `batch_size` at a time
//! - **Progress Reporting**: Callbacks for UI progress updates
//! - **Resumable Scans**: Tracks the last scanned id
//! - **Parallel Scanning**: Splits each batch across blocking worker tasks
//!
//! Only the viewing capability is needed; a scanner never holds spend keys.
//!
//! ## Example
//!
//! ```rust
//! use rand::rngs::OsRng;
//! use shade_registry::{AnnouncementLog, MemoryAnnouncementLog};
//! use shade_scanner::Scanner;
//! use shade_stealth::{create_stealth_payment, ShadeWallet};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let wallet = ShadeWallet::generate(&mut OsRng).unwrap();
//! let log = MemoryAnnouncementLog::new();
//!
//! let payment = create_stealth_payment(wallet.meta_address(), &mut OsRng).unwrap();
//! log.publish(payment.announcement).await.unwrap();
//!
//! let scanner = Scanner::from_wallet(&wallet);
//! let discoveries = scanner.scan_all(&log).await.unwrap();
//! assert_eq!(discoveries.len(), 1);
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

use std::time::Instant;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use shade_core::constants::{DEFAULT_SCAN_BATCH_SIZE, DEFAULT_SCAN_WORKERS, MAX_SCAN_BATCH_SIZE};
use shade_core::error::{Result, ShadeError};
use shade_core::traits::AnnouncementLog;
use shade_core::types::{Announcement, ViewingKey};
use shade_stealth::discovery::{
    scan_announcement, scan_announcements, DiscoveredPayment, ScanResult, ScanStats,
};
use shade_stealth::ShadeWallet;

/// Scanner configuration.
#[derive(Clone, Debug)]
pub struct ScannerConfig {
    /// Announcements fetched per log query
    pub batch_size: usize,
    /// Whether to stop on first discovery
    pub stop_on_first: bool,
    /// First announcement id to scan (inclusive)
    pub from_id: Option<u64>,
    /// Last announcement id to scan (inclusive)
    pub to_id: Option<u64>,
    /// Reject on the view tag before the full check
    pub use_view_tags: bool,
    /// Worker tasks for [`Scanner::scan_parallel`]
    pub workers: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_SCAN_BATCH_SIZE,
            stop_on_first: false,
            from_id: None,
            to_id: None,
            use_view_tags: true,
            workers: DEFAULT_SCAN_WORKERS,
        }
    }
}

impl ScannerConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Enables stopping on first discovery.
    pub fn stop_on_first(mut self) -> Self {
        self.stop_on_first = true;
        self
    }

    /// Starts the scan at `id`.
    pub fn from_id(mut self, id: u64) -> Self {
        self.from_id = Some(id);
        self
    }

    /// Ends the scan at `id`.
    pub fn to_id(mut self, id: u64) -> Self {
        self.to_id = Some(id);
        self
    }

    /// Disables the view-tag fast path; every announcement gets the full check.
    pub fn without_view_tags(mut self) -> Self {
        self.use_view_tags = false;
        self
    }

    /// Sets the number of parallel workers.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Checks the configuration for values the scanner cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 || self.batch_size > MAX_SCAN_BATCH_SIZE {
            return Err(ShadeError::ConfigError(format!(
                "batch_size must be between 1 and {MAX_SCAN_BATCH_SIZE}, got {}",
                self.batch_size
            )));
        }
        if self.workers == 0 {
            return Err(ShadeError::ConfigError("workers must be at least 1".into()));
        }
        if let (Some(from), Some(to)) = (self.from_id, self.to_id) {
            if from > to {
                return Err(ShadeError::ConfigError(format!(
                    "from_id {from} is after to_id {to}"
                )));
            }
        }
        Ok(())
    }

    fn first_id(&self) -> u64 {
        self.from_id.unwrap_or(1).max(1)
    }

    fn past_end(&self, id: u64) -> bool {
        self.to_id.map_or(false, |to| id > to)
    }
}

/// Progress callback type.
pub type ProgressCallback = Box<dyn Fn(ScanProgress) + Send + Sync>;

/// Scan progress information.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Total announcements to scan
    pub total: u64,
    /// Announcements scanned so far
    pub scanned: u64,
    /// Discoveries found so far
    pub discoveries: u64,
    /// Current scan rate (announcements per second)
    pub rate: f64,
    /// Estimated time remaining in seconds
    pub eta_seconds: Option<f64>,
    /// Percentage complete (0-100)
    pub percent: f64,
}

impl ScanProgress {
    /// Creates a new progress tracker.
    pub fn new(total: u64) -> Self {
        Self {
            total,
            scanned: 0,
            discoveries: 0,
            rate: 0.0,
            eta_seconds: None,
            percent: 0.0,
        }
    }

    /// Updates progress with new values.
    pub fn update(&mut self, scanned: u64, discoveries: u64, elapsed_ms: u64) {
        self.scanned = scanned;
        self.discoveries = discoveries;

        if elapsed_ms > 0 {
            self.rate = (scanned as f64 / elapsed_ms as f64) * 1000.0;
        }

        if self.total > 0 {
            self.percent = (scanned as f64 / self.total as f64 * 100.0).min(100.0);

            if self.rate > 0.0 {
                let remaining = self.total.saturating_sub(scanned);
                self.eta_seconds = Some(remaining as f64 / self.rate);
            }
        }
    }
}

/// Scan position for resumable scanning.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanPosition {
    /// Last scanned announcement id (0 before the first scan)
    pub last_id: u64,
    /// Total announcements scanned in this session
    pub total_scanned: u64,
    /// Total discoveries in this session
    pub total_discoveries: u64,
}

impl ScanPosition {
    /// Creates a new scan position.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates position after scanning an announcement.
    pub fn update(&mut self, announcement: &Announcement, discovered: bool) {
        self.advance(announcement.id, 1, u64::from(discovered));
    }

    /// Records a run of announcements ending at `last_id`.
    pub fn advance(&mut self, last_id: u64, scanned: u64, discoveries: u64) {
        self.last_id = self.last_id.max(last_id);
        self.total_scanned += scanned;
        self.total_discoveries += discoveries;
    }
}

/// Scanner bound to one viewing key.
pub struct Scanner {
    viewing_key: ViewingKey,
    position: RwLock<ScanPosition>,
    stats: RwLock<ScanStats>,
}

impl Scanner {
    /// Creates a scanner for the given viewing capability.
    pub fn new(viewing_key: ViewingKey) -> Self {
        Self {
            viewing_key,
            position: RwLock::new(ScanPosition::new()),
            stats: RwLock::new(ScanStats::new()),
        }
    }

    /// Creates a scanner from a wallet's viewing key.
    pub fn from_wallet(wallet: &ShadeWallet) -> Self {
        Self::new(wallet.viewing_key())
    }

    /// Returns the current scan position.
    pub fn position(&self) -> ScanPosition {
        self.position.read().clone()
    }

    /// Returns the cumulative statistics.
    pub fn stats(&self) -> ScanStats {
        self.stats.read().clone()
    }

    /// Resets the scan position and statistics.
    pub fn reset_position(&self) {
        *self.position.write() = ScanPosition::new();
        *self.stats.write() = ScanStats::new();
    }

    /// Scans every announcement in the log.
    #[instrument(skip(self, log))]
    pub async fn scan_all(&self, log: &dyn AnnouncementLog) -> Result<Vec<DiscoveredPayment>> {
        self.scan_with_config(log, ScannerConfig::default()).await
    }

    /// Scans with custom configuration.
    #[instrument(skip(self, log, config))]
    pub async fn scan_with_config(
        &self,
        log: &dyn AnnouncementLog,
        config: ScannerConfig,
    ) -> Result<Vec<DiscoveredPayment>> {
        self.run(log, &config, None).await
    }

    /// Scans with progress reporting after every batch.
    #[instrument(skip(self, log, config, progress_callback))]
    pub async fn scan_with_progress(
        &self,
        log: &dyn AnnouncementLog,
        config: ScannerConfig,
        progress_callback: ProgressCallback,
    ) -> Result<Vec<DiscoveredPayment>> {
        self.run(log, &config, Some(&progress_callback)).await
    }

    /// Continues from the announcement after the last one scanned.
    #[instrument(skip(self, log, config))]
    pub async fn resume(
        &self,
        log: &dyn AnnouncementLog,
        config: ScannerConfig,
    ) -> Result<Vec<DiscoveredPayment>> {
        let next = self.position.read().last_id + 1;
        self.run(log, &config.from_id(next), None).await
    }

    /// Scans a single announcement.
    pub fn scan_one(&self, announcement: &Announcement) -> ScanResult {
        let result = scan_announcement(announcement, &self.viewing_key, true);
        self.stats.write().record(&result);
        result
    }

    /// Scans the log with each batch split across `config.workers` blocking
    /// tasks. Discoveries come back in publication order.
    ///
    /// With `stop_on_first`, statistics and position cover only the
    /// announcements up to and including the first discovery.
    #[instrument(skip(self, log, config), fields(workers = config.workers))]
    pub async fn scan_parallel(
        &self,
        log: &dyn AnnouncementLog,
        config: ScannerConfig,
    ) -> Result<Vec<DiscoveredPayment>> {
        self.run_parallel(log, &config, None).await
    }

    /// Parallel scan with progress reporting after every batch.
    #[instrument(skip(self, log, config, progress_callback), fields(workers = config.workers))]
    pub async fn scan_parallel_with_progress(
        &self,
        log: &dyn AnnouncementLog,
        config: ScannerConfig,
        progress_callback: ProgressCallback,
    ) -> Result<Vec<DiscoveredPayment>> {
        self.run_parallel(log, &config, Some(&progress_callback)).await
    }

    async fn run_parallel(
        &self,
        log: &dyn AnnouncementLog,
        config: &ScannerConfig,
        progress_callback: Option<&ProgressCallback>,
    ) -> Result<Vec<DiscoveredPayment>> {
        config.validate()?;

        let start = Instant::now();
        let mut stats = ScanStats::new();
        let mut discoveries = Vec::new();
        let mut cursor = config.first_id();
        let mut offset = 0usize;
        let mut progress = ScanProgress::new(Self::expected_total(log, config).await?);

        info!(from_id = cursor, to_id = ?config.to_id, "Starting parallel scan");

        while !config.past_end(cursor) {
            let mut batch = log.get_range(cursor, config.batch_size).await?;
            if let Some(to) = config.to_id {
                batch.retain(|a| a.id <= to);
            }
            let Some(last_id) = batch.last().map(|a| a.id) else {
                break;
            };
            cursor = last_id + 1;

            let (mut batch_stats, found) = self.scan_batch_parallel(&batch, config).await?;
            debug!(last_id, count = batch.len(), found = found.len(), "Scanned batch");

            if config.stop_on_first {
                if let Some(first) = found.into_iter().next() {
                    // Count only the prefix that a sequential scan would have seen
                    let end = first.index + 1;
                    let mut prefix_stats = ScanStats::new();
                    scan_announcements(
                        &batch[..end],
                        &self.viewing_key,
                        config.use_view_tags,
                        &mut prefix_stats,
                    );
                    prefix_stats.duration_ms = 0;
                    stats.merge(&prefix_stats);

                    self.position
                        .write()
                        .advance(first.announcement.id, end as u64, 1);
                    discoveries.push(DiscoveredPayment {
                        index: first.index + offset,
                        announcement: first.announcement,
                    });
                    info!("Stopping on first discovery");
                    break;
                }
                // Nothing found: the whole batch counts
                self.record_batch(&mut stats, &mut batch_stats, last_id, batch.len(), 0);
            } else {
                let found_count = found.len() as u64;
                discoveries.extend(found.into_iter().map(|mut payment| {
                    payment.index += offset;
                    payment
                }));
                self.record_batch(&mut stats, &mut batch_stats, last_id, batch.len(), found_count);
            }
            offset += batch.len();

            if let Some(callback) = progress_callback {
                progress.update(
                    stats.total_scanned,
                    discoveries.len() as u64,
                    start.elapsed().as_millis() as u64,
                );
                callback(progress.clone());
            }
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;

        if let Some(callback) = progress_callback {
            progress.update(stats.total_scanned, discoveries.len() as u64, stats.duration_ms);
            callback(progress);
        }

        self.finish(&stats, discoveries.len());
        Ok(discoveries)
    }

    fn record_batch(
        &self,
        stats: &mut ScanStats,
        batch_stats: &mut ScanStats,
        last_id: u64,
        scanned: usize,
        found: u64,
    ) {
        if batch_stats.errors > 0 {
            warn!(errors = batch_stats.errors, "Skipped invalid announcements");
        }
        batch_stats.duration_ms = 0;
        stats.merge(batch_stats);
        self.position.write().advance(last_id, scanned as u64, found);
    }

    async fn scan_batch_parallel(
        &self,
        batch: &[Announcement],
        config: &ScannerConfig,
    ) -> Result<(ScanStats, Vec<DiscoveredPayment>)> {
        let chunk_size = batch.len().div_ceil(config.workers).max(1);
        let mut tasks = JoinSet::new();

        for (chunk_index, chunk) in batch.chunks(chunk_size).enumerate() {
            let chunk = chunk.to_vec();
            let viewing_key = self.viewing_key.clone();
            let use_view_tags = config.use_view_tags;

            tasks.spawn_blocking(move || {
                let mut stats = ScanStats::new();
                let found = scan_announcements(&chunk, &viewing_key, use_view_tags, &mut stats);
                (chunk_index, stats, found)
            });
        }

        let mut parts = Vec::with_capacity(config.workers);
        while let Some(joined) = tasks.join_next().await {
            parts.push(joined.map_err(|e| {
                ShadeError::InternalError(format!("scan worker failed: {e}"))
            })?);
        }
        parts.sort_by_key(|(chunk_index, _, _)| *chunk_index);

        let mut stats = ScanStats::new();
        let mut found = Vec::new();
        for (chunk_index, part_stats, part_found) in parts {
            stats.merge(&part_stats);
            found.extend(part_found.into_iter().map(|mut payment| {
                payment.index += chunk_index * chunk_size;
                payment
            }));
        }

        Ok((stats, found))
    }

    async fn run(
        &self,
        log: &dyn AnnouncementLog,
        config: &ScannerConfig,
        progress_callback: Option<&ProgressCallback>,
    ) -> Result<Vec<DiscoveredPayment>> {
        config.validate()?;

        let start = Instant::now();
        let mut stats = ScanStats::new();
        let mut discoveries = Vec::new();
        let mut cursor = config.first_id();
        let mut progress = ScanProgress::new(Self::expected_total(log, config).await?);

        info!(
            from_id = cursor,
            to_id = ?config.to_id,
            batch_size = config.batch_size,
            use_view_tags = config.use_view_tags,
            "Starting scan"
        );

        'batches: loop {
            let batch = log.get_range(cursor, config.batch_size).await?;
            if batch.is_empty() {
                break;
            }

            debug!(from_id = cursor, count = batch.len(), "Scanning batch");

            for announcement in batch {
                if config.past_end(announcement.id) {
                    break 'batches;
                }
                cursor = announcement.id + 1;

                let result =
                    scan_announcement(&announcement, &self.viewing_key, config.use_view_tags);
                if let ScanResult::Invalid(ref e) = result {
                    warn!(id = announcement.id, error = %e, "Skipping invalid announcement");
                }
                stats.record(&result);

                let owned = result.is_owned();
                self.position.write().update(&announcement, owned);

                if owned {
                    debug!(id = announcement.id, "Discovered payment");
                    discoveries.push(DiscoveredPayment {
                        index: (stats.total_scanned - 1) as usize,
                        announcement,
                    });

                    if config.stop_on_first {
                        info!("Stopping on first discovery");
                        break 'batches;
                    }
                }
            }

            if let Some(callback) = progress_callback {
                progress.update(
                    stats.total_scanned,
                    discoveries.len() as u64,
                    start.elapsed().as_millis() as u64,
                );
                callback(progress.clone());
            }
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;

        if let Some(callback) = progress_callback {
            progress.update(stats.total_scanned, discoveries.len() as u64, stats.duration_ms);
            callback(progress);
        }

        self.finish(&stats, discoveries.len());
        Ok(discoveries)
    }

    /// Announcements in the configured id range. Ids are contiguous in the log.
    async fn expected_total(log: &dyn AnnouncementLog, config: &ScannerConfig) -> Result<u64> {
        let Some(latest) = log.latest_id().await? else {
            return Ok(0);
        };
        let last = config.to_id.map_or(latest, |to| to.min(latest));
        let first = config.first_id();
        Ok(if last >= first { last - first + 1 } else { 0 })
    }

    fn finish(&self, stats: &ScanStats, discoveries: usize) {
        self.stats.write().merge(stats);

        info!(
            discoveries,
            scanned = stats.total_scanned,
            tag_rejections = stats.tag_rejections,
            errors = stats.errors,
            duration_ms = stats.duration_ms,
            rate = format!("{:.2}/s", stats.rate()),
            "Scan complete"
        );
    }
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("viewing_key", &self.viewing_key)
            .field("position", &*self.position.read())
            .finish()
    }
}

/// Scan result summary.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Number of announcements scanned
    pub total_scanned: u64,
    /// Number rejected by the view tag alone
    pub tag_rejections: u64,
    /// Number of full ownership checks
    pub full_checks: u64,
    /// Number of payments discovered
    pub discoveries: u64,
    /// Number of errors
    pub errors: u64,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Scan rate (announcements per second)
    pub rate: f64,
    /// Filter efficiency (% filtered by view tag)
    pub filter_efficiency: f64,
}

impl From<ScanStats> for ScanSummary {
    fn from(stats: ScanStats) -> Self {
        Self {
            total_scanned: stats.total_scanned,
            tag_rejections: stats.tag_rejections,
            full_checks: stats.full_checks,
            discoveries: stats.owned,
            errors: stats.errors,
            duration_ms: stats.duration_ms,
            rate: stats.rate(),
            filter_efficiency: stats.filter_efficiency(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use shade_registry::MemoryAnnouncementLog;
    use shade_stealth::create_stealth_payment;
    use std::sync::Arc;

    struct Fixture {
        scanner: Scanner,
        wallet: ShadeWallet,
        stranger: ShadeWallet,
        log: MemoryAnnouncementLog,
        rng: ChaCha20Rng,
    }

    impl Fixture {
        fn new(seed: u64) -> Self {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let wallet = ShadeWallet::generate(&mut rng).unwrap();
            let stranger = ShadeWallet::generate(&mut rng).unwrap();
            Self {
                scanner: Scanner::from_wallet(&wallet),
                wallet,
                stranger,
                log: MemoryAnnouncementLog::new(),
                rng,
            }
        }

        async fn pay_us(&mut self) -> u64 {
            let payment = create_stealth_payment(self.wallet.meta_address(), &mut self.rng).unwrap();
            self.log.publish(payment.announcement).await.unwrap()
        }

        async fn pay_stranger(&mut self) -> u64 {
            let payment =
                create_stealth_payment(self.stranger.meta_address(), &mut self.rng).unwrap();
            self.log.publish(payment.announcement).await.unwrap()
        }
    }

    fn ids(found: &[DiscoveredPayment]) -> Vec<u64> {
        found.iter().map(|p| p.announcement.id).collect()
    }

    #[tokio::test]
    async fn test_scan_empty_log() {
        let fx = Fixture::new(1);
        let discoveries = fx.scanner.scan_all(&fx.log).await.unwrap();
        assert!(discoveries.is_empty());
        assert_eq!(fx.scanner.position().last_id, 0);
    }

    #[tokio::test]
    async fn test_scan_finds_payment_among_others() {
        let mut fx = Fixture::new(2);
        for _ in 0..10 {
            fx.pay_stranger().await;
        }
        let ours = fx.pay_us().await;
        for _ in 0..10 {
            fx.pay_stranger().await;
        }

        let discoveries = fx.scanner.scan_all(&fx.log).await.unwrap();
        assert_eq!(ids(&discoveries), vec![ours]);
        assert_eq!(discoveries[0].index, 10);

        let stats = fx.scanner.stats();
        assert_eq!(stats.total_scanned, 21);
        assert_eq!(stats.owned, 1);
        assert_eq!(stats.errors, 0);
        assert_eq!(stats.tag_rejections + stats.full_checks, 21);
    }

    #[tokio::test]
    async fn test_scan_multiple_in_publication_order() {
        let mut fx = Fixture::new(3);
        let mut expected = Vec::new();
        for i in 0..15 {
            if i % 3 == 0 {
                expected.push(fx.pay_us().await);
            } else {
                fx.pay_stranger().await;
            }
        }

        let config = ScannerConfig::new().batch_size(4);
        let discoveries = fx.scanner.scan_with_config(&fx.log, config).await.unwrap();
        assert_eq!(ids(&discoveries), expected);
        assert_eq!(fx.scanner.position().last_id, 15);
    }

    #[tokio::test]
    async fn test_scan_stop_on_first() {
        let mut fx = Fixture::new(4);
        fx.pay_stranger().await;
        let first = fx.pay_us().await;
        fx.pay_us().await;

        let config = ScannerConfig::new().stop_on_first();
        let discoveries = fx.scanner.scan_with_config(&fx.log, config).await.unwrap();
        assert_eq!(ids(&discoveries), vec![first]);
        assert_eq!(fx.scanner.position().last_id, first);
    }

    #[tokio::test]
    async fn test_scan_id_range() {
        let mut fx = Fixture::new(5);
        for _ in 0..3 {
            fx.pay_us().await;
        }

        let config = ScannerConfig::new().from_id(2).to_id(2);
        let discoveries = fx.scanner.scan_with_config(&fx.log, config).await.unwrap();
        assert_eq!(ids(&discoveries), vec![2]);
        assert_eq!(fx.scanner.stats().total_scanned, 1);
    }

    #[tokio::test]
    async fn test_scan_without_view_tags_finds_the_same() {
        let mut fx = Fixture::new(6);
        let mut expected = Vec::new();
        for i in 0..12 {
            if i % 4 == 1 {
                expected.push(fx.pay_us().await);
            } else {
                fx.pay_stranger().await;
            }
        }

        let config = ScannerConfig::new().without_view_tags();
        let discoveries = fx.scanner.scan_with_config(&fx.log, config).await.unwrap();
        assert_eq!(ids(&discoveries), expected);

        let stats = fx.scanner.stats();
        assert_eq!(stats.tag_rejections, 0);
        assert_eq!(stats.full_checks, 12);
    }

    #[tokio::test]
    async fn test_scan_progress_callback() {
        let mut fx = Fixture::new(7);
        for _ in 0..150 {
            fx.pay_stranger().await;
        }

        let updates = Arc::new(Mutex::new(Vec::new()));
        let updates_clone = updates.clone();
        let callback: ProgressCallback = Box::new(move |progress| {
            updates_clone.lock().push(progress);
        });

        let config = ScannerConfig::new().batch_size(50);
        fx.scanner
            .scan_with_progress(&fx.log, config, callback)
            .await
            .unwrap();

        let updates = updates.lock();
        assert_eq!(updates.len(), 4);
        assert_eq!(updates[0].scanned, 50);
        assert_eq!(updates[0].total, 150);

        let last = updates.last().unwrap();
        assert_eq!(last.scanned, 150);
        assert!(last.percent >= 99.0);
    }

    #[tokio::test]
    async fn test_resume_picks_up_new_announcements() {
        let mut fx = Fixture::new(8);
        fx.pay_us().await;
        fx.pay_stranger().await;
        assert_eq!(fx.scanner.scan_all(&fx.log).await.unwrap().len(), 1);

        let later = vec![fx.pay_us().await, fx.pay_us().await];
        let discoveries = fx.scanner.resume(&fx.log, ScannerConfig::new()).await.unwrap();
        assert_eq!(ids(&discoveries), later);

        let position = fx.scanner.position();
        assert_eq!(position.last_id, 4);
        assert_eq!(position.total_scanned, 4);
        assert_eq!(position.total_discoveries, 3);
    }

    #[tokio::test]
    async fn test_reset_position() {
        let mut fx = Fixture::new(9);
        fx.pay_us().await;

        fx.scanner.scan_all(&fx.log).await.unwrap();
        fx.scanner.reset_position();

        assert_eq!(fx.scanner.position(), ScanPosition::new());
        assert_eq!(fx.scanner.stats().total_scanned, 0);
    }

    #[tokio::test]
    async fn test_parallel_matches_sequential() {
        let mut fx = Fixture::new(10);
        for i in 0..60 {
            if i % 9 == 4 {
                fx.pay_us().await;
            } else {
                fx.pay_stranger().await;
            }
        }

        let sequential = Scanner::from_wallet(&fx.wallet)
            .scan_all(&fx.log)
            .await
            .unwrap();

        let config = ScannerConfig::new().batch_size(16).workers(4);
        let parallel = fx.scanner.scan_parallel(&fx.log, config).await.unwrap();

        assert_eq!(ids(&parallel), ids(&sequential));
        assert_eq!(
            parallel.iter().map(|p| p.index).collect::<Vec<_>>(),
            sequential.iter().map(|p| p.index).collect::<Vec<_>>()
        );

        let stats = fx.scanner.stats();
        assert_eq!(stats.total_scanned, 60);
        assert_eq!(stats.owned, sequential.len() as u64);
        assert_eq!(fx.scanner.position().last_id, 60);
    }

    #[tokio::test]
    async fn test_parallel_stop_on_first() {
        let mut fx = Fixture::new(11);
        for _ in 0..5 {
            fx.pay_stranger().await;
        }
        let first = fx.pay_us().await;
        fx.pay_us().await;

        let config = ScannerConfig::new().batch_size(3).workers(2).stop_on_first();
        let discoveries = fx.scanner.scan_parallel(&fx.log, config).await.unwrap();
        assert_eq!(ids(&discoveries), vec![first]);
        assert_eq!(discoveries[0].index, 5);
        assert_eq!(fx.scanner.position().last_id, first);
    }

    #[tokio::test]
    async fn test_parallel_stop_on_first_counts_prefix_only() {
        let mut fx = Fixture::new(14);
        for _ in 0..4 {
            fx.pay_us().await;
        }
        fx.pay_stranger().await;

        let config = ScannerConfig::new().batch_size(8).workers(2).stop_on_first();
        let discoveries = fx.scanner.scan_parallel(&fx.log, config).await.unwrap();
        assert_eq!(ids(&discoveries), vec![1]);

        let stats = fx.scanner.stats();
        let position = fx.scanner.position();
        assert_eq!(stats.owned, 1);
        assert_eq!(stats.total_scanned, 1);
        assert_eq!(stats.total_scanned, position.total_scanned);
        assert_eq!(stats.owned, position.total_discoveries);
        assert_eq!(position.last_id, 1);

        // Resuming picks up the remaining payments exactly once
        let rest = fx.scanner.resume(&fx.log, ScannerConfig::new()).await.unwrap();
        assert_eq!(ids(&rest), vec![2, 3, 4]);

        let stats = fx.scanner.stats();
        assert_eq!(stats.owned, 4);
        assert_eq!(stats.total_scanned, 5);
        assert_eq!(fx.scanner.position().total_scanned, 5);
    }

    #[tokio::test]
    async fn test_parallel_progress_callback() {
        let mut fx = Fixture::new(15);
        for _ in 0..40 {
            fx.pay_stranger().await;
        }

        let updates = Arc::new(Mutex::new(Vec::new()));
        let updates_clone = updates.clone();
        let callback: ProgressCallback = Box::new(move |progress| {
            updates_clone.lock().push(progress.scanned);
        });

        let config = ScannerConfig::new().batch_size(10).workers(3);
        fx.scanner
            .scan_parallel_with_progress(&fx.log, config, callback)
            .await
            .unwrap();

        assert_eq!(*updates.lock(), vec![10, 20, 30, 40, 40]);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let fx = Fixture::new(12);

        for config in [
            ScannerConfig::new().batch_size(0),
            ScannerConfig::new().batch_size(MAX_SCAN_BATCH_SIZE + 1),
            ScannerConfig::new().workers(0),
            ScannerConfig::new().from_id(5).to_id(2),
        ] {
            assert!(matches!(
                fx.scanner.scan_with_config(&fx.log, config.clone()).await,
                Err(ShadeError::ConfigError(_))
            ));
            assert!(matches!(
                fx.scanner.scan_parallel(&fx.log, config).await,
                Err(ShadeError::ConfigError(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_scan_one_invalid_announcement() {
        let mut fx = Fixture::new(13);
        let payment = create_stealth_payment(fx.wallet.meta_address(), &mut fx.rng).unwrap();

        assert!(fx.scanner.scan_one(&payment.announcement).is_owned());

        let mut invalid = payment.announcement;
        invalid.timestamp = u64::MAX / 2;
        assert!(matches!(fx.scanner.scan_one(&invalid), ScanResult::Invalid(_)));
        assert_eq!(fx.scanner.stats().errors, 1);
    }

    #[test]
    fn test_scan_progress_eta() {
        let mut progress = ScanProgress::new(1000);

        // 500 scanned in 1000ms
        progress.update(500, 2, 1000);

        assert!((progress.percent - 50.0).abs() < 0.1);
        assert!((progress.rate - 500.0).abs() < 1.0);
        assert!((progress.eta_seconds.unwrap() - 1.0).abs() < 0.1);
    }

    #[test]
    fn test_summary_from_stats() {
        let stats = ScanStats {
            total_scanned: 100,
            tag_rejections: 99,
            full_checks: 1,
            owned: 1,
            errors: 0,
            duration_ms: 50,
        };
        let summary = ScanSummary::from(stats);
        assert_eq!(summary.discoveries, 1);
        assert!((summary.filter_efficiency - 99.0).abs() < 1e-9);
        assert!((summary.rate - 2000.0).abs() < 1e-9);
    }
}
