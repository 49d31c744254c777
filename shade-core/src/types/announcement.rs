//! Announcement types for the SHADE announcement log.
//!
//! Senders publish an announcement next to every stealth payment. Recipients
//! scan announcements to find payments addressed to them.

use serde::{Deserialize, Serialize};

use super::address::{StealthAddress, ViewTag};
use super::keys::PublicKey;
use crate::constants::{
    ANNOUNCEMENT_HEADER_SIZE, COMPRESSED_POINT_SIZE, MAX_ANNOUNCEMENT_METADATA_SIZE,
    MAX_TIMESTAMP_SKEW_SECS, STEALTH_ADDRESS_SIZE, VIEW_TAG_SPACE,
};
use crate::error::{Result, ShadeError};

/// An announcement published to the log.
///
/// # Wire Format (binary)
/// ```text
/// stealth_address (20) || ephemeral_pub (33) || view_tag (1) || timestamp (8, LE)
///     || metadata_len (4, LE) || metadata
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    /// Unique identifier (assigned by the log, publication order)
    pub id: u64,
    /// The one-time address funds were sent to
    pub stealth_address: StealthAddress,
    /// Sender's ephemeral public key
    pub ephemeral_pub: PublicKey,
    /// View tag for efficient filtering
    pub view_tag: ViewTag,
    /// Unix timestamp when announcement was created
    pub timestamp: u64,
    /// Free-form caller data (token, amount hints, ...)
    #[serde(with = "hex", default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<u8>,
}

impl Announcement {
    /// Creates a new announcement stamped with the current time.
    pub fn new(stealth_address: StealthAddress, ephemeral_pub: PublicKey, view_tag: ViewTag) -> Self {
        Self {
            id: 0, // Assigned by the log
            stealth_address,
            ephemeral_pub,
            view_tag,
            timestamp: Self::current_timestamp(),
            metadata: Vec::new(),
        }
    }

    /// Attaches metadata bytes.
    pub fn with_metadata(mut self, metadata: Vec<u8>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Validates the announcement structure.
    ///
    /// The ephemeral key is already a valid curve point by construction.
    pub fn validate(&self) -> Result<()> {
        if self.metadata.len() > MAX_ANNOUNCEMENT_METADATA_SIZE {
            return Err(ShadeError::InvalidAnnouncement(format!(
                "metadata too large: {} bytes, maximum {}",
                self.metadata.len(),
                MAX_ANNOUNCEMENT_METADATA_SIZE
            )));
        }

        let now = Self::current_timestamp();
        if self.timestamp > now + MAX_TIMESTAMP_SKEW_SECS {
            return Err(ShadeError::InvalidAnnouncement(
                "timestamp is too far in the future".into(),
            ));
        }

        Ok(())
    }

    /// Serializes to compact binary format. The id is not included.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(ANNOUNCEMENT_HEADER_SIZE + self.metadata.len());
        bytes.extend_from_slice(self.stealth_address.as_bytes());
        bytes.extend_from_slice(&self.ephemeral_pub.to_compressed());
        bytes.push(self.view_tag);
        bytes.extend_from_slice(&self.timestamp.to_le_bytes());
        bytes.extend_from_slice(&(self.metadata.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&self.metadata);
        bytes
    }

    /// Deserializes from compact binary format.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < ANNOUNCEMENT_HEADER_SIZE {
            return Err(ShadeError::InvalidAnnouncement(format!(
                "too short: {} bytes, minimum {}",
                bytes.len(),
                ANNOUNCEMENT_HEADER_SIZE
            )));
        }

        let (address_bytes, rest) = bytes.split_at(STEALTH_ADDRESS_SIZE);
        let (ephemeral_bytes, rest) = rest.split_at(COMPRESSED_POINT_SIZE);
        let (tag_byte, rest) = rest.split_at(1);
        let (timestamp_bytes, rest) = rest.split_at(8);
        let (len_bytes, metadata) = rest.split_at(4);

        let stealth_address = StealthAddress::from_bytes(address_bytes)?;
        let ephemeral_pub = PublicKey::from_compressed(ephemeral_bytes)
            .map_err(|e| ShadeError::InvalidAnnouncement(format!("ephemeral key: {}", e)))?;
        let timestamp = u64::from_le_bytes(
            timestamp_bytes
                .try_into()
                .map_err(|_| ShadeError::InvalidAnnouncement("invalid timestamp".into()))?,
        );
        let metadata_len = u32::from_le_bytes(
            len_bytes
                .try_into()
                .map_err(|_| ShadeError::InvalidAnnouncement("invalid metadata length".into()))?,
        ) as usize;

        if metadata.len() != metadata_len {
            return Err(ShadeError::InvalidAnnouncement(format!(
                "metadata length mismatch: header says {}, got {}",
                metadata_len,
                metadata.len()
            )));
        }

        let announcement = Self {
            id: 0, // ID is assigned by the log, not serialized
            stealth_address,
            ephemeral_pub,
            view_tag: tag_byte[0],
            timestamp,
            metadata: metadata.to_vec(),
        };

        announcement.validate()?;
        Ok(announcement)
    }

    /// Returns current Unix timestamp in seconds.
    fn current_timestamp() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Builder for creating announcements with optional fields.
#[derive(Default)]
pub struct AnnouncementBuilder {
    stealth_address: Option<StealthAddress>,
    ephemeral_pub: Option<PublicKey>,
    view_tag: Option<ViewTag>,
    timestamp: Option<u64>,
    metadata: Vec<u8>,
}

impl AnnouncementBuilder {
    /// Creates a new announcement builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the stealth address (required).
    pub fn stealth_address(mut self, address: StealthAddress) -> Self {
        self.stealth_address = Some(address);
        self
    }

    /// Sets the ephemeral public key (required).
    pub fn ephemeral_pub(mut self, key: PublicKey) -> Self {
        self.ephemeral_pub = Some(key);
        self
    }

    /// Sets the view tag (required).
    pub fn view_tag(mut self, tag: ViewTag) -> Self {
        self.view_tag = Some(tag);
        self
    }

    /// Sets a custom timestamp (optional, defaults to now).
    pub fn timestamp(mut self, ts: u64) -> Self {
        self.timestamp = Some(ts);
        self
    }

    /// Sets metadata bytes (optional).
    pub fn metadata(mut self, metadata: Vec<u8>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Builds the announcement.
    pub fn build(self) -> Result<Announcement> {
        let stealth_address = self
            .stealth_address
            .ok_or_else(|| ShadeError::ValidationError("stealth_address is required".into()))?;

        let ephemeral_pub = self
            .ephemeral_pub
            .ok_or_else(|| ShadeError::ValidationError("ephemeral_pub is required".into()))?;

        let view_tag = self
            .view_tag
            .ok_or_else(|| ShadeError::ValidationError("view_tag is required".into()))?;

        let mut announcement =
            Announcement::new(stealth_address, ephemeral_pub, view_tag).with_metadata(self.metadata);

        if let Some(ts) = self.timestamp {
            announcement.timestamp = ts;
        }

        announcement.validate()?;
        Ok(announcement)
    }
}

/// Statistics about announcements in a log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnnouncementStats {
    /// Total number of announcements
    pub total_count: u64,
    /// Announcements per view tag (for distribution analysis)
    pub view_tag_distribution: Vec<u64>,
    /// Earliest announcement timestamp
    pub earliest_timestamp: Option<u64>,
    /// Latest announcement timestamp
    pub latest_timestamp: Option<u64>,
    /// Number of announcements carrying metadata
    pub with_metadata_count: u64,
}

impl Default for AnnouncementStats {
    fn default() -> Self {
        Self {
            total_count: 0,
            view_tag_distribution: vec![0; VIEW_TAG_SPACE],
            earliest_timestamp: None,
            latest_timestamp: None,
            with_metadata_count: 0,
        }
    }
}

impl AnnouncementStats {
    /// Creates empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates stats with a new announcement.
    pub fn add(&mut self, announcement: &Announcement) {
        self.total_count += 1;
        self.view_tag_distribution[announcement.view_tag as usize] += 1;

        self.earliest_timestamp = Some(
            self.earliest_timestamp
                .map_or(announcement.timestamp, |t| t.min(announcement.timestamp)),
        );
        self.latest_timestamp = Some(
            self.latest_timestamp
                .map_or(announcement.timestamp, |t| t.max(announcement.timestamp)),
        );

        if !announcement.metadata.is_empty() {
            self.with_metadata_count += 1;
        }
    }

    /// Largest share of announcements under a single tag, in [0, 1].
    ///
    /// Close to 1/256 for a healthy log.
    pub fn max_tag_share(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        let max = self.view_tag_distribution.iter().copied().max().unwrap_or(0);
        max as f64 / self.total_count as f64
    }
}
