//! In-memory claim registry.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, instrument};

use shade_core::error::{Result, ShadeError};
use shade_core::traits::ClaimRegistry;
use shade_core::types::StealthAddress;

/// Set of claimed stealth addresses with their claim time (Unix seconds).
///
/// `mark_claimed` goes through the map's entry API, so two racing claims on
/// the same address cannot both succeed.
#[derive(Debug, Default)]
pub struct MemoryClaimRegistry {
    claimed: DashMap<StealthAddress, u64>,
}

impl MemoryClaimRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of claimed addresses.
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    /// Returns true if nothing has been claimed.
    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }

    /// When the address was claimed, if it was.
    pub fn claimed_at(&self, address: &StealthAddress) -> Option<u64> {
        self.claimed.get(address).map(|entry| *entry.value())
    }

    fn now() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

#[async_trait]
impl ClaimRegistry for MemoryClaimRegistry {
    async fn is_claimed(&self, address: &StealthAddress) -> Result<bool> {
        Ok(self.claimed.contains_key(address))
    }

    #[instrument(skip(self), fields(address = %address))]
    async fn mark_claimed(&self, address: &StealthAddress) -> Result<()> {
        match self.claimed.entry(*address) {
            Entry::Occupied(_) => Err(ShadeError::AlreadyClaimed(address.to_hex_string())),
            Entry::Vacant(slot) => {
                slot.insert(Self::now());
                debug!("Marked claimed");
                Ok(())
            }
        }
    }
}
