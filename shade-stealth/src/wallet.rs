//! SHADE wallet implementation.
//!
//! The wallet holds a recipient's spend and view key pairs and provides
//! high-level operations for receiving stealth payments.

use rand::{CryptoRng, RngCore};
use tracing::{debug, instrument};

use shade_core::error::{Result, ShadeError};
use shade_core::traits::ClaimRegistry;
use shade_core::types::{Announcement, MetaAddress, ShadeKeys, StealthKeyPair, ViewingKey};

use crate::discovery::{scan_announcement, ScanResult};
use crate::recover::recover_from_announcement;

/// A SHADE wallet containing keys for receiving private payments.
///
/// The wallet holds:
/// - Spend keys: for deriving stealth private keys and spending funds
/// - View keys: for scanning announcements (can be delegated via [`ShadeWallet::viewing_key`])
pub struct ShadeWallet {
    /// The complete key set (zeroized on drop)
    keys: ShadeKeys,
    /// Cached meta-address
    meta_address: MetaAddress,
}

impl ShadeWallet {
    /// Generates a new wallet with random keys.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rand::rngs::OsRng;
    /// use shade_stealth::ShadeWallet;
    ///
    /// let wallet = ShadeWallet::generate(&mut OsRng).unwrap();
    /// assert_eq!(wallet.meta_address().to_hex().len(), 132);
    /// ```
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        Ok(Self::from_keys(ShadeKeys::generate(rng)?))
    }

    /// Creates a wallet from existing keys.
    pub fn from_keys(keys: ShadeKeys) -> Self {
        let meta_address = keys.meta_address();
        Self { keys, meta_address }
    }

    /// Returns the meta-address for publishing.
    pub fn meta_address(&self) -> &MetaAddress {
        &self.meta_address
    }

    /// Returns the key set.
    pub fn keys(&self) -> &ShadeKeys {
        &self.keys
    }

    /// Returns the scanning capability: view private key + spend public key.
    ///
    /// Can be handed to a scanning service without granting spend rights.
    pub fn viewing_key(&self) -> ViewingKey {
        self.keys.viewing_key()
    }

    /// Attempts to discover a payment from an announcement.
    ///
    /// # Returns
    ///
    /// `Ok(Some(StealthKeyPair))` if this announcement is ours,
    /// `Ok(None)` if it is not (tag or address mismatch),
    /// `Err(_)` if the announcement is malformed.
    pub fn try_discover(&self, announcement: &Announcement) -> Result<Option<StealthKeyPair>> {
        match scan_announcement(announcement, &self.viewing_key(), true) {
            ScanResult::Owned => self.recover(announcement).map(Some),
            ScanResult::TagMismatch | ScanResult::NotOwned => Ok(None),
            ScanResult::Invalid(e) => Err(e),
        }
    }

    /// Recovers the stealth key pair for an announcement.
    ///
    /// # Errors
    /// `AddressMismatch` if the announcement is not ours.
    pub fn recover(&self, announcement: &Announcement) -> Result<StealthKeyPair> {
        recover_from_announcement(announcement, &self.keys)
    }

    /// Recovers the key for an announcement and records the claim.
    ///
    /// Already-claimed addresses are refused before any key work. A failed
    /// recovery leaves the registry untouched.
    #[instrument(skip(self, announcement, registry), fields(address = %announcement.stealth_address))]
    pub async fn claim(
        &self,
        announcement: &Announcement,
        registry: &dyn ClaimRegistry,
    ) -> Result<StealthKeyPair> {
        let address = announcement.stealth_address;

        if registry.is_claimed(&address).await? {
            return Err(ShadeError::AlreadyClaimed(address.to_hex_string()));
        }

        let keypair = self.recover(announcement)?;
        registry.mark_claimed(&address).await?;

        debug!("stealth address claimed");
        Ok(keypair)
    }
}

impl std::fmt::Debug for ShadeWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShadeWallet")
            .field("meta_address", &self.meta_address)
            .field("keys", &"[REDACTED]")
            .finish()
    }
}
