//! # SHADE Registry
//!
//! Reference implementations of the two collaborators the protocol core
//! talks to but never owns:
//!
//! - **Announcement log**: append-only, publication-ordered, indexed by view tag
//! - **Claim registry**: at-most-once record of claimed stealth addresses
//!
//! Both are in-memory and not durable.
//!
//! ## Example
//!
//! ```rust
//! use shade_core::{Announcement, AnnouncementLog, PublicKey, Scalar, StealthAddress};
//! use shade_registry::MemoryAnnouncementLog;
//!
//! # tokio_test::block_on(async {
//! let log = MemoryAnnouncementLog::new();
//!
//! let ephemeral = PublicKey::from_secret(&Scalar::from_u64(7).unwrap());
//! let ann = Announcement::new(StealthAddress::from_array([1; 20]), ephemeral, 0x42);
//! let id = log.publish(ann).await.unwrap();
//!
//! // Query by view tag
//! let matching = log.get_by_view_tag(0x42).await.unwrap();
//! assert_eq!(matching[0].id, id);
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod claims;
mod memory;

pub use claims::MemoryClaimRegistry;
pub use memory::MemoryAnnouncementLog;

// Re-export the traits from core
pub use shade_core::traits::{AnnouncementLog, ClaimRegistry};
