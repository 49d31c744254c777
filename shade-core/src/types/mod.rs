//! Domain types for SHADE.
//!
//! This module provides the data structures used throughout the protocol:
//!
//! - [`KeyPair`]: secp256k1 secret/public key pair
//! - [`MetaAddress`]: Published address for receiving private payments
//! - [`StealthAddress`]: One-time address for a specific payment
//! - [`StealthKeyPair`]: The key that spends from a stealth address
//! - [`Announcement`]: Published ephemeral key + view tag

mod address;
mod announcement;
mod keys;

pub use address::*;
pub use announcement::*;
pub use keys::*;
