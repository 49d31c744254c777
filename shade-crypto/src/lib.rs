//! # SHADE Cryptography
//!
//! Hashing and key derivation for the SHADE stealth address protocol,
//! built on the secp256k1 curve engine in `shade-core`.
//!
//! This crate provides:
//!
//! - **Hash**: Keccak-256
//! - **ECDH**: shared secret digest, reduced scalar and view tag
//! - **View Tags**: constant-time verification and distribution stats
//! - **Derivation**: stealth public/private keys and 20-byte addresses
//!
//! ## Security Properties
//!
//! - Curve arithmetic is constant-time (`k256`)
//! - Shared secrets and private scalars are zeroized on drop
//! - View tag comparison is constant-time
//!
//! ## Example
//!
//! ```rust
//! use shade_core::{KeyPair, Scalar};
//! use shade_crypto::SharedSecret;
//!
//! let ephemeral = KeyPair::from_secret(Scalar::from_u64(3).unwrap());
//! let view = KeyPair::from_secret(Scalar::from_u64(2).unwrap());
//!
//! // Sender and recipient reach the same secret
//! let sender = SharedSecret::derive(ephemeral.secret(), view.public()).unwrap();
//! let recipient = SharedSecret::derive(view.secret(), ephemeral.public()).unwrap();
//! assert_eq!(sender.view_tag(), recipient.view_tag());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod derive;
pub mod ecdh;
pub mod hash;
pub mod view_tag;

// Re-export main functions at crate root
pub use derive::{derive_stealth_address, derive_stealth_private_key, derive_stealth_public_key};
pub use ecdh::SharedSecret;
pub use hash::keccak256;
pub use view_tag::{verify_view_tag, ViewTagStats};
