//! # SHADE Core
//!
//! Core types, curve engine, errors, and traits for the SHADE stealth address protocol.
//!
//! This crate provides the foundational building blocks used by all other SHADE crates:
//!
//! - **Curve**: secp256k1 point/scalar arithmetic and SEC1 point encodings
//! - **Types**: Domain models for keys, meta-addresses, stealth addresses, and announcements
//! - **Errors**: The protocol error taxonomy
//! - **Constants**: Protocol constants and sizes
//! - **Traits**: Interfaces for the announcement log and claim registry collaborators
//!
//! ## Example
//!
//! ```rust
//! use shade_core::{MetaAddress, Scalar, PublicKey};
//!
//! let spend = PublicKey::from_secret(&Scalar::from_u64(1).unwrap());
//! let view = PublicKey::from_secret(&Scalar::from_u64(2).unwrap());
//! let meta = MetaAddress::new(spend, view);
//!
//! let encoded = meta.encode();
//! assert_eq!(encoded.len(), 66);
//! assert_eq!(MetaAddress::decode(&encoded).unwrap(), meta);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod curve;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use curve::{Point, Scalar};
pub use error::{Result, ShadeError};
pub use traits::*;
pub use types::*;
