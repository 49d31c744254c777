//! # SHADE Stealth Address Protocol
//!
//! High-level API for creating, discovering and spending from stealth addresses.
//!
//! This crate provides:
//!
//! - **Generation**: one-time addresses for a recipient's meta-address ([`payment`])
//! - **Scanning**: ownership checks with the view-tag fast path ([`discovery`])
//! - **Recovery**: the one-time private key for an owned address ([`recover`])
//! - **Wallet**: recipient-side bundle of the above ([`wallet`])
//!
//! ## Quick Start
//!
//! ```rust
//! use rand::rngs::OsRng;
//! use shade_stealth::{create_stealth_payment, ShadeWallet};
//!
//! // Recipient: generate keys and publish the meta-address
//! let wallet = ShadeWallet::generate(&mut OsRng).unwrap();
//! let meta_address = *wallet.meta_address();
//!
//! // Sender: create a payment, send funds to the address, publish the announcement
//! let payment = create_stealth_payment(&meta_address, &mut OsRng).unwrap();
//!
//! // Recipient: discover it and get the spending key
//! let keys = wallet.try_discover(&payment.announcement).unwrap().unwrap();
//! assert_eq!(keys.address(), &payment.stealth_address);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod discovery;
pub mod payment;
pub mod recover;
pub mod wallet;

pub use discovery::{
    check_ownership, scan_announcement, scan_announcements, DiscoveredPayment, ScanResult,
    ScanStats,
};
pub use payment::{
    create_stealth_payment, generate_stealth_address, generate_with_ephemeral, PaymentMetadata,
    StealthPayment, StealthPaymentBuilder,
};
pub use recover::{recover_from_announcement, recover_stealth_key};
pub use wallet::ShadeWallet;
