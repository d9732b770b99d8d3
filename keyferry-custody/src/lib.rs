//! Custodial key-import client for Keyferry
//!
//! This crate transfers a recovered burner-wallet key into a third-party
//! custodial key-management service. The key is sealed with HPKE to the
//! service's ephemeral encryption public key and delivered over a strictly
//! sequential two-phase protocol (`init`, then `submit`). Raw key material
//! is never transmitted except as HPKE ciphertext and never survives the
//! import attempt.

/// Custody import client (two-phase state machine)
pub mod client;

/// Custody service configuration
pub mod config;

/// Error types
pub mod error;

/// HPKE sealing of raw private keys
pub mod hpke;

/// End-to-end decode-and-import flow
pub mod transfer;

// Re-export key types for convenience
pub use client::{CustodyClient, ImportPhase};
pub use config::CustodyConfig;
pub use error::{Error, Result};
pub use transfer::transfer_wallet;

pub use crate::hpke::{seal, SealedKey};

/// Version of the keyferry-custody crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
