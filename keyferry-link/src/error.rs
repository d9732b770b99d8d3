//! Error types for the keyferry-link crate.

use std::result;
use thiserror::Error;

/// Wallet-link error types.
#[derive(Debug, Error)]
pub enum Error {
    /// Error decoding a deep link or a versioned blob.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Error related to a malformed payload (wrong field count, empty fields).
    #[error("Format error: {0}")]
    Format(String),

    /// Error resolving or running the key-derivation function.
    #[error("KDF error: {0}")]
    Kdf(String),

    /// Error decrypting a keystore (MAC mismatch, corrupt ciphertext).
    #[error("Decrypt error: {0}")]
    Decrypt(String),

    /// Error related to missing or invalid configuration.
    #[error("Missing configuration: {0}")]
    Config(String),

    /// Error related to serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Custom Result type for wallet-link operations.
pub type Result<T> = result::Result<T, Error>;
