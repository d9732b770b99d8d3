//! Error types for the keyferry-custody crate.

use std::result;
use thiserror::Error;

/// Custody transfer error types.
#[derive(Debug, Error)]
pub enum Error {
    /// Wallet-link decode errors from the wire-format layer.
    #[error("Link error: {0}")]
    Link(#[from] keyferry_link::Error),

    /// Non-success response from the custody service. The body is surfaced
    /// for diagnostics; retrying is an external concern.
    #[error("Custody service error: status {status}: {body}")]
    Service {
        /// HTTP status code returned by the service
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Transport-level failure reaching the custody service (including
    /// timeouts).
    #[error("Networking error: {0}")]
    Networking(String),

    /// HPKE deserialize/seal failure. A wrong recipient key must never
    /// silently produce misdirected ciphertext.
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Error related to missing configuration.
    #[error("Missing configuration: {0}")]
    Config(String),

    /// Error related to serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Custom Result type for custody operations.
pub type Result<T> = result::Result<T, Error>;
