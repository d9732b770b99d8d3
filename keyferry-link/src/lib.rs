//! Wallet-link wire formats and keystore recovery
//!
//! This crate decodes the versioned wallet-link blobs embedded in community
//! deep links, resolves the password-based KDF named by the keystore
//! document, and recovers the raw signing key after MAC verification. It is
//! the wire-format layer consumed by the custody transfer client.

/// Community configuration (shared password, account-factory aliases)
pub mod config;

/// Error types
pub mod error;

/// Versioned blob codec (v2 legacy, v3, v4)
pub mod format;

/// Encrypted keystore handling (KDF resolution, decrypt, encrypt)
pub mod keystore;

/// Deep-link decoding boundary
pub mod link;

// Re-export key types for convenience
pub use config::CommunityConfig;
pub use error::{Error, Result};
pub use format::{
    decode_blob, encode_v3, encode_v4, upgrade_v3_to_v4, DecodedWallet, WalletLinkBlob,
    WalletLinkVersion,
};
pub use keystore::{
    decrypt_keystore, encrypt_keystore, encrypt_keystore_with, parse_keystore, DerivedKey, Kdf,
    KeystoreDocument, Pbkdf2Params, RawPrivateKey, ScryptParams,
};
pub use link::{decode_deep_link, parse_deep_link};

/// Version of the keyferry-link crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
