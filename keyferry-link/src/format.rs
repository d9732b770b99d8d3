//! Versioned wallet-link blob codec
//!
//! Three mutually incompatible wire formats are in circulation:
//!
//! - **v2** (legacy): base64 of a complete encrypted keystore document
//! - **v3**: base64 of `{account}|{keystore}`
//! - **v4**: base64 of `{account}|{accountFactory}|{keystore}`
//!
//! The version tag is parsed exactly once into [`WalletLinkVersion`] and
//! selects exactly one decode path; unknown tags fail closed and never
//! partially decode.

use crate::config::CommunityConfig;
use crate::error::{Error, Result};
use crate::keystore::{
    decrypt_keystore, encrypt_keystore, parse_keystore, RawPrivateKey,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// The wire-format version of a wallet link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletLinkVersion {
    /// Legacy: bare keystore document
    V2,
    /// Account and keystore
    V3,
    /// Account, account-factory address and keystore
    V4,
}

impl WalletLinkVersion {
    /// The literal prefix carried on the wire
    pub fn prefix(&self) -> &'static str {
        match self {
            WalletLinkVersion::V2 => "v2-",
            WalletLinkVersion::V3 => "v3-",
            WalletLinkVersion::V4 => "v4-",
        }
    }

    /// Splits a wire segment into its version tag and payload
    fn strip(segment: &str) -> Result<(Self, &str)> {
        for version in [
            WalletLinkVersion::V2,
            WalletLinkVersion::V3,
            WalletLinkVersion::V4,
        ] {
            if let Some(payload) = segment.strip_prefix(version.prefix()) {
                return Ok((version, payload));
            }
        }
        Err(Error::Decode(
            "unsupported wallet link version".to_string(),
        ))
    }
}

/// A versioned wallet-link blob, parsed from a deep-link fragment.
///
/// Consumed once and never persisted.
#[derive(Debug, Clone)]
pub struct WalletLinkBlob {
    /// Wire-format version
    pub version: WalletLinkVersion,
    /// Opaque base64 payload
    pub payload: String,
}

impl WalletLinkBlob {
    /// Parses a wire segment (`v3-...`) into a blob
    pub fn parse(segment: &str) -> Result<Self> {
        let (version, payload) = WalletLinkVersion::strip(segment)?;
        if payload.is_empty() {
            return Err(Error::Decode("wallet link payload is empty".to_string()));
        }
        Ok(Self {
            version,
            payload: payload.to_string(),
        })
    }
}

/// The uniform result of decoding a wallet link of any version
#[derive(Debug)]
pub struct DecodedWallet {
    /// The wallet's account address. For v2 blobs, which carry no account,
    /// this is recomputed from the recovered key.
    pub account: String,

    /// Account-factory address, present for v4 blobs only
    pub account_factory: Option<String>,

    /// The recovered signing key, zeroized on drop
    pub private_key: RawPrivateKey,
}

/// Decodes a wallet-link blob into the account, optional account factory
/// and raw private key
pub fn decode_blob(blob: &WalletLinkBlob, community: &CommunityConfig) -> Result<DecodedWallet> {
    let password = community.burner_password()?;

    let raw = BASE64
        .decode(&blob.payload)
        .map_err(|e| Error::Decode(format!("payload is not valid base64: {}", e)))?;
    let text = String::from_utf8(raw)
        .map_err(|_| Error::Decode("payload is not valid UTF-8".to_string()))?;

    match blob.version {
        WalletLinkVersion::V2 => {
            let document = parse_keystore(&text)?;
            let private_key = decrypt_keystore(&document, password)?;
            let account = private_key.address()?;
            Ok(DecodedWallet {
                account,
                account_factory: None,
                private_key,
            })
        }
        WalletLinkVersion::V3 => {
            let fields = split_fields(&text, 2)?;
            let document = parse_keystore(fields[1])?;
            let private_key = decrypt_keystore(&document, password)?;
            Ok(DecodedWallet {
                account: fields[0].to_string(),
                account_factory: None,
                private_key,
            })
        }
        WalletLinkVersion::V4 => {
            let fields = split_fields(&text, 3)?;
            let document = parse_keystore(fields[2])?;
            let private_key = decrypt_keystore(&document, password)?;
            Ok(DecodedWallet {
                account: fields[0].to_string(),
                account_factory: Some(fields[1].to_string()),
                private_key,
            })
        }
    }
}

/// Encodes a wallet as a v3 blob: `v3-` + base64(`account|keystore`).
///
/// Re-encryption is non-deterministic, so two encodings of the same wallet
/// differ on the wire while recovering the identical key.
pub fn encode_v3(
    account: &str,
    key: &RawPrivateKey,
    community: &CommunityConfig,
) -> Result<String> {
    let password = community.burner_password()?;
    let document = encrypt_keystore(key, password)?;
    let json = serde_json::to_string(&document)
        .map_err(|e| Error::Serialization(format!("keystore document: {}", e)))?;
    Ok(format!(
        "{}{}",
        WalletLinkVersion::V3.prefix(),
        BASE64.encode(format!("{}|{}", account, json))
    ))
}

/// Encodes a wallet as a v4 blob: `v4-` + base64(`account|factory|keystore`)
pub fn encode_v4(
    account: &str,
    account_factory: &str,
    key: &RawPrivateKey,
    community: &CommunityConfig,
) -> Result<String> {
    let password = community.burner_password()?;
    let document = encrypt_keystore(key, password)?;
    let json = serde_json::to_string(&document)
        .map_err(|e| Error::Serialization(format!("keystore document: {}", e)))?;
    Ok(format!(
        "{}{}",
        WalletLinkVersion::V4.prefix(),
        BASE64.encode(format!("{}|{}|{}", account, account_factory, json))
    ))
}

/// Upgrades a v3 blob to v4, choosing the account-factory address from the
/// community's alias table (falling back to its primary factory)
pub fn upgrade_v3_to_v4(
    blob: &WalletLinkBlob,
    alias: &str,
    community: &CommunityConfig,
) -> Result<String> {
    if blob.version != WalletLinkVersion::V3 {
        return Err(Error::Decode(format!(
            "only v3 blobs can be upgraded, got {}",
            blob.version.prefix()
        )));
    }
    let wallet = decode_blob(blob, community)?;
    let factory = community.account_factory(alias);
    encode_v4(&wallet.account, factory, &wallet.private_key, community)
}

/// Splits a payload on `|`, requiring exactly `expected` non-empty fields
fn split_fields(text: &str, expected: usize) -> Result<Vec<&str>> {
    let fields: Vec<&str> = text.split('|').collect();
    if fields.len() != expected {
        return Err(Error::Format(format!(
            "expected {} fields, found {}",
            expected,
            fields.len()
        )));
    }
    if fields.iter().any(|field| field.is_empty()) {
        return Err(Error::Format("payload contains an empty field".to_string()));
    }
    Ok(fields)
}
