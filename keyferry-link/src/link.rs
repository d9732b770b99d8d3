//! Deep-link decoding boundary
//!
//! A wallet deep link looks like
//! `scheme://host/path#/x/{version}-{base64payload}?ignored=params`; only the
//! third `/`-delimited fragment segment is consumed. Decoding never panics on
//! malformed input: every failure comes back as an error value so the caller
//! can present a generic "invalid code" message without leaking
//! cryptographic detail.

use crate::config::CommunityConfig;
use crate::error::{Error, Result};
use crate::format::{decode_blob, DecodedWallet, WalletLinkBlob};
use tracing::warn;
use url::Url;

/// Extracts the versioned wallet blob from a deep-link URL
pub fn parse_deep_link(deep_link: &str) -> Result<WalletLinkBlob> {
    let url = Url::parse(deep_link)
        .map_err(|e| Error::Decode(format!("invalid deep link: {}", e)))?;
    let fragment = url
        .fragment()
        .ok_or_else(|| Error::Decode("deep link has no fragment".to_string()))?;

    let segment = fragment
        .split('/')
        .nth(2)
        .ok_or_else(|| Error::Decode("deep link fragment has no wallet segment".to_string()))?;

    // Some producers append query-style parameters after the blob
    let segment = segment.split('?').next().unwrap_or(segment);

    WalletLinkBlob::parse(segment)
}

/// Decodes a wallet deep link end to end.
///
/// This is the decode boundary: every downstream failure is logged as a
/// diagnostic and returned as a value, never surfaced raw to a user.
pub fn decode_deep_link(deep_link: &str, community: &CommunityConfig) -> Result<DecodedWallet> {
    parse_deep_link(deep_link)
        .and_then(|blob| decode_blob(&blob, community))
        .map_err(|err| {
            warn!("wallet link decode failed: {}", err);
            err
        })
}
