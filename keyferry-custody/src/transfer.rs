//! End-to-end wallet transfer
//!
//! Decodes a wallet deep link and imports the recovered key into the
//! custody service. The raw key lives only inside this scope and is
//! zeroized on every exit path, whether the decode fails, a network phase
//! fails, or the import completes.

use crate::client::CustodyClient;
use crate::error::Result;
use keyferry_link::{decode_deep_link, CommunityConfig};

/// Decodes a wallet deep link and imports its key, returning the imported
/// wallet's address
pub async fn transfer_wallet(
    client: &CustodyClient,
    deep_link: &str,
    community: &CommunityConfig,
    access_token: &str,
) -> Result<String> {
    let wallet = decode_deep_link(deep_link, community)?;
    // wallet.private_key is dropped (and zeroized) when this scope ends
    client
        .import_private_key(&wallet.private_key, access_token)
        .await
}
