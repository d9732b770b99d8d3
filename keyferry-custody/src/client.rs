//! Custodial import client
//!
//! Moves a recovered burner-wallet key into the custody service with a
//! two-phase protocol: an authenticated `init` call returns the service's
//! ephemeral encryption public key, the raw key is HPKE-sealed to it, and an
//! authenticated `submit` call delivers the ciphertext.
//!
//! The two calls are strictly sequential. There is no cross-phase retry: the
//! service may rotate its encryption key between `init` calls, so any
//! failure after `Initiated` restarts the whole flow from `Idle`.

use crate::config::CustodyConfig;
use crate::error::{Error, Result};
use crate::hpke::seal;
use keyferry_link::RawPrivateKey;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use zeroize::Zeroize;

/// Chain type reported to the custody service
const CHAIN_TYPE: &str = "ethereum";
/// Entropy type reported to the custody service
const ENTROPY_TYPE: &str = "private-key";
/// Encryption scheme reported to the custody service
const ENCRYPTION_TYPE: &str = "HPKE";

/// Phases of one import attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    /// Nothing sent yet
    Idle,
    /// `init` request in flight or answered
    Initiated,
    /// Raw key sealed to the service's encryption key
    Sealed,
    /// `submit` request in flight
    Submitted,
    /// Key accepted by the service
    Complete,
    /// Attempt aborted; a new attempt starts over from `Idle`
    Failed,
}

#[derive(Debug, Serialize)]
struct InitRequest<'a> {
    address: &'a str,
    chain_type: &'a str,
    entropy_type: &'a str,
    encryption_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct InitResponse {
    encryption_public_key: String,
    #[serde(default)]
    encryption_type: String,
}

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    wallet: SubmitWallet<'a>,
}

#[derive(Debug, Serialize)]
struct SubmitWallet<'a> {
    address: &'a str,
    chain_type: &'a str,
    entropy_type: &'a str,
    encryption_type: &'a str,
    ciphertext: String,
    encapsulated_key: String,
}

/// Client for the custody provider's two-endpoint import API
pub struct CustodyClient {
    config: CustodyConfig,
    http_client: Client,
}

impl CustodyClient {
    /// Creates a new CustodyClient with a bounded per-request timeout
    pub fn new(config: CustodyConfig) -> Result<Self> {
        config.validate()?;
        let timeout = Duration::from_secs(config.timeout_seconds.unwrap_or(30));
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Networking(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Imports a raw private key into the custody service.
    ///
    /// Runs the full `Idle → Initiated → Sealed → Submitted → Complete`
    /// sequence and returns the wallet address computed from the key. Any
    /// non-2xx response is fatal to the attempt; nothing is sealed or
    /// submitted after a failed `init`.
    pub async fn import_private_key(
        &self,
        key: &RawPrivateKey,
        access_token: &str,
    ) -> Result<String> {
        let mut phase = ImportPhase::Idle;
        debug!(?phase, "starting custody import");

        let address = key.address()?;

        phase = ImportPhase::Initiated;
        debug!(?phase, %address, "requesting custody encryption key");
        let init_request = InitRequest {
            address: &address,
            chain_type: CHAIN_TYPE,
            entropy_type: ENTROPY_TYPE,
            encryption_type: ENCRYPTION_TYPE,
        };
        let response = self
            .post("init", access_token)
            .json(&init_request)
            .send()
            .await
            .map_err(|e| Error::Networking(format!("init request failed: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            phase = ImportPhase::Failed;
            let body = response.text().await.unwrap_or_default();
            debug!(?phase, status = status.as_u16(), "custody init rejected");
            return Err(Error::Service {
                status: status.as_u16(),
                body,
            });
        }
        let init: InitResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("invalid init response: {}", e)))?;

        let mut key_hex = key.to_hex();
        let sealed = seal(&init.encryption_public_key, &key_hex);
        key_hex.zeroize();
        let sealed = sealed?;
        phase = ImportPhase::Sealed;
        debug!(
            ?phase,
            encryption_type = %init.encryption_type,
            "private key sealed to custody encryption key"
        );

        let submit_request = SubmitRequest {
            wallet: SubmitWallet {
                address: &address,
                chain_type: CHAIN_TYPE,
                entropy_type: ENTROPY_TYPE,
                encryption_type: ENCRYPTION_TYPE,
                ciphertext: byte_string(&sealed.ciphertext),
                encapsulated_key: byte_string(&sealed.encapsulated_key),
            },
        };
        phase = ImportPhase::Submitted;
        debug!(?phase, "submitting sealed key");
        let response = self
            .post("submit", access_token)
            .json(&submit_request)
            .send()
            .await
            .map_err(|e| Error::Networking(format!("submit request failed: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            phase = ImportPhase::Failed;
            let body = response.text().await.unwrap_or_default();
            debug!(?phase, status = status.as_u16(), "custody submit rejected");
            return Err(Error::Service {
                status: status.as_u16(),
                body,
            });
        }

        phase = ImportPhase::Complete;
        debug!(?phase, %address, "custody import complete");
        Ok(address)
    }

    fn post(&self, endpoint: &str, access_token: &str) -> reqwest::RequestBuilder {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        );
        self.http_client
            .post(url)
            .header("Access-Token", access_token)
            .header("Content-Type", "application/json")
            .header(&self.config.app_id_header, &self.config.app_id)
    }
}

/// The custody service parses byte buffers in their producer's default
/// string form: comma-separated decimal values
fn byte_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
