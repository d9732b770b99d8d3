//! Encrypted keystore handling (web3 secret-storage convention)
//!
//! A keystore document holds a private key encrypted under a password-derived
//! symmetric key. The password is stretched with either PBKDF2 or scrypt
//! (selected from `crypto.kdf`), the ciphertext is AES-128-CTR, and integrity
//! is a Keccak-256 MAC over the second half of the derived key and the
//! ciphertext. A MAC mismatch always fails and never yields a key.

use crate::error::{Error, Result};
use ctr::cipher::{KeyIvInit, StreamCipher};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha512};
use sha3::{Digest, Keccak256};
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

type Aes128Ctr = ctr::Ctr128BE<aes::Aes128>;

/// Keystore cipher supported by the decryptor
const CIPHER_AES_128_CTR: &str = "aes-128-ctr";

/// Scrypt cost parameter for freshly encrypted keystores
const SCRYPT_N: u64 = 8192;
/// Scrypt block size for freshly encrypted keystores
const SCRYPT_R: u32 = 8;
/// Scrypt parallelism for freshly encrypted keystores
const SCRYPT_P: u32 = 1;

/// An encrypted keystore document.
///
/// Some historic documents carry a capitalized `Crypto` key; the serde alias
/// folds it into the lowercase form before use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeystoreDocument {
    /// Encryption metadata and ciphertext
    #[serde(alias = "Crypto")]
    pub crypto: CryptoSection,

    /// Plain-hex address hint, if the producer recorded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Document format version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

/// The `crypto` section of a keystore document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoSection {
    /// Symmetric cipher name, `aes-128-ctr` for every known producer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cipher: Option<String>,

    /// Hex-encoded ciphertext
    pub ciphertext: String,

    /// Cipher parameters (the CTR initialization vector)
    pub cipherparams: CipherParams,

    /// KDF name, dispatched by [`Kdf::resolve`]
    pub kdf: String,

    /// KDF parameters, shape depends on `kdf`
    pub kdfparams: serde_json::Value,

    /// Hex-encoded Keccak-256 MAC
    pub mac: String,
}

/// Cipher parameters for the keystore ciphertext
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CipherParams {
    /// Hex-encoded initialization vector
    pub iv: String,
}

/// PBKDF2 parameters from `crypto.kdfparams`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pbkdf2Params {
    /// Hex-encoded salt
    pub salt: String,
    /// Iteration count
    pub c: u32,
    /// Derived key length in bytes
    pub dklen: usize,
    /// Pseudo-random function name (`hmac-sha256` or `hmac-sha512`)
    pub prf: String,
}

/// Scrypt parameters from `crypto.kdfparams`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScryptParams {
    /// Hex-encoded salt
    pub salt: String,
    /// CPU/memory cost, must be a power of two
    pub n: u64,
    /// Block size
    pub r: u32,
    /// Parallelism
    pub p: u32,
    /// Derived key length in bytes
    pub dklen: usize,
}

/// The key-derivation function selected from keystore metadata.
///
/// A closed two-variant enum: adding a third KDF is a compile-time-visible
/// change at every match site.
#[derive(Debug, Clone)]
pub enum Kdf {
    /// PBKDF2 with a named HMAC digest
    Pbkdf2(Pbkdf2Params),
    /// Scrypt
    Scrypt(ScryptParams),
}

impl Kdf {
    /// Resolves the KDF from the `crypto.kdf` name and `crypto.kdfparams`.
    ///
    /// `"pbkdf2"` selects PBKDF2; every other name routes to scrypt, which is
    /// what every known keystore producer emits for the non-PBKDF2 case.
    /// Malformed or missing parameters fail closed.
    pub fn resolve(name: &str, params: &serde_json::Value) -> Result<Self> {
        if name == "pbkdf2" {
            let params: Pbkdf2Params = serde_json::from_value(params.clone())
                .map_err(|e| Error::Kdf(format!("invalid pbkdf2 params: {}", e)))?;
            Ok(Kdf::Pbkdf2(params))
        } else {
            let params: ScryptParams = serde_json::from_value(params.clone())
                .map_err(|e| Error::Kdf(format!("invalid scrypt params: {}", e)))?;
            Ok(Kdf::Scrypt(params))
        }
    }

    /// Derives the symmetric key for this KDF from the password
    pub fn derive(&self, password: &str) -> Result<DerivedKey> {
        match self {
            Kdf::Pbkdf2(params) => {
                if params.dklen < 32 {
                    return Err(Error::Kdf(format!(
                        "pbkdf2 dklen {} is too short",
                        params.dklen
                    )));
                }
                let salt = decode_hex_param(&params.salt, "pbkdf2 salt")?;
                let mut derived = vec![0u8; params.dklen];
                match params.prf.as_str() {
                    "hmac-sha256" => pbkdf2_hmac::<Sha256>(
                        password.as_bytes(),
                        &salt,
                        params.c,
                        &mut derived,
                    ),
                    "hmac-sha512" => pbkdf2_hmac::<Sha512>(
                        password.as_bytes(),
                        &salt,
                        params.c,
                        &mut derived,
                    ),
                    other => {
                        return Err(Error::Kdf(format!("unsupported pbkdf2 prf: {}", other)))
                    }
                }
                Ok(DerivedKey(derived))
            }
            Kdf::Scrypt(params) => {
                if params.dklen < 32 {
                    return Err(Error::Kdf(format!(
                        "scrypt dklen {} is too short",
                        params.dklen
                    )));
                }
                if !params.n.is_power_of_two() || params.n < 2 {
                    return Err(Error::Kdf(format!(
                        "scrypt n {} is not a power of two",
                        params.n
                    )));
                }
                let salt = decode_hex_param(&params.salt, "scrypt salt")?;
                let log_n = params.n.trailing_zeros() as u8;
                let scrypt_params =
                    scrypt::Params::new(log_n, params.r, params.p, params.dklen)
                        .map_err(|e| Error::Kdf(format!("invalid scrypt params: {}", e)))?;
                let mut derived = vec![0u8; params.dklen];
                scrypt::scrypt(password.as_bytes(), &salt, &scrypt_params, &mut derived)
                    .map_err(|e| Error::Kdf(format!("scrypt derivation failed: {}", e)))?;
                Ok(DerivedKey(derived))
            }
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Kdf::Pbkdf2(_) => "pbkdf2",
            Kdf::Scrypt(_) => "scrypt",
        }
    }

    fn params_value(&self) -> Result<serde_json::Value> {
        let value = match self {
            Kdf::Pbkdf2(params) => serde_json::to_value(params),
            Kdf::Scrypt(params) => serde_json::to_value(params),
        };
        value.map_err(|e| Error::Serialization(format!("kdf params: {}", e)))
    }
}

/// A password-derived symmetric key, zeroized on drop.
///
/// Computed per decode attempt and never cached.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey(Vec<u8>);

impl DerivedKey {
    /// First half: the AES cipher key
    fn cipher_key(&self) -> &[u8] {
        &self.0[..16]
    }

    /// Second half: the MAC key
    fn mac_key(&self) -> &[u8] {
        &self.0[16..32]
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DerivedKey(..)")
    }
}

/// A 32-byte raw signing key, zeroized on drop.
///
/// Exists only for the duration of one decode-and-import attempt; it must
/// never reach logs, error messages or durable storage.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct RawPrivateKey([u8; 32]);

impl RawPrivateKey {
    /// Wraps 32 raw key bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Wraps a 32-byte slice
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::Decrypt("private key must be exactly 32 bytes".to_string()))?;
        Ok(Self(bytes))
    }

    /// Parses a hex-encoded key, tolerating an optional `0x` prefix
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let trimmed = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(trimmed)
            .map_err(|e| Error::Decode(format!("private key is not valid hex: {}", e)))?;
        Self::from_slice(&bytes)
    }

    /// Returns the raw key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encodes the key with a `0x` prefix.
    ///
    /// The caller is responsible for zeroizing the returned string once it
    /// has been consumed.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Computes the EIP-55 checksummed Ethereum address for this key
    pub fn address(&self) -> Result<String> {
        let signing = k256::ecdsa::SigningKey::from_bytes(k256::FieldBytes::from_slice(&self.0))
            .map_err(|e| Error::Decrypt(format!("recovered key is not a valid scalar: {}", e)))?;
        let point = signing.verifying_key().to_encoded_point(false);
        let digest = Keccak256::digest(&point.as_bytes()[1..]);
        Ok(checksum_address(&digest[12..]))
    }
}

impl PartialEq for RawPrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for RawPrivateKey {}

impl fmt::Debug for RawPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawPrivateKey(..)")
    }
}

/// Parses a keystore document from JSON text
pub fn parse_keystore(json: &str) -> Result<KeystoreDocument> {
    serde_json::from_str(json)
        .map_err(|e| Error::Serialization(format!("invalid keystore document: {}", e)))
}

/// Recovers the raw private key from an encrypted keystore document.
///
/// The MAC is recomputed and compared in constant time before any
/// decryption output is produced; on mismatch this returns
/// [`Error::Decrypt`] and never a key.
pub fn decrypt_keystore(document: &KeystoreDocument, password: &str) -> Result<RawPrivateKey> {
    if password.is_empty() {
        return Err(Error::Config(
            "burner wallet password is not set".to_string(),
        ));
    }
    if let Some(cipher) = &document.crypto.cipher {
        if cipher != CIPHER_AES_128_CTR {
            return Err(Error::Decrypt(format!("unsupported cipher: {}", cipher)));
        }
    }

    let kdf = Kdf::resolve(&document.crypto.kdf, &document.crypto.kdfparams)?;
    let derived = kdf.derive(password)?;

    let ciphertext = decode_hex_field(&document.crypto.ciphertext, "ciphertext")?;
    let expected_mac = decode_hex_field(&document.crypto.mac, "mac")?;

    let mut hasher = Keccak256::new();
    hasher.update(derived.mac_key());
    hasher.update(&ciphertext);
    let computed_mac = hasher.finalize();

    if !bool::from(computed_mac.as_slice().ct_eq(&expected_mac)) {
        return Err(Error::Decrypt("MAC verification failed".to_string()));
    }

    let iv: [u8; 16] = decode_hex_field(&document.crypto.cipherparams.iv, "iv")?
        .try_into()
        .map_err(|_| Error::Decrypt("iv must be exactly 16 bytes".to_string()))?;
    let cipher_key: [u8; 16] = derived
        .cipher_key()
        .try_into()
        .map_err(|_| Error::Kdf("derived key is too short".to_string()))?;

    let mut plaintext = ciphertext;
    let mut cipher = Aes128Ctr::new(&cipher_key.into(), &iv.into());
    cipher.apply_keystream(&mut plaintext);

    let key = RawPrivateKey::from_slice(&plaintext);
    plaintext.zeroize();
    key
}

/// Encrypts a private key into a fresh scrypt keystore document.
///
/// Salt and IV are drawn from the OS RNG, so re-encrypting the same key
/// never reproduces the same ciphertext.
pub fn encrypt_keystore(key: &RawPrivateKey, password: &str) -> Result<KeystoreDocument> {
    let mut salt = [0u8; 32];
    OsRng.fill_bytes(&mut salt);
    let params = ScryptParams {
        salt: hex::encode(salt),
        n: SCRYPT_N,
        r: SCRYPT_R,
        p: SCRYPT_P,
        dklen: 32,
    };
    encrypt_keystore_with(key, password, Kdf::Scrypt(params))
}

/// Encrypts a private key into a keystore document under a caller-chosen KDF
pub fn encrypt_keystore_with(
    key: &RawPrivateKey,
    password: &str,
    kdf: Kdf,
) -> Result<KeystoreDocument> {
    if password.is_empty() {
        return Err(Error::Config(
            "burner wallet password is not set".to_string(),
        ));
    }

    let derived = kdf.derive(password)?;

    let mut iv = [0u8; 16];
    OsRng.fill_bytes(&mut iv);
    let cipher_key: [u8; 16] = derived
        .cipher_key()
        .try_into()
        .map_err(|_| Error::Kdf("derived key is too short".to_string()))?;

    let mut ciphertext = key.as_bytes().to_vec();
    let mut cipher = Aes128Ctr::new(&cipher_key.into(), &iv.into());
    cipher.apply_keystream(&mut ciphertext);

    let mut hasher = Keccak256::new();
    hasher.update(derived.mac_key());
    hasher.update(&ciphertext);
    let mac = hasher.finalize();

    Ok(KeystoreDocument {
        crypto: CryptoSection {
            cipher: Some(CIPHER_AES_128_CTR.to_string()),
            ciphertext: hex::encode(ciphertext),
            cipherparams: CipherParams {
                iv: hex::encode(iv),
            },
            kdf: kdf.name().to_string(),
            kdfparams: kdf.params_value()?,
            mac: hex::encode(mac),
        },
        address: None,
        version: Some(3),
    })
}

/// EIP-55 mixed-case checksum encoding of a 20-byte address
fn checksum_address(address: &[u8]) -> String {
    let lower = hex::encode(address);
    let digest = Keccak256::digest(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            digest[i / 2] >> 4
        } else {
            digest[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn decode_hex_param(value: &str, what: &str) -> Result<Vec<u8>> {
    hex::decode(value).map_err(|e| Error::Kdf(format!("{} is not valid hex: {}", what, e)))
}

fn decode_hex_field(value: &str, what: &str) -> Result<Vec<u8>> {
    hex::decode(value).map_err(|e| Error::Decrypt(format!("{} is not valid hex: {}", what, e)))
}
