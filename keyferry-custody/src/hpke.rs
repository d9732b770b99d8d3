//! HPKE sealing of raw private keys
//!
//! Seals a raw private key to the custody service's encryption public key
//! under a fixed RFC 9180 suite: KEM = DHKEM(P-256, HKDF-SHA256),
//! KDF = HKDF-SHA256, AEAD = ChaCha20-Poly1305. The suite sits behind this
//! narrow interface so it can be swapped without touching the import state
//! machine.
//!
//! Every failure (bad encoding, key deserialization) propagates to the
//! caller. There is no fallback: a wrong recipient key must never silently
//! produce unusable or misdirected ciphertext.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hpke::aead::ChaCha20Poly1305;
use hpke::kdf::HkdfSha256;
use hpke::kem::DhP256HkdfSha256;
use hpke::{Deserializable, Kem, OpModeS, Serializable};
use rand::rngs::StdRng;
use rand::SeedableRng;
use zeroize::Zeroize;

/// The result of sealing a private key: one encapsulated key and one
/// ciphertext, produced once per import attempt and never reused
#[derive(Debug, Clone)]
pub struct SealedKey {
    /// Encapsulated KEM shared secret
    pub encapsulated_key: Vec<u8>,
    /// AEAD ciphertext of the raw private-key bytes
    pub ciphertext: Vec<u8>,
}

/// Seals a hex-encoded private key to a base64-encoded recipient public key.
///
/// The private key may carry an optional `0x` prefix. The plaintext is the
/// raw key bytes, sealed with no associated data.
pub fn seal(recipient_public_key_b64: &str, private_key_hex: &str) -> Result<SealedKey> {
    let public_key_bytes = BASE64
        .decode(recipient_public_key_b64)
        .map_err(|e| Error::Crypto(format!("recipient public key is not valid base64: {}", e)))?;

    let trimmed = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);
    let mut plaintext = hex::decode(trimmed)
        .map_err(|e| Error::Crypto(format!("private key is not valid hex: {}", e)))?;

    let recipient_key = <DhP256HkdfSha256 as Kem>::PublicKey::from_bytes(&public_key_bytes)
        .map_err(|e| {
            plaintext.zeroize();
            Error::Crypto(format!("recipient public key deserialization failed: {}", e))
        })?;

    let mut csprng = StdRng::from_entropy();
    let sealed = hpke::single_shot_seal::<ChaCha20Poly1305, HkdfSha256, DhP256HkdfSha256, _>(
        &OpModeS::Base,
        &recipient_key,
        b"",
        &plaintext,
        b"",
        &mut csprng,
    );
    plaintext.zeroize();

    let (encapsulated_key, ciphertext) =
        sealed.map_err(|e| Error::Crypto(format!("HPKE seal failed: {}", e)))?;

    Ok(SealedKey {
        encapsulated_key: encapsulated_key.to_bytes().to_vec(),
        ciphertext,
    })
}
