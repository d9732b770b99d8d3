//! Round-trip tests for the wallet-link codec
//!
//! These exercise the full path: encode a wallet, embed it in a deep link,
//! decode it back, and compare the recovered key byte for byte. Ciphertext
//! bytes are allowed to differ between encodings (re-encryption is
//! non-deterministic); the recovered key never is.

use assert_matches::assert_matches;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use keyferry_link::{
    decode_deep_link, encode_v3, encode_v4, encrypt_keystore, upgrade_v3_to_v4, CommunityConfig,
    Error, RawPrivateKey, WalletLinkBlob, WalletLinkVersion,
};

const PASSWORD: &str = "test-burner-password";
const PRIMARY_FACTORY: &str = "0x9406Cc6185a346906296840746125a0E44976454";

fn community() -> CommunityConfig {
    CommunityConfig::new(PASSWORD, PRIMARY_FACTORY)
        .with_account_factory("gratitude", "0x000000893A26168158fbeaDD9335Be5bC96592E2")
}

fn test_key() -> RawPrivateKey {
    RawPrivateKey::from_bytes([0x5a; 32])
}

fn deep_link(blob: &str) -> String {
    format!("app://community.example/close#/wallet/{}", blob)
}

#[test]
fn test_v3_roundtrip_recovers_exact_key() {
    let community = community();
    let key = test_key();
    let account = key.address().unwrap();

    let blob = encode_v3(&account, &key, &community).unwrap();
    assert!(blob.starts_with("v3-"));

    let wallet = decode_deep_link(&deep_link(&blob), &community).unwrap();
    assert_eq!(wallet.account, account);
    assert_eq!(wallet.account_factory, None);
    assert_eq!(wallet.private_key, key);
    // The derived address of the recovered key matches the embedded account
    assert_eq!(wallet.private_key.address().unwrap(), wallet.account);
}

#[test]
fn test_v3_reencoding_differs_on_the_wire() {
    let community = community();
    let key = test_key();
    let account = key.address().unwrap();

    let first = encode_v3(&account, &key, &community).unwrap();
    let second = encode_v3(&account, &key, &community).unwrap();
    assert_ne!(first, second);

    let a = decode_deep_link(&deep_link(&first), &community).unwrap();
    let b = decode_deep_link(&deep_link(&second), &community).unwrap();
    assert_eq!(a.private_key, b.private_key);
}

#[test]
fn test_v4_roundtrip_preserves_factory_exactly() {
    let community = community();
    let key = test_key();
    let account = key.address().unwrap();
    let factory = "0x000000893A26168158fbeaDD9335Be5bC96592E2";

    let blob = encode_v4(&account, factory, &key, &community).unwrap();
    assert!(blob.starts_with("v4-"));

    let wallet = decode_deep_link(&deep_link(&blob), &community).unwrap();
    assert_eq!(wallet.account, account);
    assert_eq!(wallet.account_factory.as_deref(), Some(factory));
    assert_eq!(wallet.private_key, key);
}

#[test]
fn test_v2_legacy_blob_decodes_to_derived_account() {
    let community = community();
    let key = test_key();

    let document = encrypt_keystore(&key, PASSWORD).unwrap();
    let json = serde_json::to_string(&document).unwrap();
    let blob = format!("v2-{}", BASE64.encode(json));

    let wallet = decode_deep_link(&deep_link(&blob), &community).unwrap();
    assert_eq!(wallet.account, key.address().unwrap());
    assert_eq!(wallet.account_factory, None);
    assert_eq!(wallet.private_key, key);
}

#[test]
fn test_upgrade_v3_to_v4_resolves_alias() {
    let community = community();
    let key = test_key();
    let account = key.address().unwrap();

    let v3 = encode_v3(&account, &key, &community).unwrap();
    let blob = WalletLinkBlob::parse(&v3).unwrap();

    let v4 = upgrade_v3_to_v4(&blob, "gratitude", &community).unwrap();
    let wallet = decode_deep_link(&deep_link(&v4), &community).unwrap();
    assert_eq!(
        wallet.account_factory.as_deref(),
        Some("0x000000893A26168158fbeaDD9335Be5bC96592E2")
    );
    assert_eq!(wallet.private_key, key);
}

#[test]
fn test_upgrade_falls_back_to_primary_factory() {
    let community = community();
    let key = test_key();
    let account = key.address().unwrap();

    let v3 = encode_v3(&account, &key, &community).unwrap();
    let blob = WalletLinkBlob::parse(&v3).unwrap();

    let v4 = upgrade_v3_to_v4(&blob, "no-such-alias", &community).unwrap();
    let wallet = decode_deep_link(&deep_link(&v4), &community).unwrap();
    assert_eq!(wallet.account_factory.as_deref(), Some(PRIMARY_FACTORY));
}

#[test]
fn test_upgrade_rejects_non_v3_blobs() {
    let community = community();
    let blob = WalletLinkBlob {
        version: WalletLinkVersion::V4,
        payload: "YWJj".to_string(),
    };
    assert_matches!(
        upgrade_v3_to_v4(&blob, "gratitude", &community),
        Err(Error::Decode(_))
    );
}

#[test]
fn test_unsupported_version_returns_failure_not_panic() {
    let community = community();
    let result = decode_deep_link(&deep_link("v9-YWJj"), &community);
    assert_matches!(result, Err(Error::Decode(_)));
}

#[test]
fn test_wrong_field_count_is_format_error() {
    let community = community();
    let key = test_key();
    let account = key.address().unwrap();

    // A v4 payload presented under a v3 tag has one field too many
    let document = encrypt_keystore(&key, PASSWORD).unwrap();
    let json = serde_json::to_string(&document).unwrap();
    let payload = BASE64.encode(format!("{}|{}|{}", account, PRIMARY_FACTORY, json));

    let result = decode_deep_link(&deep_link(&format!("v3-{}", payload)), &community);
    assert_matches!(result, Err(Error::Format(_)));
}

#[test]
fn test_empty_account_field_is_format_error() {
    let community = community();
    let key = test_key();

    let document = encrypt_keystore(&key, PASSWORD).unwrap();
    let json = serde_json::to_string(&document).unwrap();
    let payload = BASE64.encode(format!("|{}", json));

    let result = decode_deep_link(&deep_link(&format!("v3-{}", payload)), &community);
    assert_matches!(result, Err(Error::Format(_)));
}

#[test]
fn test_encoding_requires_burner_password() {
    let community = CommunityConfig::new("", PRIMARY_FACTORY);
    let key = test_key();
    assert_matches!(
        encode_v3("0xABC", &key, &community),
        Err(Error::Config(_))
    );
}
