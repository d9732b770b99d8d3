//! End-to-end transfer tests: deep link in, custody import out

use assert_matches::assert_matches;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hpke::kem::DhP256HkdfSha256;
use hpke::{Kem, Serializable};
use keyferry_custody::{transfer_wallet, CustodyClient, CustodyConfig, Error};
use keyferry_link::{encode_v3, CommunityConfig, RawPrivateKey};
use rand::rngs::StdRng;
use rand::SeedableRng;

const PASSWORD: &str = "test-burner-password";
const ACCESS_TOKEN: &str = "session-token-123";

fn community() -> CommunityConfig {
    CommunityConfig::new(PASSWORD, "0x9406Cc6185a346906296840746125a0E44976454")
}

#[tokio::test]
async fn test_transfer_wallet_decodes_and_imports() {
    let mut server = mockito::Server::new_async().await;
    let community = community();

    let key = RawPrivateKey::from_bytes([0x33; 32]);
    let account = key.address().unwrap();
    let blob = encode_v3(&account, &key, &community).unwrap();
    let deep_link = format!("app://community.example/close#/wallet/{}", blob);

    let mut csprng = StdRng::from_entropy();
    let (_, public_key) = DhP256HkdfSha256::gen_keypair(&mut csprng);
    let init_body = serde_json::json!({
        "encryption_public_key": BASE64.encode(public_key.to_bytes()),
        "encryption_type": "HPKE",
    });
    server
        .mock("POST", "/init")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(init_body.to_string())
        .create_async()
        .await;
    server
        .mock("POST", "/submit")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let client =
        CustodyClient::new(CustodyConfig::new(server.url(), "test-app-id")).unwrap();
    let address = transfer_wallet(&client, &deep_link, &community, ACCESS_TOKEN)
        .await
        .unwrap();

    assert_eq!(address, account);
}

#[tokio::test]
async fn test_transfer_with_bad_link_makes_no_network_calls() {
    let mut server = mockito::Server::new_async().await;
    let init_mock = server
        .mock("POST", "/init")
        .expect(0)
        .create_async()
        .await;
    let submit_mock = server
        .mock("POST", "/submit")
        .expect(0)
        .create_async()
        .await;

    let client =
        CustodyClient::new(CustodyConfig::new(server.url(), "test-app-id")).unwrap();
    let result = transfer_wallet(
        &client,
        "app://community.example/close#/wallet/v9-YWJj",
        &community(),
        ACCESS_TOKEN,
    )
    .await;

    assert_matches!(result, Err(Error::Link(_)));
    init_mock.assert_async().await;
    submit_mock.assert_async().await;
}
