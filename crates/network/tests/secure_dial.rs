//! End-to-end dial tests against live plaintext and TLS peers.
//!
//! Trust material flows through the same path the node uses: PEM in a key
//! store, `initialize_trust`, `load_client_identity`, then
//! `SecureChannelFactory` over `TcpConnectionFactory`.

mod common;

use common::*;
use ledger_network::{DialTarget, SecureChannelFactory, TcpConnectionFactory, TransportError};
use ledger_security::{initialize_trust, load_client_identity, MemoryCertLoader, TrustAnchorConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;

fn channel_factory(
    config: TrustAnchorConfig,
    loader: &MemoryCertLoader,
) -> SecureChannelFactory<TcpConnectionFactory> {
    let trust = initialize_trust(&config, loader).unwrap();
    let identity = load_client_identity(&config, loader).unwrap();
    SecureChannelFactory::new(TcpConnectionFactory::default(), Arc::new(config), trust)
        .with_client_identity(identity)
}

#[tokio::test]
async fn test_plaintext_dial() {
    let addr = spawn_plain_peer().await;
    let factory = channel_factory(TrustAnchorConfig::plaintext(), &MemoryCertLoader::new());

    let mut channel = factory
        .dial(&DialTarget::new(addr.to_string(), "peer0"))
        .await
        .unwrap();

    assert!(!channel.is_secure());
    let mut buf = [0u8; 5];
    channel.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, GREETING);
}

#[tokio::test]
async fn test_tls_dial_verifies_peer() {
    let pki = TestPki::new("Ledger Root CA");
    let peer_cert = pki.issue("peer0");
    let addr = spawn_tls_peer(&peer_cert, None).await;

    let loader = MemoryCertLoader::new().with_entry("ca.pem", pki.ca_pem());
    let factory = channel_factory(TrustAnchorConfig::secure("ca.pem"), &loader);

    let mut channel = factory
        .dial(&DialTarget::new(addr.to_string(), "peer0"))
        .await
        .unwrap();

    assert!(channel.is_secure());
    let presented = channel.peer_certificates().expect("peer certificates");
    assert_eq!(presented, peer_cert.chain());

    let mut buf = [0u8; 5];
    channel.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, GREETING);
}

#[tokio::test]
async fn test_tls_dial_rejects_wrong_identity() {
    let pki = TestPki::new("Ledger Root CA");
    let addr = spawn_tls_peer(&pki.issue("peer0"), None).await;

    let loader = MemoryCertLoader::new().with_entry("ca.pem", pki.ca_pem());
    let factory = channel_factory(TrustAnchorConfig::secure("ca.pem"), &loader);

    let err = factory
        .dial(&DialTarget::new(addr.to_string(), "peer1"))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Handshake { .. }), "{err}");
}

#[tokio::test]
async fn test_tls_dial_rejects_untrusted_peer() {
    let trusted = TestPki::new("Ledger Root CA");
    let rogue = TestPki::new("Rogue CA");
    let addr = spawn_tls_peer(&rogue.issue("peer0"), None).await;

    let loader = MemoryCertLoader::new().with_entry("ca.pem", trusted.ca_pem());
    let factory = channel_factory(TrustAnchorConfig::secure("ca.pem"), &loader);

    let err = factory
        .dial(&DialTarget::new(addr.to_string(), "peer0"))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Handshake { .. }), "{err}");
}

#[tokio::test]
async fn test_mutual_auth_dial() {
    let pki = TestPki::new("Ledger Root CA");
    let addr = spawn_tls_peer(&pki.issue("peer0"), Some(pki.root_store())).await;

    let node_cert = pki.issue("node-1");
    let loader = MemoryCertLoader::new()
        .with_entry("ca.pem", pki.ca_pem())
        .with_entry("node.pem", node_cert.cert_pem())
        .with_entry("node.key", node_cert.key_pem());
    let config = TrustAnchorConfig::secure("ca.pem").with_mutual_auth("node.pem", "node.key");
    let factory = channel_factory(config, &loader);

    let mut channel = factory
        .dial(&DialTarget::new(addr.to_string(), "peer0"))
        .await
        .unwrap();

    let mut buf = [0u8; 5];
    channel.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, GREETING);
}

#[tokio::test]
async fn test_peer_requiring_client_auth_rejects_anonymous_dial() {
    let pki = TestPki::new("Ledger Root CA");
    let addr = spawn_tls_peer(&pki.issue("peer0"), Some(pki.root_store())).await;

    let loader = MemoryCertLoader::new().with_entry("ca.pem", pki.ca_pem());
    let factory = channel_factory(TrustAnchorConfig::secure("ca.pem"), &loader);

    // Under TLS 1.3 the peer's rejection may only surface on first read.
    match factory.dial(&DialTarget::new(addr.to_string(), "peer0")).await {
        Err(err) => assert!(matches!(err, TransportError::Handshake { .. }), "{err}"),
        Ok(mut channel) => {
            let mut buf = [0u8; 5];
            assert!(channel.read_exact(&mut buf).await.is_err());
        }
    }
}

#[tokio::test]
async fn test_handshake_timeout() {
    let pki = TestPki::new("Ledger Root CA");
    let addr = spawn_silent_peer().await;

    let loader = MemoryCertLoader::new().with_entry("ca.pem", pki.ca_pem());
    let config = Arc::new(TrustAnchorConfig::secure("ca.pem"));
    let trust = initialize_trust(&config, &loader).unwrap();
    let factory = SecureChannelFactory::new(
        TcpConnectionFactory::new(Duration::from_millis(200)),
        config,
        trust,
    );

    let err = factory
        .dial(&DialTarget::new(addr.to_string(), "peer0"))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Timeout { .. }), "{err}");
}
