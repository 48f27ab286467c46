use futures::future::join_all;
use ledger_network::{
    Channel, DialTarget, SecureChannelFactory, TcpConnectionFactory, TransportResult,
};
use ledger_security::{
    initialize_trust, load_client_identity, ClientIdentity, FileCertLoader, TrustAnchorConfig,
    TrustPool,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::AppConfig;

/// A node with its trust anchor initialized and ready to dial peers.
pub struct LedgerNode {
    config: AppConfig,
    trust: Option<TrustPool>,
    identity: Option<ClientIdentity>,
    channels: SecureChannelFactory<TcpConnectionFactory>,
}

impl LedgerNode {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let anchor: Arc<TrustAnchorConfig> = Arc::new(config.trust_anchor());
        let loader = FileCertLoader::new(&config.keystore.root_dir);
        info!("Using key store at {}", loader.root().display());

        let trust = initialize_trust(&anchor, &loader)?;
        let identity = load_client_identity(&anchor, &loader)?;

        let connector =
            TcpConnectionFactory::new(Duration::from_secs(config.network.connect_timeout_secs));
        let channels = SecureChannelFactory::new(connector, anchor, trust.clone())
            .with_client_identity(identity.clone())
            .with_keep_alive(config.network.keep_alive);
        info!(
            "Dial timeout {:?}, keep-alive {}",
            channels.connector().connect_timeout(),
            config.network.keep_alive
        );

        Ok(Self {
            config,
            trust,
            identity,
            channels,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.node.name
    }

    pub fn trust_pool(&self) -> Option<&TrustPool> {
        self.trust.as_ref()
    }

    /// Identity presented to peers under mutual authentication.
    pub fn client_identity(&self) -> Option<&ClientIdentity> {
        self.identity.as_ref()
    }

    pub fn trust_anchor(&self) -> &TrustAnchorConfig {
        self.channels.config()
    }

    pub async fn dial(&self, target: &DialTarget) -> TransportResult<Channel> {
        self.channels.dial(target).await
    }

    /// Dial every configured bootstrap peer concurrently.
    pub async fn dial_bootstrap_peers(&self) -> Vec<(DialTarget, TransportResult<Channel>)> {
        let targets = self.config.bootstrap_targets();
        let results = join_all(targets.iter().map(|target| self.channels.dial(target))).await;
        targets.into_iter().zip(results).collect()
    }
}
