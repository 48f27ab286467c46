//! Transport security selection for outbound dials.
//!
//! Per dial: `Start -> {PlaintextDial | SecurePolicyBuilt} -> Connected | Failed`.
//! With secure transport off the connection factory is asked for a plaintext
//! connection and the trust pool is never consulted. With it on, a
//! [`TlsPolicy`] verifying the peer against the trust pool and the expected
//! server name is built first, carrying the client identity when mutual
//! authentication is required.

use ledger_security::{ClientIdentity, TlsPolicy, TrustAnchorConfig, TrustPool};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::connection::ConnectionFactory;
use crate::error::{TransportError, TransportResult};

/// Where to dial and who we expect to find there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialTarget {
    /// `host:port` to connect to.
    pub address: String,
    /// Name the peer certificate must be valid for.
    pub expected_identity: String,
}

impl DialTarget {
    pub fn new(address: impl Into<String>, expected_identity: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            expected_identity: expected_identity.into(),
        }
    }
}

/// Opens peer channels with the transport security the node is configured for.
///
/// Holds only read-only state, so one instance can serve any number of
/// concurrent dials.
pub struct SecureChannelFactory<F> {
    connector: F,
    config: Arc<TrustAnchorConfig>,
    trust: Option<TrustPool>,
    identity: Option<ClientIdentity>,
    keep_alive: bool,
}

impl<F: ConnectionFactory> SecureChannelFactory<F> {
    /// Create a factory dialing through `connector`.
    ///
    /// `trust` is the pool produced by
    /// [`initialize_trust`](ledger_security::initialize_trust); it is `None`
    /// when secure transport is disabled.
    pub fn new(connector: F, config: Arc<TrustAnchorConfig>, trust: Option<TrustPool>) -> Self {
        Self {
            connector,
            config,
            trust,
            identity: None,
            keep_alive: false,
        }
    }

    /// Client identity presented when mutual authentication is required.
    pub fn with_client_identity(mut self, identity: Option<ClientIdentity>) -> Self {
        self.identity = identity;
        self
    }

    /// Ask the connection factory for keep-alive connections.
    pub fn with_keep_alive(mut self, enabled: bool) -> Self {
        self.keep_alive = enabled;
        self
    }

    pub fn config(&self) -> &TrustAnchorConfig {
        &self.config
    }

    pub fn connector(&self) -> &F {
        &self.connector
    }

    /// Build the TLS policy for `target`, or `None` for a plaintext dial.
    ///
    /// # Errors
    /// - [`TransportError::MissingTrustPool`] in secure mode without a pool
    /// - [`TransportError::MissingClientIdentity`] under mutual auth without an identity
    /// - [`TransportError::InvalidServerName`] if the expected identity is unusable
    pub fn tls_policy(&self, target: &DialTarget) -> TransportResult<Option<TlsPolicy>> {
        if !self.config.secure_transport_required {
            return Ok(None);
        }

        let trust = self.trust.as_ref().ok_or(TransportError::MissingTrustPool)?;
        let mut builder = TlsPolicy::builder(trust);

        if self.config.mutual_auth_required {
            let identity = self
                .identity
                .as_ref()
                .ok_or(TransportError::MissingClientIdentity)?;
            builder = builder.with_client_identity(identity);
        }

        Ok(Some(builder.build(&target.expected_identity)?))
    }

    /// Open a channel to `target`.
    ///
    /// Failures are returned as-is; retry and backoff belong to the caller.
    pub async fn dial(&self, target: &DialTarget) -> TransportResult<F::Channel> {
        debug!(
            "Dial to addr:[{}], with serverName:[{}]...",
            target.address, target.expected_identity
        );

        let policy = self.tls_policy(target).map_err(|e| {
            error!("Failed building TLS policy for {}: {}", target.address, e);
            e
        })?;

        let secure = policy.is_some();
        if secure {
            debug!("TLS enabled...");
        } else {
            debug!("TLS disabled...");
        }

        match self
            .connector
            .new_client_connection(&target.address, self.keep_alive, secure, policy)
            .await
        {
            Ok(channel) => {
                info!(
                    "Connected to {} ({})",
                    target.address,
                    if secure { "tls" } else { "plaintext" }
                );
                Ok(channel)
            }
            Err(e) => {
                warn!("Dial to {} failed: {}", target.address, e);
                Err(e)
            }
        }
    }
}
