//! Per-dial TLS client policy.
//!
//! A [`TlsPolicy`] is the rustls client configuration handed to the
//! connection factory for one secure dial. It always verifies the peer with
//! the WebPKI verifier against the node's [`TrustPool`] and the expected
//! server name; there is no builder option that relaxes verification.

use rustls::pki_types::ServerName;
use rustls::ClientConfig;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::PolicyError;
use crate::identity::ClientIdentity;
use crate::trust_store::TrustPool;

/// Verified TLS client settings for one peer identity.
#[derive(Clone)]
pub struct TlsPolicy {
    client_config: Arc<ClientConfig>,
    server_name: ServerName<'static>,
    root_count: usize,
    presents_client_identity: bool,
}

impl TlsPolicy {
    /// Start a policy that trusts the roots in `trust`.
    pub fn builder(trust: &TrustPool) -> TlsPolicyBuilder<'_> {
        TlsPolicyBuilder {
            trust,
            identity: None,
        }
    }

    /// The rustls configuration to handshake with.
    pub fn client_config(&self) -> Arc<ClientConfig> {
        Arc::clone(&self.client_config)
    }

    /// The identity the peer certificate must match.
    pub fn server_name(&self) -> &ServerName<'static> {
        &self.server_name
    }

    /// Number of trusted roots the peer chain is checked against.
    pub fn root_count(&self) -> usize {
        self.root_count
    }

    /// Whether the node's certificate is sent for mutual authentication.
    pub fn presents_client_identity(&self) -> bool {
        self.presents_client_identity
    }
}

impl fmt::Debug for TlsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsPolicy")
            .field("server_name", &self.server_name)
            .field("root_count", &self.root_count)
            .field("presents_client_identity", &self.presents_client_identity)
            .finish()
    }
}

/// Builder for [`TlsPolicy`].
pub struct TlsPolicyBuilder<'a> {
    trust: &'a TrustPool,
    identity: Option<&'a ClientIdentity>,
}

impl<'a> TlsPolicyBuilder<'a> {
    /// Present `identity` during the handshake (mutual TLS).
    pub fn with_client_identity(mut self, identity: &'a ClientIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Build the policy for a peer expected to present `expected_identity`.
    ///
    /// `expected_identity` may be a DNS name or an IP address literal.
    ///
    /// # Errors
    /// Returns [`PolicyError::InvalidServerName`] for an unusable name and
    /// [`PolicyError::Tls`] if rustls rejects the client certificate or key.
    pub fn build(self, expected_identity: &str) -> Result<TlsPolicy, PolicyError> {
        let server_name = ServerName::try_from(expected_identity.to_string()).map_err(|_| {
            PolicyError::InvalidServerName {
                name: expected_identity.to_string(),
            }
        })?;

        let builder = ClientConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()?
        .with_root_certificates(self.trust.roots());

        let client_config = match self.identity {
            Some(identity) => builder
                .with_client_auth_cert(identity.cert_chain().to_vec(), identity.private_key())?,
            None => builder.with_no_client_auth(),
        };

        debug!(
            "Built TLS policy for {} ({} root(s), client auth: {})",
            expected_identity,
            self.trust.len(),
            self.identity.is_some()
        );

        Ok(TlsPolicy {
            client_config: Arc::new(client_config),
            server_name,
            root_count: self.trust.len(),
            presents_client_identity: self.identity.is_some(),
        })
    }
}
