//! Client identity for mutual TLS.
//!
//! When mutual authentication is required the node presents its own
//! certificate chain during the handshake. The chain and key are read from
//! the key store at startup, next to the trust bundle.

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use std::fmt;
use tracing::{debug, error, info};

use crate::cert_loader::CertLoader;
use crate::config::TrustAnchorConfig;
use crate::error::{TrustError, TrustResult};

/// The node's certificate chain and private key.
pub struct ClientIdentity {
    cert_chain: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
}

impl ClientIdentity {
    /// Parse a certificate chain and private key from PEM.
    ///
    /// The key may be PKCS#8, PKCS#1 (RSA) or SEC1 (EC); the first key
    /// section found is used.
    ///
    /// # Errors
    /// Returns [`TrustError::IdentityParse`] if the chain is empty or no
    /// private key is present.
    pub fn from_pem(
        cert_pem: &[u8],
        cert_source: &str,
        key_pem: &[u8],
        key_source: &str,
    ) -> TrustResult<Self> {
        let mut cert_reader = cert_pem;
        let cert_chain = rustls_pemfile::certs(&mut cert_reader)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| TrustError::IdentityParse {
                path: cert_source.to_string(),
                reason: e.to_string(),
            })?;

        if cert_chain.is_empty() {
            return Err(TrustError::IdentityParse {
                path: cert_source.to_string(),
                reason: "no certificates found".to_string(),
            });
        }

        let mut key_reader = key_pem;
        let key = rustls_pemfile::private_key(&mut key_reader)
            .map_err(|e| TrustError::IdentityParse {
                path: key_source.to_string(),
                reason: e.to_string(),
            })?
            .ok_or_else(|| TrustError::IdentityParse {
                path: key_source.to_string(),
                reason: "no private key found".to_string(),
            })?;

        Ok(Self { cert_chain, key })
    }

    /// Certificate chain, leaf first.
    pub fn cert_chain(&self) -> &[CertificateDer<'static>] {
        &self.cert_chain
    }

    /// A copy of the private key for handing to rustls.
    pub fn private_key(&self) -> PrivateKeyDer<'static> {
        self.key.clone_key()
    }

    /// Subject of the leaf certificate.
    pub fn subject(&self) -> Option<String> {
        use x509_parser::prelude::*;

        let leaf = self.cert_chain.first()?;
        X509Certificate::from_der(leaf.as_ref())
            .ok()
            .map(|(_, parsed)| parsed.subject().to_string())
    }
}

impl Clone for ClientIdentity {
    fn clone(&self) -> Self {
        Self {
            cert_chain: self.cert_chain.clone(),
            key: self.key.clone_key(),
        }
    }
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("chain_len", &self.cert_chain.len())
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Load the client identity when mutual authentication is required.
///
/// Returns `Ok(None)` when mutual authentication is off.
///
/// # Errors
/// - [`TrustError::Config`] if no identity source is configured
/// - [`TrustError::IdentityLoad`] if the loader cannot provide the files
/// - [`TrustError::IdentityParse`] if the files hold no usable chain or key
pub fn load_client_identity(
    config: &TrustAnchorConfig,
    loader: &dyn CertLoader,
) -> TrustResult<Option<ClientIdentity>> {
    if !config.mutual_auth_required {
        debug!("Client authentication disabled");
        return Ok(None);
    }

    let paths = config.client_identity()?;
    debug!("Loading client identity from {}", paths.cert_path);

    let load = |path: &str| {
        loader.load_external_cert(path).map_err(|source| {
            error!("Failed loading client identity [{}]", source);
            TrustError::IdentityLoad {
                path: path.to_string(),
                source,
            }
        })
    };

    let cert_pem = load(paths.cert_path.as_str())?;
    let key_pem = load(paths.key_path.as_str())?;

    let identity = ClientIdentity::from_pem(&cert_pem, &paths.cert_path, &key_pem, &paths.key_path)
        .map_err(|e| {
            error!("Failed parsing client identity: {}", e);
            e
        })?;

    info!(
        "Loaded client identity ({} certificate(s) from {})",
        identity.cert_chain().len(),
        paths.cert_path
    );
    Ok(Some(identity))
}
