//! Trust anchor configuration.

use serde::{Deserialize, Serialize};

use crate::error::{TrustError, TrustResult};

/// Transport security settings, fixed at node initialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustAnchorConfig {
    /// Dial peers over TLS instead of plaintext.
    pub secure_transport_required: bool,
    /// Key-store path of the PEM root bundle. Required in secure mode.
    pub trust_bundle_path: Option<String>,
    /// Present our own certificate during the handshake.
    pub mutual_auth_required: bool,
    /// Where the client certificate and key live. Required for mutual auth.
    pub client_identity: Option<ClientIdentityConfig>,
}

/// Key-store paths of the node's own certificate chain and private key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientIdentityConfig {
    pub cert_path: String,
    pub key_path: String,
}

impl TrustAnchorConfig {
    /// Plaintext transport; no trust pool is ever built.
    pub fn plaintext() -> Self {
        Self::default()
    }

    /// Server-authenticated TLS trusting the roots in `trust_bundle_path`.
    pub fn secure(trust_bundle_path: impl Into<String>) -> Self {
        Self {
            secure_transport_required: true,
            trust_bundle_path: Some(trust_bundle_path.into()),
            ..Self::default()
        }
    }

    /// Turn on mutual authentication using the given certificate and key.
    pub fn with_mutual_auth(
        mut self,
        cert_path: impl Into<String>,
        key_path: impl Into<String>,
    ) -> Self {
        self.mutual_auth_required = true;
        self.client_identity = Some(ClientIdentityConfig {
            cert_path: cert_path.into(),
            key_path: key_path.into(),
        });
        self
    }

    /// Check that the flags and paths form a usable combination.
    ///
    /// # Errors
    /// Returns [`TrustError::Config`] when secure mode has no bundle path,
    /// when mutual auth is requested without secure mode, or when mutual
    /// auth has no client identity source.
    pub fn validate(&self) -> TrustResult<()> {
        if self.secure_transport_required {
            self.trust_bundle_path()?;
        }

        if self.mutual_auth_required {
            if !self.secure_transport_required {
                return Err(TrustError::Config(
                    "mutual authentication requires secure transport".to_string(),
                ));
            }
            self.client_identity()?;
        }

        Ok(())
    }

    /// The configured bundle path, or a config error when it is missing.
    pub fn trust_bundle_path(&self) -> TrustResult<&str> {
        match self.trust_bundle_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Ok(path),
            _ => Err(TrustError::Config(
                "secure transport requires a trust bundle path".to_string(),
            )),
        }
    }

    /// The configured client identity source, or a config error when it is missing.
    pub fn client_identity(&self) -> TrustResult<&ClientIdentityConfig> {
        match &self.client_identity {
            Some(identity)
                if !identity.cert_path.trim().is_empty() && !identity.key_path.trim().is_empty() =>
            {
                Ok(identity)
            }
            _ => Err(TrustError::Config(
                "mutual authentication requires a client certificate and key path".to_string(),
            )),
        }
    }
}
