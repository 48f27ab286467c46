//! Error types for trust anchor and TLS policy construction.

use std::io;
use thiserror::Error;

/// Errors reported by a [`CertLoader`](crate::CertLoader).
#[derive(Debug, Error)]
pub enum CertLoadError {
    /// Nothing is stored under the requested path.
    #[error("certificate {path} not found in key store")]
    NotFound { path: String },

    /// The entry exists but could not be read.
    #[error("failed to read certificate {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Errors that abort trust initialization.
///
/// Every variant is fatal at startup: a node configured for secure transport
/// cannot proceed without its trust anchor or, under mutual TLS, its own
/// identity.
#[derive(Debug, Error)]
pub enum TrustError {
    /// The root bundle could not be retrieved from the key store.
    #[error("failed loading TLS CA certificate chain {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: CertLoadError,
    },

    /// The root bundle was retrieved but yielded no usable certificate.
    #[error("failed appending TLS CA certificate chain {path}: no valid certificates")]
    Parse { path: String },

    /// The client certificate or key could not be retrieved.
    #[error("failed loading client identity {path}: {source}")]
    IdentityLoad {
        path: String,
        #[source]
        source: CertLoadError,
    },

    /// The client certificate or key was retrieved but is unusable.
    #[error("invalid client identity {path}: {reason}")]
    IdentityParse { path: String, reason: String },

    /// The configuration combination is not valid.
    #[error("invalid trust configuration: {0}")]
    Config(String),
}

/// Result type for trust initialization.
pub type TrustResult<T> = Result<T, TrustError>;

/// Errors raised while building a [`TlsPolicy`](crate::TlsPolicy).
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The expected peer identity is neither a DNS name nor an IP address.
    #[error("invalid expected server name {name:?}")]
    InvalidServerName { name: String },

    /// rustls rejected the configuration (bad key, unsupported versions).
    #[error("TLS configuration error: {0}")]
    Tls(#[from] rustls::Error),
}
