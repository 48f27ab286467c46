//! Transport error types for outbound dials.

use ledger_security::PolicyError;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while establishing a channel to a peer.
///
/// Nothing at this layer retries; every error is surfaced to the caller.
#[derive(Debug, Error)]
pub enum TransportError {
    /// TCP connection could not be established.
    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    /// TLS handshake failed, including peer verification failures.
    #[error("TLS handshake with {address} failed: {source}")]
    Handshake {
        address: String,
        #[source]
        source: io::Error,
    },

    /// Connect and handshake did not finish in time.
    #[error("dial to {address} timed out after {timeout:?}")]
    Timeout { address: String, timeout: Duration },

    /// The expected peer identity cannot be used as a TLS server name.
    #[error("invalid expected server identity {0:?}")]
    InvalidServerName(String),

    /// Secure transport is required but no trust pool was supplied.
    #[error("secure transport required but no trust pool is available")]
    MissingTrustPool,

    /// Mutual authentication is required but no client identity was supplied.
    #[error("mutual authentication required but no client identity is available")]
    MissingClientIdentity,

    /// A secure connection was requested without TLS credentials.
    #[error("secure connection to {address} requested without TLS credentials")]
    MissingCredentials { address: String },

    /// rustls rejected the client configuration.
    #[error("TLS policy error: {0}")]
    Policy(#[source] rustls::Error),
}

impl From<PolicyError> for TransportError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::InvalidServerName { name } => TransportError::InvalidServerName(name),
            PolicyError::Tls(e) => TransportError::Policy(e),
        }
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
