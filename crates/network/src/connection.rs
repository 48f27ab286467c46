//! Connection-factory capability and its TCP/rustls implementation.
//!
//! [`SecureChannelFactory`](crate::SecureChannelFactory) decides *how* a dial
//! is secured; a [`ConnectionFactory`] performs it. The factory receives the
//! address, the keep-alive flag, whether TLS is required and, for secure
//! dials, the [`TlsPolicy`] to handshake with.

use async_trait::async_trait;
use ledger_security::TlsPolicy;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{lookup_host, TcpSocket, TcpStream};
use tokio_rustls::TlsConnector;
use tracing::{debug, warn};

use crate::channel::Channel;
use crate::error::{TransportError, TransportResult};

/// Default bound on TCP connect plus TLS handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Produces client connections on request.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Handle returned for an established connection.
    type Channel: Send;

    /// Open a connection to `address`.
    ///
    /// `credentials` is `Some` exactly when `secure` is true.
    async fn new_client_connection(
        &self,
        address: &str,
        enable_keep_alive: bool,
        secure: bool,
        credentials: Option<TlsPolicy>,
    ) -> TransportResult<Self::Channel>;
}

#[async_trait]
impl<T: ConnectionFactory + ?Sized> ConnectionFactory for Arc<T> {
    type Channel = T::Channel;

    async fn new_client_connection(
        &self,
        address: &str,
        enable_keep_alive: bool,
        secure: bool,
        credentials: Option<TlsPolicy>,
    ) -> TransportResult<Self::Channel> {
        (**self)
            .new_client_connection(address, enable_keep_alive, secure, credentials)
            .await
    }
}

/// Dials peers over TCP and, when asked, wraps the stream in rustls.
#[derive(Debug, Clone)]
pub struct TcpConnectionFactory {
    connect_timeout: Duration,
}

impl Default for TcpConnectionFactory {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

impl TcpConnectionFactory {
    /// Create a factory bounding each dial by `connect_timeout`.
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    async fn establish(
        &self,
        address: &str,
        enable_keep_alive: bool,
        credentials: Option<TlsPolicy>,
    ) -> TransportResult<Channel> {
        let stream = connect_tcp(address, enable_keep_alive)
            .await
            .map_err(|source| TransportError::Connect {
                address: address.to_string(),
                source,
            })?;

        let Some(policy) = credentials else {
            debug!("Plaintext connection established to {}", address);
            return Ok(Channel::Plain(stream));
        };

        let connector = TlsConnector::from(policy.client_config());
        let tls_stream = connector
            .connect(policy.server_name().clone(), stream)
            .await
            .map_err(|source| TransportError::Handshake {
                address: address.to_string(),
                source,
            })?;

        debug!("TLS connection established to {}", address);
        Ok(Channel::Tls(Box::new(tls_stream)))
    }
}

#[async_trait]
impl ConnectionFactory for TcpConnectionFactory {
    type Channel = Channel;

    async fn new_client_connection(
        &self,
        address: &str,
        enable_keep_alive: bool,
        secure: bool,
        credentials: Option<TlsPolicy>,
    ) -> TransportResult<Channel> {
        let credentials = match (secure, credentials) {
            (true, None) => {
                return Err(TransportError::MissingCredentials {
                    address: address.to_string(),
                })
            }
            (true, policy) => policy,
            (false, Some(_)) => {
                warn!("Ignoring TLS credentials for plaintext dial to {}", address);
                None
            }
            (false, None) => None,
        };

        tokio::time::timeout(
            self.connect_timeout,
            self.establish(address, enable_keep_alive, credentials),
        )
        .await
        .map_err(|_| TransportError::Timeout {
            address: address.to_string(),
            timeout: self.connect_timeout,
        })?
    }
}

/// Connect to the first reachable resolved address.
async fn connect_tcp(address: &str, enable_keep_alive: bool) -> io::Result<TcpStream> {
    let mut last_err = None;

    for addr in lookup_host(address).await? {
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_keepalive(enable_keep_alive)?;

        match socket.connect(addr).await {
            Ok(stream) => {
                stream.set_nodelay(true)?;
                return Ok(stream);
            }
            Err(e) => {
                debug!("Connect to {} failed: {}", addr, e);
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("{} did not resolve to any address", address),
        )
    }))
}
