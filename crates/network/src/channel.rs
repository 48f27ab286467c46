//! Bidirectional channel returned by [`TcpConnectionFactory`](crate::TcpConnectionFactory).

use rustls::pki_types::CertificateDer;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;

/// An established peer connection, plaintext or TLS.
pub enum Channel {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl Channel {
    /// Whether traffic on this channel is protected by TLS.
    pub fn is_secure(&self) -> bool {
        matches!(self, Channel::Tls(_))
    }

    /// Remote socket address.
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        match self {
            Channel::Plain(s) => s.peer_addr(),
            Channel::Tls(s) => s.get_ref().0.peer_addr(),
        }
    }

    /// Certificate chain the peer presented, if any.
    pub fn peer_certificates(&self) -> Option<Vec<CertificateDer<'static>>> {
        match self {
            Channel::Plain(_) => None,
            Channel::Tls(s) => s.get_ref().1.peer_certificates().map(|c| c.to_vec()),
        }
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = if self.is_secure() { "tls" } else { "plain" };
        f.debug_struct("Channel")
            .field("mode", &mode)
            .field("peer_addr", &self.peer_addr().ok())
            .finish()
    }
}

impl AsyncRead for Channel {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &mut *self {
            Channel::Plain(s) => Pin::new(s).poll_read(cx, buf),
            Channel::Tls(s) => Pin::new(&mut **s).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for Channel {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match &mut *self {
            Channel::Plain(s) => Pin::new(s).poll_write(cx, buf),
            Channel::Tls(s) => Pin::new(&mut **s).poll_write(cx, buf),
        }
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            Channel::Plain(s) => Pin::new(s).poll_flush(cx),
            Channel::Tls(s) => Pin::new(&mut **s).poll_flush(cx),
        }
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            Channel::Plain(s) => Pin::new(s).poll_shutdown(cx),
            Channel::Tls(s) => Pin::new(&mut **s).poll_shutdown(cx),
        }
    }
}
