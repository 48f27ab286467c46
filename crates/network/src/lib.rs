//! Ledger Network Layer
//!
//! Outbound peer channels with configurable transport security.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐   policy   ┌────────────────────────┐
//! │ SecureChannelFactory │ ─────────> │   ConnectionFactory    │ ──> Channel
//! │ (plaintext or TLS?)  │            │ (TcpConnectionFactory) │
//! └──────────────────────┘            └────────────────────────┘
//!            ▲
//!            │ read-only
//!   TrustPool + ClientIdentity (ledger-security)
//! ```
//!
//! [`SecureChannelFactory`] makes the security decision for every dial and
//! [`ConnectionFactory`] carries it out. The factory is a trait so the
//! decision logic can be exercised without sockets.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ledger_network::{DialTarget, SecureChannelFactory, TcpConnectionFactory};
//! use ledger_security::{initialize_trust, FileCertLoader, TrustAnchorConfig};
//!
//! let config = Arc::new(TrustAnchorConfig::secure("tls/ca.pem"));
//! let trust = initialize_trust(&config, &FileCertLoader::new("keystore"))?;
//!
//! let channels = SecureChannelFactory::new(TcpConnectionFactory::default(), config, trust);
//! let channel = channels.dial(&DialTarget::new("10.0.0.5:7051", "peer0")).await?;
//! ```

pub mod channel;
pub mod connection;
pub mod dialer;
pub mod error;

pub use channel::Channel;
pub use connection::{ConnectionFactory, TcpConnectionFactory, DEFAULT_CONNECT_TIMEOUT};
pub use dialer::{DialTarget, SecureChannelFactory};
pub use error::{TransportError, TransportResult};
