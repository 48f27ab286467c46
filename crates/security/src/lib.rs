//! Trust anchor management for outbound peer connections.
//!
//! This crate builds everything a ledger node needs before it can dial a peer
//! over TLS:
//!
//! - [`TrustAnchorConfig`]: whether secure transport is required, where the
//!   root bundle lives and whether mutual authentication is on
//! - [`CertLoader`]: the key-store capability that hands out raw PEM bytes
//! - [`initialize_trust`]: turns the configured bundle into a [`TrustPool`]
//! - [`load_client_identity`]: loads the node's own certificate and key for
//!   mutual TLS
//! - [`TlsPolicy`]: the per-dial rustls client configuration bound to an
//!   expected server name
//!
//! # Example
//! ```no_run
//! use ledger_security::{initialize_trust, FileCertLoader, TlsPolicy, TrustAnchorConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TrustAnchorConfig::secure("tls/ca.pem");
//! let loader = FileCertLoader::new("/var/lib/ledger/keystore");
//!
//! if let Some(pool) = initialize_trust(&config, &loader)? {
//!     let policy = TlsPolicy::builder(&pool).build("peer0")?;
//!     assert_eq!(policy.root_count(), pool.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cert_loader;
pub mod config;
pub mod error;
pub mod identity;
pub mod tls_policy;
pub mod trust_store;

#[cfg(test)]
mod test_certs;

pub use cert_loader::{CertLoader, FileCertLoader, MemoryCertLoader};
pub use config::{ClientIdentityConfig, TrustAnchorConfig};
pub use error::{CertLoadError, PolicyError, TrustError, TrustResult};
pub use identity::{load_client_identity, ClientIdentity};
pub use tls_policy::{TlsPolicy, TlsPolicyBuilder};
pub use trust_store::{initialize_trust, TrustPool};
