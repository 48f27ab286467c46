//! Trust pool construction from the configured root bundle.
//!
//! The pool is built once at startup and shared read-only with every dial.
//! A pool is never mutated after construction; re-initialization builds a
//! fresh one.

use rustls::pki_types::CertificateDer;
use rustls::RootCertStore;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info, warn};

use crate::cert_loader::CertLoader;
use crate::config::TrustAnchorConfig;
use crate::error::{TrustError, TrustResult};

/// Roots expiring inside this window are reported at startup.
const EXPIRY_WARNING_WINDOW: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Read-only set of trusted root certificates.
///
/// Cloning is cheap; clones share the same underlying store.
#[derive(Debug, Clone)]
pub struct TrustPool {
    roots: Arc<RootCertStore>,
    certificates: Arc<[CertificateDer<'static>]>,
}

impl TrustPool {
    /// Parse a PEM bundle into a pool.
    ///
    /// Non-certificate sections are skipped. Certificates that cannot serve
    /// as trust anchors are ignored, as are malformed PEM sections.
    ///
    /// # Errors
    /// Returns [`TrustError::Parse`] if no certificate was appended.
    pub fn from_pem(pem: &[u8], source: &str) -> TrustResult<Self> {
        let mut reader = pem;
        let mut candidates = Vec::new();
        for item in rustls_pemfile::certs(&mut reader) {
            match item {
                Ok(cert) => candidates.push(cert),
                Err(e) => warn!("Skipping malformed PEM section in {}: {}", source, e),
            }
        }

        let mut roots = RootCertStore::empty();
        let mut certificates = Vec::with_capacity(candidates.len());
        for (i, cert) in candidates.into_iter().enumerate() {
            match roots.add(cert.clone()) {
                Ok(()) => certificates.push(cert),
                Err(e) => warn!("Ignoring certificate {} in {}: {}", i, source, e),
            }
        }

        if certificates.is_empty() {
            return Err(TrustError::Parse {
                path: source.to_string(),
            });
        }

        debug!("Appended {} certificate(s) from {}", certificates.len(), source);

        Ok(Self {
            roots: Arc::new(roots),
            certificates: certificates.into(),
        })
    }

    /// Number of trusted roots.
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    /// The rustls root store backing this pool.
    pub fn roots(&self) -> Arc<RootCertStore> {
        Arc::clone(&self.roots)
    }

    /// DER encodings of the trusted roots, in bundle order.
    pub fn certificates(&self) -> &[CertificateDer<'static>] {
        &self.certificates
    }

    /// Subject distinguished names of the trusted roots.
    pub fn subjects(&self) -> Vec<String> {
        use x509_parser::prelude::*;

        self.certificates
            .iter()
            .filter_map(|cert| X509Certificate::from_der(cert.as_ref()).ok())
            .map(|(_, parsed)| parsed.subject().to_string())
            .collect()
    }

    /// Subjects of roots that have expired or will expire within `window`.
    pub fn expiring_within(&self, window: Duration) -> Vec<String> {
        use x509_parser::prelude::*;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();
        let deadline = now.saturating_add(window.as_secs() as i64);

        self.certificates
            .iter()
            .filter_map(|cert| X509Certificate::from_der(cert.as_ref()).ok())
            .filter(|(_, parsed)| parsed.validity().not_after.timestamp() < deadline)
            .map(|(_, parsed)| parsed.subject().to_string())
            .collect()
    }
}

/// Build the node's trust pool.
///
/// Returns `Ok(None)` when secure transport is disabled; dials then use
/// plaintext and no bundle is read. Otherwise the bundle is fetched through
/// `loader` and parsed into a fresh pool.
///
/// # Errors
/// - [`TrustError::Config`] if secure mode has no bundle path
/// - [`TrustError::Load`] if the loader cannot provide the bundle
/// - [`TrustError::Parse`] if the bundle holds no valid certificate
pub fn initialize_trust(
    config: &TrustAnchorConfig,
    loader: &dyn CertLoader,
) -> TrustResult<Option<TrustPool>> {
    debug!("Initializing TLS trust...");

    if !config.secure_transport_required {
        debug!("Initializing TLS trust... disabled");
        return Ok(None);
    }

    let path = config.trust_bundle_path()?;

    let pem = loader.load_external_cert(path).map_err(|source| {
        error!("Failed loading TLS CA certificate chain [{}]", source);
        TrustError::Load {
            path: path.to_string(),
            source,
        }
    })?;

    let pool = TrustPool::from_pem(&pem, path).map_err(|e| {
        error!("Failed appending TLS CA certificate chain from {}", path);
        e
    })?;

    for subject in pool.expiring_within(EXPIRY_WARNING_WINDOW) {
        warn!("Trusted root {} is expired or expires within 30 days", subject);
    }

    info!("Initializing TLS trust... done ({} root(s) from {})", pool.len(), path);
    Ok(Some(pool))
}
