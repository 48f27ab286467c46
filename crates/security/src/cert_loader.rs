//! Key-store access for certificate material.
//!
//! The trust initializer never touches the filesystem directly; it asks a
//! [`CertLoader`] for raw PEM bytes. [`FileCertLoader`] serves a key-store
//! directory on disk and [`MemoryCertLoader`] serves preloaded entries.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::CertLoadError;

/// Capability that returns raw PEM-encoded certificate material.
pub trait CertLoader: Send + Sync {
    /// Fetch the bytes stored under `path`.
    ///
    /// # Errors
    /// Returns an error if the entry is missing or unreadable.
    fn load_external_cert(&self, path: &str) -> Result<Vec<u8>, CertLoadError>;
}

/// Loads certificate material from a key-store directory.
///
/// Relative paths resolve against the key-store root; absolute paths are
/// used as given.
#[derive(Debug, Clone)]
pub struct FileCertLoader {
    root: PathBuf,
}

impl FileCertLoader {
    /// Create a loader rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The key-store root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key-store path to a filesystem path.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl CertLoader for FileCertLoader {
    fn load_external_cert(&self, path: &str) -> Result<Vec<u8>, CertLoadError> {
        let full_path = self.resolve(path);
        debug!("Loading external certificate from {}", full_path.display());

        std::fs::read(&full_path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => CertLoadError::NotFound {
                path: full_path.display().to_string(),
            },
            _ => CertLoadError::Io {
                path: full_path.display().to_string(),
                source,
            },
        })
    }
}

/// In-memory key store keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryCertLoader {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryCertLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `pem` under `path`, replacing any previous entry.
    pub fn insert(&mut self, path: impl Into<String>, pem: impl Into<Vec<u8>>) {
        self.entries.insert(path.into(), pem.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_entry(mut self, path: impl Into<String>, pem: impl Into<Vec<u8>>) -> Self {
        self.insert(path, pem);
        self
    }
}

impl CertLoader for MemoryCertLoader {
    fn load_external_cert(&self, path: &str) -> Result<Vec<u8>, CertLoadError> {
        self.entries
            .get(path)
            .cloned()
            .ok_or_else(|| CertLoadError::NotFound {
                path: path.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_loader_reads_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("tls")).unwrap();
        std::fs::write(dir.path().join("tls/ca.pem"), b"pem-bytes").unwrap();

        let loader = FileCertLoader::new(dir.path());
        let bytes = loader.load_external_cert("tls/ca.pem").unwrap();
        assert_eq!(bytes, b"pem-bytes");
    }

    #[test]
    fn test_file_loader_accepts_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ca.pem");
        std::fs::write(&path, b"absolute").unwrap();

        let loader = FileCertLoader::new("/nonexistent-keystore");
        let bytes = loader.load_external_cert(path.to_str().unwrap()).unwrap();
        assert_eq!(bytes, b"absolute");
    }

    #[test]
    fn test_file_loader_missing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FileCertLoader::new(dir.path());

        let err = loader.load_external_cert("missing.pem").unwrap_err();
        assert!(matches!(err, CertLoadError::NotFound { .. }));
    }

    #[test]
    fn test_memory_loader() {
        let loader = MemoryCertLoader::new().with_entry("ca.pem", "data");
        assert_eq!(loader.load_external_cert("ca.pem").unwrap(), b"data");
        assert!(matches!(
            loader.load_external_cert("other.pem"),
            Err(CertLoadError::NotFound { .. })
        ));
    }
}
