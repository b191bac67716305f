//! Signer identities and rotation lineage
//!
//! A signer identity refers to a key/certificate pair by alias and by the
//! SHA-256 fingerprint of its DER-encoded certificate. Private key material
//! never passes through this crate; the signing backend looks keys up by
//! identity.

mod lineage;

pub use lineage::RotationLineage;

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;
use x509_certificate::X509Certificate;

/// Length of a hex-encoded SHA-256 fingerprint.
pub const FINGERPRINT_HEX_LEN: usize = 64;

/// Errors from building signer identities
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("I/O error reading certificate {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("signer alias cannot be empty")]
    EmptyAlias,

    #[error("invalid certificate fingerprint '{0}': expected 64 hex characters")]
    InvalidFingerprint(String),

    #[error("certificate is empty")]
    EmptyCertificate,

    #[error("invalid X.509 certificate: {0}")]
    InvalidCertificate(String),
}

/// Opaque reference to a signing key and its certificate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SignerIdentity {
    alias: String,
    certificate_sha256: String,
}

impl SignerIdentity {
    /// Identity from an already-computed certificate fingerprint.
    pub fn new(alias: &str, certificate_sha256: &str) -> Result<Self, SignerError> {
        let alias = alias.trim();
        if alias.is_empty() {
            return Err(SignerError::EmptyAlias);
        }
        Ok(Self {
            alias: alias.to_string(),
            certificate_sha256: normalize_fingerprint(certificate_sha256)?,
        })
    }

    /// Identity from a DER-encoded X.509 certificate.
    pub fn from_der(alias: &str, der: &[u8]) -> Result<Self, SignerError> {
        if der.is_empty() {
            return Err(SignerError::EmptyCertificate);
        }
        let certificate = X509Certificate::from_der(der)
            .map_err(|e| SignerError::InvalidCertificate(e.to_string()))?;
        Self::from_certificate(alias, &certificate)
    }

    /// Identity from the first certificate of a PEM document.
    pub fn from_pem(alias: &str, pem: &[u8]) -> Result<Self, SignerError> {
        let certificate = X509Certificate::from_pem(pem)
            .map_err(|e| SignerError::InvalidCertificate(e.to_string()))?;
        Self::from_certificate(alias, &certificate)
    }

    /// Identity from a certificate file, PEM or DER.
    pub fn from_certificate_file(alias: &str, path: &Path) -> Result<Self, SignerError> {
        let bytes = fs::read(path).map_err(|source| SignerError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if contains_pem_armor(&bytes) {
            Self::from_pem(alias, &bytes)
        } else {
            Self::from_der(alias, &bytes)
        }
    }

    fn from_certificate(alias: &str, certificate: &X509Certificate) -> Result<Self, SignerError> {
        let der = certificate
            .encode_der()
            .map_err(|e| SignerError::InvalidCertificate(e.to_string()))?;
        Self::new(alias, &certificate_fingerprint(&der))
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Lowercase hex SHA-256 of the certificate.
    pub fn certificate_sha256(&self) -> &str {
        &self.certificate_sha256
    }
}

impl fmt::Display for SignerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.alias, &self.certificate_sha256[..16])
    }
}

/// SHA-256 fingerprint of DER certificate bytes (hex-encoded)
pub fn certificate_fingerprint(der: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(der);
    hex::encode(hasher.finalize())
}

/// Validate a hex fingerprint, accepting `:` separators and uppercase.
pub fn normalize_fingerprint(raw: &str) -> Result<String, SignerError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ':')
        .collect::<String>()
        .to_ascii_lowercase();
    if cleaned.len() != FINGERPRINT_HEX_LEN || !cleaned.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(SignerError::InvalidFingerprint(raw.to_string()));
    }
    Ok(cleaned)
}

// PEM files may carry explanatory text before the armor.
fn contains_pem_armor(bytes: &[u8]) -> bool {
    bytes.windows(b"-----BEGIN ".len()).any(|w| w == b"-----BEGIN ")
}
