//! Signing certificate rotation lineage

use serde::Serialize;

use super::{normalize_fingerprint, SignerError};
use artifact_descriptor::ANDROID_P_API_VERSION;

/// Ordered chain of certificates, oldest first, ending at the current key.
///
/// Structural checks against the registered signers happen when the
/// signing configuration is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotationLineage {
    certificates: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    min_rotation_api_version: Option<u32>,
}

impl RotationLineage {
    /// Lineage from certificate fingerprints, oldest first.
    pub fn new<S: AsRef<str>>(
        certificates: &[S],
        min_rotation_api_version: Option<u32>,
    ) -> Result<Self, SignerError> {
        let certificates = certificates
            .iter()
            .map(|fp| normalize_fingerprint(fp.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            certificates,
            min_rotation_api_version,
        })
    }

    /// Certificate fingerprints, oldest first.
    pub fn certificates(&self) -> &[String] {
        &self.certificates
    }

    pub fn oldest(&self) -> Option<&str> {
        self.certificates.first().map(String::as_str)
    }

    pub fn newest(&self) -> Option<&str> {
        self.certificates.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    /// Explicitly configured rotation threshold, if any.
    pub fn min_rotation_api_version(&self) -> Option<u32> {
        self.min_rotation_api_version
    }

    /// Lowest platform version that trusts the rotated key set.
    ///
    /// Defaults to Android P when no threshold is configured.
    pub fn effective_min_rotation_api_version(&self) -> u32 {
        self.min_rotation_api_version.unwrap_or(ANDROID_P_API_VERSION)
    }

    pub(crate) fn has_duplicates(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        !self.certificates.iter().all(|fp| seen.insert(fp.as_str()))
    }
}
