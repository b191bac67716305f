//! Resolved signing directive handed to the signing backend

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::signer::{RotationLineage, SignerIdentity};

/// Errors computing a directive digest
#[derive(Debug, Error)]
pub enum DirectiveError {
    #[error("canonical JSON error: {0}")]
    Canonical(String),
}

/// What to sign one artifact with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSigningDirective {
    /// Signers to embed; oldest precedes current when both are present.
    pub signers: Vec<SignerIdentity>,

    pub apply_v1: bool,
    pub apply_v2: bool,
    pub apply_v3: bool,

    /// Present only when the artifact is eligible for rotation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_lineage: Option<RotationLineage>,

    /// Explicitly configured rotation threshold, regardless of eligibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rotation_api_version: Option<u32>,

    /// Effective minimum SDK the artifact is signed for.
    pub min_sdk_version: u32,
}

impl ResolvedSigningDirective {
    /// True when the rotated key set is embedded.
    pub fn uses_rotation(&self) -> bool {
        self.rotation_lineage.is_some()
    }

    /// Aliases of the embedded signers, in order.
    pub fn signer_aliases(&self) -> Vec<&str> {
        self.signers.iter().map(SignerIdentity::alias).collect()
    }

    /// Scheme versions to apply, e.g. `[1, 2, 3]`.
    pub fn schemes(&self) -> Vec<u8> {
        [(1, self.apply_v1), (2, self.apply_v2), (3, self.apply_v3)]
            .into_iter()
            .filter_map(|(v, on)| on.then_some(v))
            .collect()
    }

    /// SHA-256 of the RFC 8785 canonical JSON of this directive.
    pub fn digest(&self) -> Result<String, DirectiveError> {
        let jcs_bytes = serde_json_canonicalizer::to_vec(self)
            .map_err(|e| DirectiveError::Canonical(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&jcs_bytes);
        Ok(hex::encode(hasher.finalize()))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::certificate_fingerprint;

    fn directive(apply_v1: bool) -> ResolvedSigningDirective {
        ResolvedSigningDirective {
            signers: vec![
                SignerIdentity::new("release", &certificate_fingerprint(b"release")).unwrap(),
            ],
            apply_v1,
            apply_v2: true,
            apply_v3: true,
            rotation_lineage: None,
            min_rotation_api_version: None,
            min_sdk_version: 21,
        }
    }

    #[test]
    fn test_schemes_list() {
        assert_eq!(directive(true).schemes(), vec![1, 2, 3]);
        assert_eq!(directive(false).schemes(), vec![2, 3]);
    }

    #[test]
    fn test_digest_is_stable() {
        let a = directive(true).digest().unwrap();
        let b = directive(true).digest().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_digest_changes_with_decision() {
        assert_ne!(
            directive(true).digest().unwrap(),
            directive(false).digest().unwrap()
        );
    }

    #[test]
    fn test_json_omits_absent_rotation() {
        let json = directive(true).to_json().unwrap();
        assert!(json.contains("\"apply_v1\": true"));
        assert!(!json.contains("rotation_lineage"));
        assert!(!json.contains("min_rotation_api_version"));
    }

    #[test]
    fn test_signer_aliases() {
        assert_eq!(directive(true).signer_aliases(), vec!["release"]);
        assert!(!directive(true).uses_rotation());
    }
}
