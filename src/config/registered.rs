//! Registered signing configuration
//!
//! Built once at the start of a build from user-supplied key material and
//! shared read-only by every per-artifact resolution. All cross-field
//! invariants are checked here so that resolution itself cannot fail.

use serde::Serialize;
use thiserror::Error;

use crate::signer::{RotationLineage, SignerIdentity};

/// Structural defects in a signing configuration
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("a rotation lineage requires an oldest signer")]
    LineageWithoutOldestSigner,

    #[error("invalid rotation lineage: {0}")]
    InvalidLineage(String),

    #[error("oldest signer '{0}' uses the same certificate as the current signer")]
    OldestSignerMatchesCurrent(String),

    #[error("conflicting scheme flags: {0}")]
    ConflictingSchemeFlags(String),

    #[error("{field} must be a positive API level, got {value}")]
    InvalidApiLevel { field: &'static str, value: u32 },
}

/// Scheme enablement for the build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchemeFlags {
    /// Apply scheme v2 to every artifact.
    pub v2_enabled: bool,

    /// Apply scheme v3 to every artifact.
    pub v3_enabled: bool,

    /// Tool-version feature gate: v1 is applied regardless of platform.
    pub force_v1: bool,

    /// Raises the platform version below which v1 is applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v1_floor: Option<u32>,
}

impl Default for SchemeFlags {
    fn default() -> Self {
        Self {
            v2_enabled: true,
            v3_enabled: true,
            force_v1: false,
            v1_floor: None,
        }
    }
}

/// Signers, optional rotation lineage and scheme flags for one build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredSigningConfiguration {
    signer: SignerIdentity,

    #[serde(skip_serializing_if = "Option::is_none")]
    oldest_signer: Option<SignerIdentity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    rotation_lineage: Option<RotationLineage>,

    schemes: SchemeFlags,
}

impl RegisteredSigningConfiguration {
    /// Configuration with a single signer and default scheme flags.
    pub fn single_signer(signer: SignerIdentity) -> Self {
        Self {
            signer,
            oldest_signer: None,
            rotation_lineage: None,
            schemes: SchemeFlags::default(),
        }
    }

    /// Validating factory for the full configuration.
    pub fn new(
        signer: SignerIdentity,
        oldest_signer: Option<SignerIdentity>,
        rotation_lineage: Option<RotationLineage>,
        schemes: SchemeFlags,
    ) -> Result<Self, ConfigurationError> {
        if let Some(oldest) = &oldest_signer {
            if oldest.certificate_sha256() == signer.certificate_sha256() {
                return Err(ConfigurationError::OldestSignerMatchesCurrent(
                    oldest.alias().to_string(),
                ));
            }
        }

        if let Some(lineage) = &rotation_lineage {
            let oldest = oldest_signer
                .as_ref()
                .ok_or(ConfigurationError::LineageWithoutOldestSigner)?;
            validate_lineage(lineage, oldest, &signer)?;

            if let Some(0) = lineage.min_rotation_api_version() {
                return Err(ConfigurationError::InvalidApiLevel {
                    field: "rotation.min_api",
                    value: 0,
                });
            }
            if !schemes.v3_enabled {
                return Err(ConfigurationError::ConflictingSchemeFlags(
                    "key rotation requires signature scheme v3".to_string(),
                ));
            }
        }

        if !schemes.v2_enabled && !schemes.v3_enabled && !schemes.force_v1 {
            return Err(ConfigurationError::ConflictingSchemeFlags(
                "v2 and v3 are both disabled; artifacts on newer platforms would be unsigned"
                    .to_string(),
            ));
        }

        if let Some(0) = schemes.v1_floor {
            return Err(ConfigurationError::InvalidApiLevel {
                field: "schemes.v1_floor",
                value: 0,
            });
        }

        Ok(Self {
            signer,
            oldest_signer,
            rotation_lineage,
            schemes,
        })
    }

    /// The current signer.
    pub fn signer(&self) -> &SignerIdentity {
        &self.signer
    }

    pub fn oldest_signer(&self) -> Option<&SignerIdentity> {
        self.oldest_signer.as_ref()
    }

    pub fn rotation_lineage(&self) -> Option<&RotationLineage> {
        self.rotation_lineage.as_ref()
    }

    pub fn schemes(&self) -> &SchemeFlags {
        &self.schemes
    }
}

fn validate_lineage(
    lineage: &RotationLineage,
    oldest: &SignerIdentity,
    current: &SignerIdentity,
) -> Result<(), ConfigurationError> {
    if lineage.len() < 2 {
        return Err(ConfigurationError::InvalidLineage(format!(
            "expected at least 2 certificates, got {}",
            lineage.len()
        )));
    }
    if lineage.has_duplicates() {
        return Err(ConfigurationError::InvalidLineage(
            "certificate appears more than once".to_string(),
        ));
    }
    if lineage.oldest() != Some(oldest.certificate_sha256()) {
        return Err(ConfigurationError::InvalidLineage(format!(
            "first certificate does not match oldest signer '{}'",
            oldest.alias()
        )));
    }
    if lineage.newest() != Some(current.certificate_sha256()) {
        return Err(ConfigurationError::InvalidLineage(format!(
            "last certificate does not match signer '{}'",
            current.alias()
        )));
    }
    Ok(())
}
