//! Validated artifact descriptor.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::facts::{ArtifactFacts, TargetingFacts};
use crate::targeting::{SdkVersion, SdkVersionTargeting, Targeting};

/// Malformed artifact facts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be non-negative, got {value}")]
    NegativeValue { field: &'static str, value: i64 },

    #[error("{field} is out of range: {value}")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("config split of module '{module}' has no split name")]
    MissingSplitName { module: String },
}

/// How an artifact relates to the rest of the generated set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitType {
    /// Base split of a module.
    Master,
    /// Configuration split (ABI, density, language...).
    Config,
    /// Standalone APK for devices without split support.
    Standalone,
    /// System image APK.
    System,
}

impl SplitType {
    /// Standalone and system APKs are complete installable packages.
    pub fn is_standalone_equivalent(self) -> bool {
        matches!(self, SplitType::Standalone | SplitType::System)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SplitType::Master => "master",
            SplitType::Config => "config",
            SplitType::Standalone => "standalone",
            SplitType::System => "system",
        }
    }
}

/// Immutable facts about one generated artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactDescriptor {
    manifest_min_sdk: u32,
    apk_targeting: Targeting,
    variant_targeting: Targeting,
    #[serde(skip_serializing_if = "Option::is_none")]
    version_code: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    variant_number: Option<u32>,
    module_name: String,
    package_name: String,
    split_type: SplitType,
    #[serde(skip_serializing_if = "Option::is_none")]
    split_name: Option<String>,
}

impl ArtifactDescriptor {
    /// Validate raw facts into a descriptor.
    pub fn from_facts(facts: ArtifactFacts) -> Result<Self, ValidationError> {
        let manifest_min_sdk = to_u32("manifest_min_sdk", facts.manifest_min_sdk)?;
        let apk_targeting = validate_targeting("apk_targeting", &facts.apk_targeting)?;
        let variant_targeting = validate_targeting("variant_targeting", &facts.variant_targeting)?;

        let version_code = match facts.version_code {
            Some(v) if v < 0 => {
                return Err(ValidationError::NegativeValue {
                    field: "version_code",
                    value: v,
                })
            }
            Some(v) => Some(v as u64),
            None => None,
        };
        let variant_number = facts
            .variant_number
            .map(|v| to_u32("variant_number", v))
            .transpose()?;

        if facts.module_name.trim().is_empty() {
            return Err(ValidationError::MissingField("module_name"));
        }
        if facts.package_name.trim().is_empty() {
            return Err(ValidationError::MissingField("package_name"));
        }

        let split_name = facts.split_name.filter(|s| !s.trim().is_empty());
        if facts.split_type == SplitType::Config && split_name.is_none() {
            return Err(ValidationError::MissingSplitName {
                module: facts.module_name,
            });
        }

        Ok(Self {
            manifest_min_sdk,
            apk_targeting,
            variant_targeting,
            version_code,
            variant_number,
            module_name: facts.module_name,
            package_name: facts.package_name,
            split_type: facts.split_type,
            split_name,
        })
    }

    /// The tightest minimum SDK among manifest, APK and variant signals.
    pub fn effective_min_sdk_version(&self) -> u32 {
        crate::effective_min_sdk(
            self.manifest_min_sdk,
            self.apk_targeting.min_sdk().unwrap_or(0),
            self.variant_targeting.min_sdk().unwrap_or(0),
        )
    }

    pub fn manifest_min_sdk(&self) -> u32 {
        self.manifest_min_sdk
    }

    pub fn apk_targeting(&self) -> &Targeting {
        &self.apk_targeting
    }

    pub fn variant_targeting(&self) -> &Targeting {
        &self.variant_targeting
    }

    pub fn version_code(&self) -> Option<u64> {
        self.version_code
    }

    pub fn variant_number(&self) -> Option<u32> {
        self.variant_number
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn split_type(&self) -> SplitType {
        self.split_type
    }

    pub fn split_name(&self) -> Option<&str> {
        self.split_name.as_deref()
    }

    /// Short label for logs, e.g. `base/config.arm64_v8a`.
    pub fn label(&self) -> String {
        match &self.split_name {
            Some(name) => format!("{}/{}", self.module_name, name),
            None => format!("{}/{}", self.module_name, self.split_type.as_str()),
        }
    }
}

impl TryFrom<ArtifactFacts> for ArtifactDescriptor {
    type Error = ValidationError;

    fn try_from(facts: ArtifactFacts) -> Result<Self, Self::Error> {
        Self::from_facts(facts)
    }
}

fn to_u32(field: &'static str, value: i64) -> Result<u32, ValidationError> {
    if value < 0 {
        return Err(ValidationError::NegativeValue { field, value });
    }
    u32::try_from(value).map_err(|_| ValidationError::OutOfRange { field, value })
}

fn validate_sdk_versions(
    field: &'static str,
    values: &[i64],
) -> Result<Vec<SdkVersion>, ValidationError> {
    values
        .iter()
        .map(|&v| to_u32(field, v).map(|min| SdkVersion { min }))
        .collect()
}

fn validate_targeting(
    field: &'static str,
    facts: &TargetingFacts,
) -> Result<Targeting, ValidationError> {
    let values = validate_sdk_versions(field, &facts.sdk_min_versions)?;
    let alternatives = validate_sdk_versions(field, &facts.sdk_alternatives)?;
    let sdk_version = if values.is_empty() && alternatives.is_empty() {
        None
    } else {
        Some(SdkVersionTargeting {
            values,
            alternatives,
        })
    };

    Ok(Targeting {
        sdk_version,
        abis: facts.abis.clone(),
        screen_densities: facts.screen_densities.clone(),
        languages: facts.languages.clone(),
    })
}
