//! Raw artifact facts as reported by module, variant and split assembly.
//!
//! Numbers are signed because upstream producers report them that way;
//! [`crate::ArtifactDescriptor::from_facts`] rejects anything negative.

use serde::{Deserialize, Serialize};

use crate::descriptor::SplitType;

/// Unvalidated targeting of one APK or variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetingFacts {
    /// Lower bounds of targeted SDK ranges (empty means no SDK dimension).
    #[serde(default)]
    pub sdk_min_versions: Vec<i64>,

    /// Lower bounds of alternative SDK ranges.
    #[serde(default)]
    pub sdk_alternatives: Vec<i64>,

    #[serde(default)]
    pub abis: Vec<String>,

    #[serde(default)]
    pub screen_densities: Vec<String>,

    #[serde(default)]
    pub languages: Vec<String>,
}

impl TargetingFacts {
    /// Targeting facts with a single SDK lower bound.
    pub fn with_min_sdk(min: i64) -> Self {
        Self {
            sdk_min_versions: vec![min],
            ..Default::default()
        }
    }
}

/// Unvalidated facts for one generated artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFacts {
    /// `minSdkVersion` declared in the artifact's manifest.
    pub manifest_min_sdk: i64,

    #[serde(default)]
    pub apk_targeting: TargetingFacts,

    #[serde(default)]
    pub variant_targeting: TargetingFacts,

    #[serde(default)]
    pub version_code: Option<i64>,

    #[serde(default)]
    pub variant_number: Option<i64>,

    pub module_name: String,

    pub package_name: String,

    pub split_type: SplitType,

    #[serde(default)]
    pub split_name: Option<String>,
}

impl ArtifactFacts {
    /// Facts for a master split of `module_name` with no targeting.
    pub fn master(module_name: &str, package_name: &str, manifest_min_sdk: i64) -> Self {
        Self {
            manifest_min_sdk,
            apk_targeting: TargetingFacts::default(),
            variant_targeting: TargetingFacts::default(),
            version_code: None,
            variant_number: None,
            module_name: module_name.to_string(),
            package_name: package_name.to_string(),
            split_type: SplitType::Master,
            split_name: None,
        }
    }
}
