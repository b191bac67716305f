//! Validated targeting dimensions.

use serde::{Deserialize, Serialize};

/// Lower bound of an SDK version range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SdkVersion {
    pub min: u32,
}

/// SDK version constraint of an APK or variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkVersionTargeting {
    /// Ranges this artifact is built for.
    #[serde(default)]
    pub values: Vec<SdkVersion>,

    /// Ranges served by sibling artifacts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<SdkVersion>,
}

impl SdkVersionTargeting {
    /// Smallest `min` among the targeted values, if any.
    pub fn lower_bound(&self) -> Option<u32> {
        self.values.iter().map(|v| v.min).min()
    }
}

/// Dimension constraints of one APK or one variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Targeting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk_version: Option<SdkVersionTargeting>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub abis: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub screen_densities: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
}

impl Targeting {
    /// Targeting with only an SDK lower bound.
    pub fn with_min_sdk(min: u32) -> Self {
        Self {
            sdk_version: Some(SdkVersionTargeting {
                values: vec![SdkVersion { min }],
                alternatives: Vec::new(),
            }),
            ..Default::default()
        }
    }

    /// SDK lower bound, or `None` when this targeting has no SDK dimension.
    pub fn min_sdk(&self) -> Option<u32> {
        self.sdk_version.as_ref().and_then(SdkVersionTargeting::lower_bound)
    }

    /// True when no dimension is constrained.
    pub fn is_empty(&self) -> bool {
        self.min_sdk().is_none()
            && self.abis.is_empty()
            && self.screen_densities.is_empty()
            && self.languages.is_empty()
    }
}
