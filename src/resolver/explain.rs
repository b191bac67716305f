//! Explain output for signing decisions
//!
//! Shows the three version signals, the rotation decision and the scheme
//! decision for one artifact, as JSON or as text.

use serde::Serialize;

use super::{is_rotation_eligible, resolve, v1_threshold, ResolvedSigningDirective};
use crate::config::RegisteredSigningConfiguration;
use artifact_descriptor::{ArtifactDescriptor, SplitType};

/// The version signals behind the effective minimum SDK
#[derive(Debug, Clone, Serialize)]
pub struct SdkSignals {
    pub manifest_min_sdk: u32,
    pub apk_targeting_min_sdk: Option<u32>,
    pub variant_targeting_min_sdk: Option<u32>,
    pub effective_min_sdk: u32,
}

/// Why rotation was or wasn't applied
#[derive(Debug, Clone, Serialize)]
pub struct RotationDecision {
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u32>,
    pub eligible: bool,
}

/// Why scheme v1 was or wasn't applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum V1Reason {
    BelowThreshold { threshold: u32 },
    Forced,
    NotRequired { threshold: u32 },
}

/// Explanation of the directive for one artifact
#[derive(Debug, Clone, Serialize)]
pub struct PolicyExplanation {
    pub artifact: String,
    pub package_name: String,
    pub split_type: SplitType,
    pub sdk: SdkSignals,
    pub rotation: RotationDecision,
    pub v1_reason: V1Reason,
    pub directive: ResolvedSigningDirective,
    pub explanation: String,
}

impl PolicyExplanation {
    pub fn new(config: &RegisteredSigningConfiguration, artifact: &ArtifactDescriptor) -> Self {
        let directive = resolve(config, artifact);

        let sdk = SdkSignals {
            manifest_min_sdk: artifact.manifest_min_sdk(),
            apk_targeting_min_sdk: artifact.apk_targeting().min_sdk(),
            variant_targeting_min_sdk: artifact.variant_targeting().min_sdk(),
            effective_min_sdk: artifact.effective_min_sdk_version(),
        };

        let rotation = RotationDecision {
            configured: config.rotation_lineage().is_some(),
            threshold: config
                .rotation_lineage()
                .map(|l| l.effective_min_rotation_api_version()),
            eligible: is_rotation_eligible(config, artifact),
        };

        let threshold = v1_threshold(config);
        let v1_reason = if sdk.effective_min_sdk < threshold {
            V1Reason::BelowThreshold { threshold }
        } else if config.schemes().force_v1 {
            V1Reason::Forced
        } else {
            V1Reason::NotRequired { threshold }
        };

        let label = artifact.label();
        let explanation =
            Self::generate_explanation(&label, &sdk, &rotation, v1_reason, &directive);

        Self {
            artifact: label,
            package_name: artifact.package_name().to_string(),
            split_type: artifact.split_type(),
            sdk,
            rotation,
            v1_reason,
            directive,
            explanation,
        }
    }

    fn generate_explanation(
        label: &str,
        sdk: &SdkSignals,
        rotation: &RotationDecision,
        v1_reason: V1Reason,
        directive: &ResolvedSigningDirective,
    ) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Artifact: {}", label));
        lines.push(String::new());
        lines.push(format!(
            "Effective min SDK: {} (manifest {}, apk {}, variant {})",
            sdk.effective_min_sdk,
            sdk.manifest_min_sdk,
            fmt_signal(sdk.apk_targeting_min_sdk),
            fmt_signal(sdk.variant_targeting_min_sdk),
        ));

        match (rotation.configured, rotation.threshold) {
            (true, Some(threshold)) if rotation.eligible => lines.push(format!(
                "Rotation: ELIGIBLE ({} >= {})",
                sdk.effective_min_sdk, threshold
            )),
            (true, Some(threshold)) => lines.push(format!(
                "Rotation: NOT ELIGIBLE ({} < {}), oldest signer only",
                sdk.effective_min_sdk, threshold
            )),
            _ => lines.push("Rotation: not configured".to_string()),
        }

        lines.push(format!("Signers: {}", directive.signer_aliases().join(", ")));

        let schemes: Vec<String> = directive.schemes().iter().map(|v| format!("v{}", v)).collect();
        lines.push(format!("Schemes: {}", schemes.join(", ")));
        lines.push(format!("  v1: {}", Self::format_v1_reason(v1_reason)));

        lines.join("\n")
    }

    fn format_v1_reason(reason: V1Reason) -> String {
        match reason {
            V1Reason::BelowThreshold { threshold } => {
                format!("applied, platform below {}", threshold)
            }
            V1Reason::Forced => "applied, forced for this build".to_string(),
            V1Reason::NotRequired { threshold } => {
                format!("skipped, platform at or above {}", threshold)
            }
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_human(&self) -> String {
        let mut output = self.explanation.clone();
        output.push_str("\n\n--- Signers ---\n");
        for signer in &self.directive.signers {
            output.push_str(&format!("{}\n", signer));
        }
        if let Some(lineage) = &self.directive.rotation_lineage {
            output.push_str(&format!("Lineage: {} certificates\n", lineage.len()));
        }
        output
    }
}

fn fmt_signal(signal: Option<u32>) -> String {
    signal.map_or_else(|| "-".to_string(), |v| v.to_string())
}
