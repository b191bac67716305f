//! Signing policy resolver
//!
//! Decides, per generated artifact, which signers and signature schemes to
//! apply and whether to embed the rotation lineage. Resolution is a pure
//! function of the registered configuration and the artifact descriptor;
//! all configuration defects are rejected when the configuration is built.

mod directive;
mod explain;

pub use directive::{DirectiveError, ResolvedSigningDirective};
pub use explain::{PolicyExplanation, RotationDecision, SdkSignals, V1Reason};

use artifact_descriptor::{ArtifactDescriptor, ABSOLUTE_MIN_SDK_VERSION, ANDROID_N_API_VERSION};

use crate::config::RegisteredSigningConfiguration;

/// Resolver bound to one build's signing configuration
#[derive(Debug, Clone, Copy)]
pub struct SigningPolicyResolver<'a> {
    config: &'a RegisteredSigningConfiguration,
}

impl<'a> SigningPolicyResolver<'a> {
    pub fn new(config: &'a RegisteredSigningConfiguration) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &'a RegisteredSigningConfiguration {
        self.config
    }

    /// Resolve the directive for one artifact.
    pub fn resolve(&self, artifact: &ArtifactDescriptor) -> ResolvedSigningDirective {
        resolve(self.config, artifact)
    }

    /// Resolve a batch in parallel, preserving input order.
    pub fn resolve_all(&self, artifacts: &[ArtifactDescriptor]) -> Vec<ResolvedSigningDirective> {
        resolve_all(self.config, artifacts)
    }

    /// Explain the decision for one artifact.
    pub fn explain(&self, artifact: &ArtifactDescriptor) -> PolicyExplanation {
        PolicyExplanation::new(self.config, artifact)
    }

    pub fn has_restricted_rotation(&self) -> bool {
        has_restricted_rotation(self.config)
    }
}

/// Whether the rotated key set may be embedded for an artifact.
pub fn is_rotation_eligible(
    config: &RegisteredSigningConfiguration,
    artifact: &ArtifactDescriptor,
) -> bool {
    config.rotation_lineage().is_some_and(|lineage| {
        artifact.effective_min_sdk_version() >= lineage.effective_min_rotation_api_version()
    })
}

/// Platform version below which scheme v1 is applied.
pub fn v1_threshold(config: &RegisteredSigningConfiguration) -> u32 {
    config
        .schemes()
        .v1_floor
        .map_or(ANDROID_N_API_VERSION, |floor| floor.max(ANDROID_N_API_VERSION))
}

/// Resolve the signing directive for one artifact.
pub fn resolve(
    config: &RegisteredSigningConfiguration,
    artifact: &ArtifactDescriptor,
) -> ResolvedSigningDirective {
    let min_sdk_version = artifact.effective_min_sdk_version();
    let rotation_eligible = is_rotation_eligible(config, artifact);

    // Below the rotation threshold only the most backward-compatible key is
    // embedded; the rotated key alone is never used.
    let signers = match (rotation_eligible, config.oldest_signer()) {
        (true, Some(oldest)) => vec![oldest.clone(), config.signer().clone()],
        (false, Some(oldest)) => vec![oldest.clone()],
        (_, None) => vec![config.signer().clone()],
    };

    let schemes = config.schemes();
    let apply_v1 = min_sdk_version < v1_threshold(config) || schemes.force_v1;

    let rotation_lineage = if rotation_eligible {
        config.rotation_lineage().cloned()
    } else {
        None
    };
    let min_rotation_api_version = config
        .rotation_lineage()
        .and_then(|lineage| lineage.min_rotation_api_version());

    tracing::debug!(
        artifact = %artifact.label(),
        min_sdk = min_sdk_version,
        rotation_eligible,
        signers = signers.len(),
        apply_v1,
        "resolved signing directive"
    );

    ResolvedSigningDirective {
        signers,
        apply_v1,
        apply_v2: schemes.v2_enabled,
        apply_v3: schemes.v3_enabled,
        rotation_lineage,
        min_rotation_api_version,
        min_sdk_version,
    }
}

/// Resolve a batch of artifacts across scoped threads.
///
/// The configuration is shared read-only; results keep input order.
pub fn resolve_all(
    config: &RegisteredSigningConfiguration,
    artifacts: &[ArtifactDescriptor],
) -> Vec<ResolvedSigningDirective> {
    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(artifacts.len().max(1));
    if workers <= 1 {
        return artifacts.iter().map(|a| resolve(config, a)).collect();
    }

    let chunk_size = artifacts.len().div_ceil(workers);
    std::thread::scope(|scope| {
        let handles: Vec<_> = artifacts
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|a| resolve(config, a))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(directives) => directives,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}

/// True when some artifacts of the build fall back to the oldest signer.
pub fn has_restricted_rotation(config: &RegisteredSigningConfiguration) -> bool {
    config.rotation_lineage().is_some_and(|lineage| {
        lineage.effective_min_rotation_api_version() > ABSOLUTE_MIN_SDK_VERSION
    })
}
