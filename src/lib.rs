//! APK signing policy for app bundle builds
//!
//! For every artifact generated from a bundle (split or standalone APK) this
//! crate decides which signers to embed, which signature schemes (v1/v2/v3)
//! to apply, and whether to embed the key rotation lineage. Actual signing
//! is left to the signing backend.

pub mod config;
pub mod resolver;
pub mod signer;

pub use artifact_descriptor::{
    effective_min_sdk, ArtifactDescriptor, ArtifactFacts, SplitType, Targeting, TargetingFacts,
    ValidationError, ABSOLUTE_MIN_SDK_VERSION, ANDROID_N_API_VERSION, ANDROID_P_API_VERSION,
};
pub use config::{
    ConfigLoadError, ConfigurationError, LoadedSigningConfig, RegisteredSigningConfiguration,
    SchemeFlags,
};
pub use resolver::{
    has_restricted_rotation, resolve, resolve_all, PolicyExplanation, ResolvedSigningDirective,
    SigningPolicyResolver,
};
pub use signer::{RotationLineage, SignerError, SignerIdentity};
