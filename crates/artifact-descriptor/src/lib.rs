//! Per-artifact facts for APK signing decisions.
//!
//! Bundle splitting produces one artifact per module/variant/split. This crate
//! turns the raw facts reported for each artifact into a validated, immutable
//! [`ArtifactDescriptor`] and derives the effective minimum SDK version the
//! artifact will be installed on.

mod descriptor;
mod facts;
mod targeting;

pub use descriptor::{ArtifactDescriptor, SplitType, ValidationError};
pub use facts::{ArtifactFacts, TargetingFacts};
pub use targeting::{SdkVersion, SdkVersionTargeting, Targeting};

/// Lowest platform version any artifact can run on.
pub const ABSOLUTE_MIN_SDK_VERSION: u32 = 1;

/// Android N, the first platform version that verifies signature scheme v2.
pub const ANDROID_N_API_VERSION: u32 = 24;

/// Android P, the first platform version that verifies v3 key rotation.
pub const ANDROID_P_API_VERSION: u32 = 28;

/// Effective minimum SDK from the three independent version signals.
///
/// Total over all inputs; the result is the tightest (highest) constraint.
pub fn effective_min_sdk(manifest_min_sdk: u32, apk_min_sdk: u32, variant_min_sdk: u32) -> u32 {
    manifest_min_sdk.max(apk_min_sdk).max(variant_min_sdk)
}
