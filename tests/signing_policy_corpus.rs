//! Signing policy corpus tests
//!
//! Each case pairs artifact facts with a signing configuration and the
//! expected directive.

use apk_signing_policy::signer::certificate_fingerprint;
use apk_signing_policy::{
    has_restricted_rotation, resolve, resolve_all, ArtifactDescriptor, ArtifactFacts,
    ConfigLoadError, ConfigurationError, LoadedSigningConfig, RegisteredSigningConfiguration,
    RotationLineage, SchemeFlags, SignerError, SignerIdentity, SplitType, TargetingFacts,
    ValidationError,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/certs");

fn signer(alias: &str) -> SignerIdentity {
    let seed = format!("{}-certificate", alias);
    SignerIdentity::new(alias, &certificate_fingerprint(seed.as_bytes())).unwrap()
}

fn copy_fixture(dir: &Path, name: &str) {
    fs::copy(Path::new(FIXTURES).join(name), dir.join(name)).unwrap();
}

// Single current signer, no rotation
fn plain_config() -> RegisteredSigningConfiguration {
    RegisteredSigningConfiguration::single_signer(signer("current"))
}

// Oldest + current with a two-entry lineage
fn rotation_config(min_api: Option<u32>) -> RegisteredSigningConfiguration {
    let current = signer("current");
    let oldest = signer("oldest");
    let lineage = RotationLineage::new(
        &[oldest.certificate_sha256(), current.certificate_sha256()],
        min_api,
    )
    .unwrap();
    RegisteredSigningConfiguration::new(
        current,
        Some(oldest),
        Some(lineage),
        SchemeFlags::default(),
    )
    .unwrap()
}

fn artifact(manifest: i64, apk: i64, variant: i64) -> ArtifactDescriptor {
    ArtifactDescriptor::from_facts(ArtifactFacts {
        apk_targeting: TargetingFacts::with_min_sdk(apk),
        variant_targeting: TargetingFacts::with_min_sdk(variant),
        ..ArtifactFacts::master("base", "com.example.app", manifest)
    })
    .unwrap()
}

// =============================================================================
// Category 1: Reference scenarios
// =============================================================================

#[test]
fn test_scenario_a_no_rotation() {
    let descriptor = artifact(15, 0, 0);
    assert_eq!(descriptor.effective_min_sdk_version(), 15);

    let directive = resolve(&plain_config(), &descriptor);
    assert_eq!(directive.signer_aliases(), vec!["current"]);
    assert!(directive.apply_v1);
    assert!(directive.apply_v2);
    assert!(directive.apply_v3);
    assert!(directive.rotation_lineage.is_none());
}

#[test]
fn test_scenario_b_rotation_eligible() {
    let descriptor = artifact(21, 28, 0);
    assert_eq!(descriptor.effective_min_sdk_version(), 28);

    let directive = resolve(&rotation_config(Some(24)), &descriptor);
    assert_eq!(directive.signer_aliases(), vec!["oldest", "current"]);
    assert!(!directive.apply_v1);
    assert!(directive.rotation_lineage.is_some());
}

#[test]
fn test_scenario_c_rotation_not_eligible() {
    let descriptor = artifact(21, 19, 0);
    assert_eq!(descriptor.effective_min_sdk_version(), 21);

    let directive = resolve(&rotation_config(Some(24)), &descriptor);
    assert_eq!(directive.signer_aliases(), vec!["oldest"]);
    assert!(directive.apply_v1);
    assert!(directive.rotation_lineage.is_none());
    assert_eq!(directive.min_rotation_api_version, Some(24));
}

#[test]
fn test_scenario_d_lineage_without_oldest_signer() {
    let current = signer("current");
    let oldest = signer("oldest");
    let lineage = RotationLineage::new(
        &[oldest.certificate_sha256(), current.certificate_sha256()],
        Some(24),
    )
    .unwrap();

    let err =
        RegisteredSigningConfiguration::new(current, None, Some(lineage), SchemeFlags::default())
            .unwrap_err();
    assert_eq!(err, ConfigurationError::LineageWithoutOldestSigner);
}

// =============================================================================
// Category 2: Properties over a sweep of platform versions
// =============================================================================

#[test]
fn test_no_lineage_means_single_signer_everywhere() {
    let config = plain_config();
    for manifest in 1..=35 {
        let directive = resolve(&config, &artifact(manifest, 0, 0));
        assert_eq!(directive.signers.len(), 1, "manifest {}", manifest);
        assert!(directive.rotation_lineage.is_none());
    }
}

#[test]
fn test_rotation_split_at_threshold() {
    let config = rotation_config(Some(26));
    for sdk in 1..=35 {
        let directive = resolve(&config, &artifact(1, sdk, 0));
        if sdk >= 26 {
            assert_eq!(directive.signer_aliases(), vec!["oldest", "current"], "sdk {}", sdk);
        } else {
            assert_eq!(directive.signer_aliases(), vec!["oldest"], "sdk {}", sdk);
        }
    }
}

#[test]
fn test_current_signer_never_alone_when_rotating() {
    let config = rotation_config(Some(33));
    for sdk in 1..=40 {
        let directive = resolve(&config, &artifact(sdk, 0, 0));
        assert_eq!(directive.signers[0].alias(), "oldest", "sdk {}", sdk);
    }
}

#[test]
fn test_v1_always_below_android_n() {
    let forced = RegisteredSigningConfiguration::new(
        signer("current"),
        None,
        None,
        SchemeFlags {
            force_v1: true,
            ..Default::default()
        },
    )
    .unwrap();
    for sdk in 1..24 {
        assert!(resolve(&plain_config(), &artifact(sdk, 0, 0)).apply_v1);
        assert!(resolve(&forced, &artifact(sdk, 0, 0)).apply_v1);
    }
    assert!(!resolve(&plain_config(), &artifact(24, 0, 0)).apply_v1);
}

#[test]
fn test_restricted_rotation_query() {
    assert!(!has_restricted_rotation(&plain_config()));
    assert!(has_restricted_rotation(&rotation_config(Some(24))));
    assert!(!has_restricted_rotation(&rotation_config(Some(1))));
}

// =============================================================================
// Category 3: Artifact validation
// =============================================================================

#[test]
fn test_negative_manifest_min_sdk_rejected() {
    let err = ArtifactDescriptor::from_facts(ArtifactFacts::master("base", "com.example.app", -21))
        .unwrap_err();
    assert!(matches!(err, ValidationError::NegativeValue { .. }));
}

#[test]
fn test_config_split_resolves_like_master() {
    let facts = ArtifactFacts {
        split_type: SplitType::Config,
        split_name: Some("config.xxhdpi".to_string()),
        apk_targeting: TargetingFacts {
            screen_densities: vec!["xxhdpi".to_string()],
            ..Default::default()
        },
        ..ArtifactFacts::master("base", "com.example.app", 21)
    };
    let split = ArtifactDescriptor::from_facts(facts).unwrap();
    let master = artifact(21, 0, 0);
    let config = rotation_config(Some(24));
    assert_eq!(resolve(&config, &split), resolve(&config, &master));
}

// =============================================================================
// Category 4: Concurrency and configuration files
// =============================================================================

#[test]
fn test_shared_config_across_threads() {
    let config = Arc::new(rotation_config(Some(24)));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let config = Arc::clone(&config);
            std::thread::spawn(move || resolve(&config, &artifact(20 + i, 0, 0)))
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let directive = handle.join().unwrap();
        let expected = if 20 + i >= 24 { 2 } else { 1 };
        assert_eq!(directive.signers.len(), expected);
    }
}

#[test]
fn test_resolve_all_preserves_order() {
    let config = rotation_config(Some(24));
    let artifacts: Vec<_> = (1..=30).map(|sdk| artifact(sdk, 0, 0)).collect();
    let directives = resolve_all(&config, &artifacts);

    assert_eq!(directives.len(), artifacts.len());
    for (artifact, directive) in artifacts.iter().zip(&directives) {
        assert_eq!(directive.min_sdk_version, artifact.effective_min_sdk_version());
    }
}

#[test]
fn test_config_file_end_to_end() {
    let dir = TempDir::new().unwrap();
    copy_fixture(dir.path(), "oldest.pem");
    copy_fixture(dir.path(), "current.der");
    let config_path = dir.path().join("signing.toml");
    fs::write(
        &config_path,
        r#"
[signer]
alias = "upload-2024"
certificate = "current.der"

[oldest_signer]
alias = "upload-2016"
certificate = "oldest.pem"

[rotation]
min_api = 28
"#,
    )
    .unwrap();

    let loaded = LoadedSigningConfig::from_file(&config_path).unwrap();
    assert!(has_restricted_rotation(&loaded.config));

    let old_device = resolve(&loaded.config, &artifact(21, 0, 0));
    assert_eq!(old_device.signer_aliases(), vec!["upload-2016"]);
    assert!(old_device.apply_v1);

    let new_device = resolve(&loaded.config, &artifact(21, 0, 29));
    assert_eq!(new_device.signer_aliases(), vec!["upload-2016", "upload-2024"]);
    assert!(!new_device.apply_v1);
    assert_eq!(new_device.min_rotation_api_version, Some(28));
}

#[test]
fn test_config_file_rejects_non_certificate() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("release.pem"),
        "hello, I am definitely not an X.509 certificate\n",
    )
    .unwrap();
    let config_path = dir.path().join("signing.toml");
    fs::write(
        &config_path,
        "[signer]\nalias = \"release\"\ncertificate = \"release.pem\"\n",
    )
    .unwrap();

    let err = LoadedSigningConfig::from_file(&config_path).unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::Signer(SignerError::InvalidCertificate(_))
    ));
}
