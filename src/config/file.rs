//! Signing configuration file (signing.toml)
//!
//! The file is merged over the built-in defaults, then CLI overrides are
//! merged over the file. Each contributing layer is recorded with its
//! origin and, for files, the SHA-256 digest of the raw bytes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;
use super::registered::{ConfigurationError, RegisteredSigningConfiguration, SchemeFlags};
use crate::resolver::has_restricted_rotation;
use crate::signer::{RotationLineage, SignerError, SignerIdentity};

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "signing.toml";

/// Errors while loading a signing configuration
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("signer error: {0}")]
    Signer(#[from] SignerError),

    #[error("invalid signing configuration: {0}")]
    Invalid(#[from] ConfigurationError),
}

/// Origin of a configuration layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing layer with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 of the raw file bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct SignerEntry {
    alias: String,
    #[serde(default)]
    certificate: Option<PathBuf>,
    #[serde(default)]
    fingerprint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RotationEntry {
    #[serde(default)]
    lineage: Option<Vec<String>>,
    #[serde(default)]
    min_api: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemesEntry {
    v2: bool,
    v3: bool,
    force_v1: bool,
    #[serde(default)]
    v1_floor: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct SigningConfigDocument {
    signer: SignerEntry,
    #[serde(default)]
    oldest_signer: Option<SignerEntry>,
    #[serde(default)]
    rotation: Option<RotationEntry>,
    schemes: SchemesEntry,
}

/// A validated configuration plus the layers it was built from
#[derive(Debug, Clone)]
pub struct LoadedSigningConfig {
    pub config: RegisteredSigningConfiguration,
    pub sources: Vec<ConfigSource>,
}

impl LoadedSigningConfig {
    /// Load from an optional file plus CLI override layers.
    ///
    /// Relative certificate paths resolve against the file's directory,
    /// or the working directory when no file is given.
    pub fn load(
        config_path: Option<&Path>,
        cli_overrides: Vec<Value>,
    ) -> Result<Self, ConfigLoadError> {
        let mut layers = vec![BuiltinDefaults::default().to_value()];
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        }];

        let mut base_dir = PathBuf::from(".");
        if let Some(path) = config_path {
            let (value, digest) = load_toml_file(path)?;
            layers.push(value);
            sources.push(ConfigSource {
                origin: ConfigOrigin::File,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
            if let Some(parent) = path.parent() {
                base_dir = parent.to_path_buf();
            }
        }

        if !cli_overrides.is_empty() {
            layers.extend(cli_overrides);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);
        let document: SigningConfigDocument = serde_json::from_value(merged)
            .map_err(|e| ConfigLoadError::Parse(format!("signing config: {}", e)))?;
        let config = build_configuration(document, &base_dir)?;

        for source in &sources {
            tracing::info!(
                origin = ?source.origin,
                path = source.path.as_deref().unwrap_or("-"),
                "signing config layer"
            );
        }
        if has_restricted_rotation(&config) {
            if let Some(lineage) = config.rotation_lineage() {
                tracing::warn!(
                    min_rotation_api = lineage.effective_min_rotation_api_version(),
                    "key rotation is restricted; artifacts below the threshold \
                     are signed with the oldest signer only"
                );
            }
        }

        Ok(Self { config, sources })
    }

    /// Load a single TOML file with no overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigLoadError> {
        Self::load(Some(path), Vec::new())
    }
}

fn build_configuration(
    document: SigningConfigDocument,
    base_dir: &Path,
) -> Result<RegisteredSigningConfiguration, ConfigLoadError> {
    let signer = build_signer(&document.signer, base_dir)?;
    let oldest_signer = document
        .oldest_signer
        .as_ref()
        .map(|entry| build_signer(entry, base_dir))
        .transpose()?;

    let rotation_lineage = match document.rotation {
        None => None,
        Some(rotation) => {
            let certificates = match rotation.lineage {
                Some(list) => list,
                None => {
                    let oldest = oldest_signer
                        .as_ref()
                        .ok_or(ConfigurationError::LineageWithoutOldestSigner)?;
                    vec![
                        oldest.certificate_sha256().to_string(),
                        signer.certificate_sha256().to_string(),
                    ]
                }
            };
            Some(RotationLineage::new(&certificates, rotation.min_api)?)
        }
    };

    let schemes = SchemeFlags {
        v2_enabled: document.schemes.v2,
        v3_enabled: document.schemes.v3,
        force_v1: document.schemes.force_v1,
        v1_floor: document.schemes.v1_floor,
    };

    Ok(RegisteredSigningConfiguration::new(
        signer,
        oldest_signer,
        rotation_lineage,
        schemes,
    )?)
}

fn build_signer(entry: &SignerEntry, base_dir: &Path) -> Result<SignerIdentity, ConfigLoadError> {
    match (&entry.certificate, &entry.fingerprint) {
        (Some(_), Some(_)) => Err(ConfigLoadError::Parse(format!(
            "signer '{}' sets both 'certificate' and 'fingerprint'",
            entry.alias
        ))),
        (Some(cert), None) => {
            let path = if cert.is_absolute() {
                cert.clone()
            } else {
                base_dir.join(cert)
            };
            Ok(SignerIdentity::from_certificate_file(&entry.alias, &path)?)
        }
        (None, Some(fp)) => Ok(SignerIdentity::new(&entry.alias, fp)?),
        (None, None) => Err(ConfigLoadError::Parse(format!(
            "signer '{}' needs either 'certificate' or 'fingerprint'",
            entry.alias
        ))),
    }
}

/// Load and parse a TOML file, returning the value and digest
fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigLoadError> {
    let bytes = fs::read(path)
        .map_err(|e| ConfigLoadError::Io(format!("{}: {}", path.display(), e)))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    let contents = String::from_utf8(bytes)
        .map_err(|e| ConfigLoadError::Parse(format!("Invalid UTF-8: {}", e)))?;
    let toml_value: toml::Value = toml::from_str(&contents)
        .map_err(|e| ConfigLoadError::Parse(format!("TOML parse error: {}", e)))?;

    Ok((toml_to_json(toml_value), digest))
}

fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}
