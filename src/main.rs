//! Signing policy CLI
//!
//! Entry point for the `signing-policy` command-line tool.

use apk_signing_policy::config::{parse_override, DEFAULT_CONFIG_FILE};
use apk_signing_policy::{
    ArtifactDescriptor, ArtifactFacts, LoadedSigningConfig, SigningPolicyResolver,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "signing-policy")]
#[command(about = "Per-artifact APK signing decisions", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve signing directives for a set of artifacts
    Resolve {
        /// Path to signing config (default: signing.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// JSON array of artifact facts
        #[arg(long, short = 'a')]
        artifacts: PathBuf,

        /// Override a config value, e.g. schemes.force_v1=true
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,
    },

    /// Explain the signing decision for each artifact
    Explain {
        /// Path to signing config (default: signing.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// JSON array of artifact facts
        #[arg(long, short = 'a')]
        artifacts: PathBuf,

        /// Output in human-readable format instead of JSON
        #[arg(long)]
        human: bool,
    },

    /// Validate the signing configuration
    CheckConfig {
        /// Path to signing config (default: signing.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct ResolvedEntry {
    artifact: String,
    digest: String,
    directive: apk_signing_policy::ResolvedSigningDirective,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            config,
            artifacts,
            overrides,
        } => run_resolve(config, &artifacts, &overrides),
        Commands::Explain {
            config,
            artifacts,
            human,
        } => run_explain(config, &artifacts, human),
        Commands::CheckConfig { config } => run_check_config(config),
    }
}

fn run_resolve(config_path: Option<PathBuf>, artifacts_path: &Path, overrides: &[String]) {
    let loaded = load_config(config_path, overrides);
    let (descriptors, failed) = load_artifacts(artifacts_path);
    let resolver = SigningPolicyResolver::new(&loaded.config);

    let mut entries = Vec::with_capacity(descriptors.len());
    for (descriptor, directive) in descriptors.iter().zip(resolver.resolve_all(&descriptors)) {
        let digest = match directive.digest() {
            Ok(d) => d,
            Err(e) => {
                eprintln!("Error hashing directive for {}: {}", descriptor.label(), e);
                process::exit(1);
            }
        };
        entries.push(ResolvedEntry {
            artifact: descriptor.label(),
            digest,
            directive,
        });
    }

    match serde_json::to_string_pretty(&entries) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }

    if failed {
        process::exit(1);
    }
}

fn run_explain(config_path: Option<PathBuf>, artifacts_path: &Path, human: bool) {
    let loaded = load_config(config_path, &[]);
    let (descriptors, failed) = load_artifacts(artifacts_path);
    let resolver = SigningPolicyResolver::new(&loaded.config);

    let explanations: Vec<_> = descriptors.iter().map(|d| resolver.explain(d)).collect();

    if human {
        let rendered: Vec<String> = explanations.iter().map(|e| e.to_human()).collect();
        println!("{}", rendered.join("\n"));
    } else {
        match serde_json::to_string_pretty(&explanations) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    }

    if failed {
        process::exit(1);
    }
}

fn run_check_config(config_path: Option<PathBuf>) {
    let path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let loaded = match LoadedSigningConfig::from_file(&path) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };
    let config = &loaded.config;

    println!("Configuration valid: {}", path.display());
    println!();
    println!("  Signer: {}", config.signer());
    if let Some(oldest) = config.oldest_signer() {
        println!("  Oldest signer: {}", oldest);
    }
    match config.rotation_lineage() {
        Some(lineage) => {
            println!(
                "  Rotation: {} certificates, min API {}",
                lineage.len(),
                lineage.effective_min_rotation_api_version()
            );
            if SigningPolicyResolver::new(config).has_restricted_rotation() {
                println!("  Rotation is restricted: older artifacts use the oldest signer only");
            }
        }
        None => println!("  Rotation: not configured"),
    }
    let schemes = config.schemes();
    println!(
        "  Schemes: v2={} v3={} force_v1={}",
        schemes.v2_enabled, schemes.v3_enabled, schemes.force_v1
    );
    if let Some(floor) = schemes.v1_floor {
        println!("  V1 floor: {}", floor);
    }
}

fn load_config(config_path: Option<PathBuf>, overrides: &[String]) -> LoadedSigningConfig {
    let mut layers = Vec::with_capacity(overrides.len());
    for assignment in overrides {
        match parse_override(assignment) {
            Some(value) => layers.push(value),
            None => {
                eprintln!("Invalid override '{}': expected KEY=VALUE", assignment);
                process::exit(1);
            }
        }
    }

    let path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    match LoadedSigningConfig::load(Some(path.as_path()), layers) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    }
}

/// Load and validate artifact facts; invalid artifacts are reported and skipped.
fn load_artifacts(path: &Path) -> (Vec<ArtifactDescriptor>, bool) {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading artifacts {}: {}", path.display(), e);
            process::exit(1);
        }
    };
    let facts: Vec<ArtifactFacts> = match serde_json::from_str(&contents) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error parsing artifacts {}: {}", path.display(), e);
            process::exit(1);
        }
    };

    let mut failed = false;
    let mut descriptors = Vec::with_capacity(facts.len());
    for (index, fact) in facts.into_iter().enumerate() {
        let name = format!("#{} ({})", index, fact.module_name);
        match ArtifactDescriptor::from_facts(fact) {
            Ok(d) => descriptors.push(d),
            Err(e) => {
                eprintln!("Invalid artifact {}: {}", name, e);
                failed = true;
            }
        }
    }
    (descriptors, failed)
}
