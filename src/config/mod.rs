//! Signing configuration
//!
//! The registered configuration is built once per build, either directly
//! through [`RegisteredSigningConfiguration::new`] or from a layered
//! `signing.toml`:
//! 1. Built-in defaults
//! 2. Config file
//! 3. CLI overrides

mod defaults;
mod file;
mod merge;
mod registered;

pub use defaults::BuiltinDefaults;
pub use file::{
    ConfigLoadError, ConfigOrigin, ConfigSource, LoadedSigningConfig, DEFAULT_CONFIG_FILE,
};
pub use merge::{deep_merge, merge_layers, parse_override};
pub use registered::{ConfigurationError, RegisteredSigningConfiguration, SchemeFlags};
