//! Built-in signing defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Default scheme enablement before any file or CLI layer is applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Scheme v2 (default: on)
    pub v2: bool,

    /// Scheme v3 (default: on)
    pub v3: bool,

    /// Force v1 regardless of platform (default: off)
    pub force_v1: bool,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            v2: true,
            v3: true,
            force_v1: false,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "schemes": {
                "v2": self.v2,
                "v3": self.v3,
                "force_v1": self.force_v1
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let defaults = BuiltinDefaults::default();
        assert!(defaults.v2);
        assert!(defaults.v3);
        assert!(!defaults.force_v1);
    }

    #[test]
    fn test_to_value() {
        let value = BuiltinDefaults::default().to_value();
        assert_eq!(value["schemes"]["v2"], true);
        assert_eq!(value["schemes"]["force_v1"], false);
        assert!(value.get("signer").is_none());
    }
}
