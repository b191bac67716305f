//! Signing configuration layer merge
//!
//! Layers are merged in order, later layers winning:
//! - Objects: deep-merge by key
//! - Arrays: REPLACE (a lineage is never concatenated)
//! - Scalars: override

use serde_json::{Map, Value};

/// Deep merge `overlay` onto `base`.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }

        (Value::Array(_), overlay @ Value::Array(_)) => overlay,

        (_, overlay) => overlay,
    }
}

/// Merge layers in order (first is base, last has highest precedence)
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

/// Turn a `dotted.key=value` override into a nested JSON object.
///
/// The value is parsed as JSON when possible (`true`, `28`, `["a"]`),
/// otherwise kept as a string.
pub fn parse_override(assignment: &str) -> Option<Value> {
    let (path, raw) = assignment.split_once('=')?;
    let path = path.trim();
    if path.is_empty() || path.split('.').any(|part| part.is_empty()) {
        return None;
    }

    let raw = raw.trim();
    let leaf =
        serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    Some(path.rsplit('.').fold(leaf, |inner, key| {
        let mut map = Map::new();
        map.insert(key.to_string(), inner);
        Value::Object(map)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let base = json!({"schemes": {"v2": true}});
        let overlay = json!({"schemes": {"v2": false}});
        let result = deep_merge(base, overlay);
        assert_eq!(result["schemes"]["v2"], false);
    }

    #[test]
    fn test_object_deep_merge() {
        let base = json!({
            "schemes": {
                "v2": true,
                "v3": true
            }
        });
        let overlay = json!({
            "schemes": {
                "force_v1": true
            }
        });
        let result = deep_merge(base, overlay);

        assert_eq!(result["schemes"]["v2"], true);
        assert_eq!(result["schemes"]["v3"], true);
        assert_eq!(result["schemes"]["force_v1"], true);
    }

    #[test]
    fn test_lineage_array_replaced() {
        let base = json!({"rotation": {"lineage": ["aa", "bb", "cc"]}});
        let overlay = json!({"rotation": {"lineage": ["dd", "ee"]}});
        let result = deep_merge(base, overlay);

        let lineage = result["rotation"]["lineage"].as_array().unwrap();
        assert_eq!(lineage.len(), 2);
        assert_eq!(lineage[0], "dd");
    }

    #[test]
    fn test_null_override() {
        let base = json!({"rotation": {"min_api": 28}});
        let overlay = json!({"rotation": {"min_api": null}});
        let result = deep_merge(base, overlay);
        assert!(result["rotation"]["min_api"].is_null());
    }

    #[test]
    fn test_merge_layers_precedence() {
        let builtin = json!({"schemes": {"v2": true, "v3": true, "force_v1": false}});
        let file = json!({"schemes": {"v3": false}, "signer": {"alias": "release"}});
        let cli = json!({"schemes": {"force_v1": true}});

        let result = merge_layers(vec![builtin, file, cli]);

        assert_eq!(result["schemes"]["v2"], true);
        assert_eq!(result["schemes"]["v3"], false);
        assert_eq!(result["schemes"]["force_v1"], true);
        assert_eq!(result["signer"]["alias"], "release");
    }

    #[test]
    fn test_parse_override_bool() {
        let value = parse_override("schemes.force_v1=true").unwrap();
        assert_eq!(value, json!({"schemes": {"force_v1": true}}));
    }

    #[test]
    fn test_parse_override_number() {
        let value = parse_override("rotation.min_api = 33").unwrap();
        assert_eq!(value, json!({"rotation": {"min_api": 33}}));
    }

    #[test]
    fn test_parse_override_string_fallback() {
        let value = parse_override("signer.alias=upload-key").unwrap();
        assert_eq!(value, json!({"signer": {"alias": "upload-key"}}));
    }

    #[test]
    fn test_parse_override_rejects_malformed() {
        assert!(parse_override("no-equals-sign").is_none());
        assert!(parse_override("=true").is_none());
        assert!(parse_override("schemes..v2=true").is_none());
    }
}
