//! Environment-layer merging.
//!
//! Override layers are deep-merged onto the base options over raw JSON
//! values: tables merge key-by-key with the override winning on
//! conflicts, scalars replace (including `false` replacing a table to
//! disable a group), and sequences CONCATENATE base-then-override
//! instead of replacing. The sequence rule is load-bearing: preset and
//! plugin lists accumulate across layers rather than being clobbered.

use serde_json::Value;
use tracing::warn;

use crate::error::{ConfigError, Result};
use crate::options::Options;

/// The environment assumed when callers do not care; the unknown-layer
/// warning is suppressed for it.
pub const DEFAULT_ENV: &str = "dev";

/// Recursive structural merge with the sequence-concatenation rule.
pub fn merge_values(target: &mut Value, update: &Value) {
    match (target, update) {
        (Value::Object(target_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_values(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (Value::Array(target_seq), Value::Array(update_seq)) => {
            target_seq.extend(update_seq.iter().cloned());
        }
        (target_slot, _) => {
            *target_slot = update.clone();
        }
    }
}

/// Merge the named environment's override layer onto the base options.
///
/// An unknown environment name other than [`DEFAULT_ENV`] warns and
/// leaves the base untouched; a layer that merges into something the
/// option model rejects is an error.
pub fn merge_env(options: Options, env: &str) -> Result<Options> {
    let Some(layer) = options.env.get(env).cloned() else {
        if !env.is_empty() && env != DEFAULT_ENV {
            warn!(environment = %env, "environment set but not configured");
        }
        return Ok(options);
    };

    let mut base = options.to_value()?;
    merge_values(&mut base, &layer);
    serde_json::from_value(base).map_err(|e| ConfigError::InvalidEnvOverride {
        env: env.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{BabelOptions, Toggle};
    use serde_json::json;

    #[test]
    fn sequences_concatenate_base_then_override() {
        let mut base = json!({ "plugins": ["a", "b"] });
        merge_values(&mut base, &json!({ "plugins": ["c"] }));
        assert_eq!(base, json!({ "plugins": ["a", "b", "c"] }));
    }

    #[test]
    fn tables_merge_key_by_key() {
        let mut base = json!({ "css": { "scss": true, "source_maps": false } });
        merge_values(&mut base, &json!({ "css": { "source_maps": true } }));
        assert_eq!(base, json!({ "css": { "scss": true, "source_maps": true } }));
    }

    #[test]
    fn scalars_replace() {
        let mut base = json!({ "named_modules": false, "node_env": "development" });
        merge_values(&mut base, &json!({ "named_modules": true, "node_env": "production" }));
        assert_eq!(base["named_modules"], json!(true));
        assert_eq!(base["node_env"], json!("production"));
    }

    #[test]
    fn false_replaces_a_table() {
        let mut base = json!({ "clean": { "exclude": [".gitignore"] } });
        merge_values(&mut base, &json!({ "clean": false }));
        assert_eq!(base["clean"], json!(false));
    }

    #[test]
    fn env_layer_concatenates_nested_plugin_lists() {
        let options = Options::from_value(json!({
            "babel": { "presets": ["base-preset"], "plugins": ["base-plugin"] },
            "env": {
                "prod": {
                    "babel": { "plugins": ["prod-plugin"] }
                }
            }
        }))
        .unwrap();

        let merged = merge_env(options, "prod").unwrap();
        let Toggle::On(babel) = merged.babel else {
            panic!("babel disabled by merge");
        };
        assert_eq!(
            babel,
            BabelOptions {
                presets: vec![json!("base-preset")],
                plugins: vec!["base-plugin".to_string(), "prod-plugin".to_string()],
            }
        );
    }

    #[test]
    fn env_layer_can_disable_a_group() {
        let options = Options::from_value(json!({
            "typescript": { "ts_config_file": "tsconfig.json" },
            "env": { "prod": { "typescript": false } }
        }))
        .unwrap();

        let merged = merge_env(options, "prod").unwrap();
        assert!(!merged.typescript.is_on());
    }

    #[test]
    fn unknown_env_leaves_base_untouched() {
        let options = Options::from_value(json!({
            "named_modules": true,
            "env": { "prod": { "named_modules": false } }
        }))
        .unwrap();

        let merged = merge_env(options.clone(), "staging").unwrap();
        assert_eq!(merged, options);
    }

    #[test]
    fn default_env_without_layer_is_silent_and_unmerged() {
        let options = Options::default();
        let merged = merge_env(options.clone(), DEFAULT_ENV).unwrap();
        assert_eq!(merged, options);
    }
}
