//! Minification, bundle-analysis and transform-cache option groups.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::options::toggle::Toggle;

/// Minifier settings, used both for the standalone minifier plugin and
/// the per-rule minification step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UglifyOptions {
    /// Also transform source maps. Slow for larger projects, and
    /// incompatible with the cheap devtool variants.
    #[serde(default)]
    pub source_map: bool,
}

/// Bundle-analysis tooling. Each analyzer resolves its own package and
/// is skipped independently when that package is not installed; user
/// options merge over the tool defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolsOptions {
    #[serde(default)]
    pub bundle_analyzer: Toggle<Value>,

    #[serde(default)]
    pub bundle_size_analyzer: Toggle<Value>,
}

/// Per-extension transform-result cache switches. An extension missing
/// from the map is cached whenever the group itself is enabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheLoaderOptions {
    #[serde(flatten)]
    pub extensions: BTreeMap<String, bool>,
}

impl CacheLoaderOptions {
    pub fn enabled_for(&self, extension: &str) -> bool {
        self.extensions.get(extension).copied().unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cache_extensions_default_to_enabled() {
        let options: CacheLoaderOptions =
            serde_json::from_value(json!({ "ts": true, "scss": false })).unwrap();
        assert!(options.enabled_for("ts"));
        assert!(options.enabled_for("jsx"));
        assert!(!options.enabled_for("scss"));
    }
}
