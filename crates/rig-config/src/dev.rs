//! Development server settings emitted into the finished configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::merge::merge_values;

/// Dev-server block of the finished configuration. Serializes with the
/// key shape the consuming engine expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevServerConfig {
    /// Directory served as static content; the assembler points this at
    /// the output directory.
    #[serde(default)]
    pub content_base: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub history_api_fallback: bool,

    #[serde(default = "default_true")]
    pub compress: bool,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub lazy: bool,

    #[serde(default = "default_true")]
    pub hot: bool,

    #[serde(default)]
    pub overlay: OverlayConfig,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            content_base: None,
            history_api_fallback: true,
            compress: true,
            port: None,
            lazy: false,
            hot: true,
            overlay: OverlayConfig::default(),
        }
    }
}

/// In-page overlay for compile problems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    #[serde(default = "default_true")]
    pub warnings: bool,

    #[serde(default = "default_true")]
    pub errors: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            warnings: true,
            errors: true,
        }
    }
}

impl DevServerConfig {
    /// Apply a partial override layer onto these settings.
    pub fn apply_overrides(self, overrides: &Value) -> Result<Self> {
        if overrides.is_null() {
            return Ok(self);
        }
        let mut base = serde_json::to_value(&self)
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        merge_values(&mut base, overrides);
        serde_json::from_value(base).map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_the_engine_expectations() {
        let dev = DevServerConfig::default();
        assert!(dev.history_api_fallback);
        assert!(dev.compress);
        assert!(!dev.lazy);
        assert!(dev.hot);
        assert!(dev.overlay.warnings);
        assert!(dev.overlay.errors);
    }

    #[test]
    fn overrides_merge_onto_defaults() {
        let dev = DevServerConfig::default()
            .apply_overrides(&json!({ "port": 9000, "overlay": { "warnings": false } }))
            .unwrap();
        assert_eq!(dev.port, Some(9000));
        assert!(!dev.overlay.warnings);
        assert!(dev.overlay.errors);
        assert!(dev.compress);
    }

    #[test]
    fn null_override_is_a_no_op() {
        let dev = DevServerConfig::default()
            .apply_overrides(&Value::Null)
            .unwrap();
        assert_eq!(dev, DevServerConfig::default());
    }

    #[test]
    fn serializes_with_engine_keys() {
        let value = serde_json::to_value(DevServerConfig::default()).unwrap();
        assert!(value.get("historyApiFallback").is_some());
        assert!(value.get("contentBase").is_some());
    }
}
