//! File-based option discovery for embedding tools.
//!
//! Library callers construct [`Options`] directly; tools that wrap the
//! assembler can discover options from conventional locations instead.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::options::Options;

/// Searches for assembler options in conventional locations.
///
/// # Example
///
/// ```no_run
/// use rig_config::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new(".");
/// let options = discovery.load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find an options file in the root directory.
    ///
    /// Searches in this order:
    /// 1. TOML options: rig.toml
    /// 2. package.json (rig field)
    pub fn find(&self) -> Option<PathBuf> {
        let toml_path = self.root.join("rig.toml");
        if toml_path.exists() {
            return Some(toml_path);
        }

        let pkg_path = self.root.join("package.json");
        if pkg_path.exists() {
            if let Ok(content) = fs::read_to_string(&pkg_path) {
                if let Ok(parsed) = serde_json::from_str::<Value>(&content) {
                    if parsed.get("rig").is_some() && !parsed["rig"].is_null() {
                        return Some(pkg_path);
                    }
                }
            }
        }

        None
    }

    /// Load options from the discovered file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if no options file is found.
    pub fn load(&self) -> Result<Options> {
        let path = self.find().ok_or(ConfigError::NotFound)?;
        self.load_from(&path)
    }

    fn load_from(&self, path: &Path) -> Result<Options> {
        if path.file_name() == Some(std::ffi::OsStr::new("package.json")) {
            return self.load_from_package_json(path);
        }

        let content = fs::read_to_string(path)?;

        let toml_val: toml::Value = toml::from_str(&content)
            .map_err(|e| ConfigError::InvalidValue(format!("invalid TOML syntax: {e}")))?;

        let value = serde_json::to_value(toml_val)
            .map_err(|e| ConfigError::InvalidValue(format!("TOML to JSON conversion failed: {e}")))?;

        Options::from_value(value)
    }

    fn load_from_package_json(&self, path: &Path) -> Result<Options> {
        let content = fs::read_to_string(path)?;

        let parsed: Value = serde_json::from_str(&content)
            .map_err(|e| ConfigError::InvalidValue(format!("invalid JSON: {e}")))?;

        let rig_value = parsed.get("rig").ok_or_else(|| {
            ConfigError::InvalidValue("add a 'rig' field to your package.json".to_string())
        })?;

        if rig_value.is_null() {
            return Err(ConfigError::InvalidValue(
                "the 'rig' field cannot be null".to_string(),
            ));
        }

        Options::from_value(rig_value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn find_returns_none_when_no_options() {
        let dir = TempDir::new().unwrap();
        let discovery = ConfigDiscovery::new(dir.path());
        assert!(discovery.find().is_none());
    }

    #[test]
    fn find_discovers_toml_options() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rig.toml");
        fs::write(
            &path,
            r#"
[typescript]
ts_config_file = "tsconfig.json"
"#,
        )
        .unwrap();

        let discovery = ConfigDiscovery::new(dir.path());
        assert_eq!(discovery.find().unwrap(), path);
    }

    #[test]
    fn load_returns_not_found_when_no_options() {
        let dir = TempDir::new().unwrap();
        let discovery = ConfigDiscovery::new(dir.path());
        let result = discovery.load();
        assert!(matches!(result.unwrap_err(), ConfigError::NotFound));
    }

    #[test]
    fn load_parses_toml_options() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("rig.toml"),
            r#"
named_modules = true

[typescript]
ts_config_file = "tsconfig.json"

[env.prod]
named_modules = false
"#,
        )
        .unwrap();

        let discovery = ConfigDiscovery::new(dir.path());
        let options = discovery.load().unwrap();
        assert!(options.named_modules);
        assert!(options.typescript.is_on());
        assert!(options.env.contains_key("prod"));
    }

    #[test]
    fn load_from_package_json_field() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{
                "name": "test",
                "rig": {
                    "json": true
                }
            }"#,
        )
        .unwrap();

        let discovery = ConfigDiscovery::new(dir.path());
        let options = discovery.load().unwrap();
        assert!(options.json);
    }
}
