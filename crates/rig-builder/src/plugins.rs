//! Plugin descriptors.
//!
//! The assembler never instantiates plugins; it emits named descriptors
//! with option payloads and the consuming engine constructs the real
//! instances. Registration order is the derivation order, which the
//! engine must preserve.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use serde_json::{Value, json};

use rig_config::{CopyFiles, merge_values};

use crate::packages;

/// Descriptor for one engine plugin: the implementing package (or
/// engine-builtin name) plus its constructor options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginSpec {
    pub name: String,
    pub options: Value,
}

impl PluginSpec {
    pub fn new(name: impl Into<String>, options: Value) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }

    /// Removes prior output under the output directory, honoring an
    /// exclusion list.
    pub fn clean(out_dir: &Path, exclude: &[String]) -> Self {
        Self::new(
            packages::CLEAN_PLUGIN,
            json!({
                "root": out_dir.join("**"),
                "exclude": exclude,
            }),
        )
    }

    /// Engine-builtin: name modules instead of numbering them.
    pub fn named_modules() -> Self {
        Self::new("named-modules", Value::Null)
    }

    /// Engine-builtin hot-replacement runtime.
    pub fn hot_module_replacement() -> Self {
        Self::new("hot-module-replacement", Value::Null)
    }

    /// Copy static files into the output directory.
    pub fn copy(copy: &CopyFiles) -> Self {
        Self::new(
            packages::COPY_PLUGIN,
            json!({
                "patterns": &copy.patterns,
                "ignore": &copy.ignore,
            }),
        )
    }

    /// Engine-builtin global-constant substitution.
    pub fn define(defines: &BTreeMap<String, String>) -> Self {
        Self::new("define", json!(defines))
    }

    /// Standalone minifier, parallel and cached. Name mangling stays
    /// off so literal substitutions and debugging keep working.
    pub fn minifier(source_map: bool) -> Self {
        Self::new(
            packages::UGLIFY_PLUGIN,
            json!({
                "parallel": true,
                "cache": true,
                "sourceMap": source_map,
                "uglifyOptions": { "mangle": false },
            }),
        )
    }

    /// Background type-checking against the given compiler config.
    pub fn fork_ts_checker(ts_config_file: &str) -> Self {
        Self::new(
            packages::FORK_TS_CHECKER_PLUGIN,
            json!({ "tsconfig": ts_config_file }),
        )
    }

    /// Interactive bundle-content report; user options win over the
    /// tool defaults key-by-key.
    pub fn bundle_analyzer(user_options: &Value) -> Self {
        let mut options = json!({
            "analyzerMode": "static",
            "openAnalyzer": false,
        });
        merge_values(&mut options, user_options);
        Self::new(packages::BUNDLE_ANALYZER, options)
    }

    /// Textual bundle-size report.
    pub fn bundle_size_analyzer(user_options: &Value) -> Self {
        let mut options = json!({});
        merge_values(&mut options, user_options);
        Self::new(packages::BUNDLE_SIZE_ANALYZER, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyzer_defaults_yield_to_user_options() {
        let spec = PluginSpec::bundle_analyzer(&json!({ "analyzerMode": "server" }));
        assert_eq!(spec.options["analyzerMode"], json!("server"));
        assert_eq!(spec.options["openAnalyzer"], json!(false));
    }

    #[test]
    fn minifier_keeps_mangling_off() {
        let spec = PluginSpec::minifier(true);
        assert_eq!(spec.options["uglifyOptions"]["mangle"], json!(false));
        assert_eq!(spec.options["parallel"], json!(true));
    }

    #[test]
    fn clean_targets_everything_under_the_output_directory() {
        let spec = PluginSpec::clean(Path::new("/out"), &[".gitignore".to_string()]);
        assert_eq!(spec.options["root"], json!("/out/**"));
    }
}
