//! The produced configuration artifact.
//!
//! These types serialize into the object the consuming engine reads:
//! entry map, output settings, resolvable extensions, transform rules,
//! plugin descriptors, dev-server settings, devtool. The assembler owns
//! one instance, mutates it through the build, and hands out a shared
//! reference once finalized.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use rig_config::{DevServerConfig, Toggle};

use crate::plugins::PluginSpec;
use crate::{Error, Result};

/// Default output filename pattern: entry name plus a per-build content
/// hash placeholder.
pub const DEFAULT_FILENAME: &str = "[name].[hash].js";

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlerConfig {
    /// Entry key to ordered module specifiers. Keys are unique;
    /// insertion order is preserved for the engine.
    pub entry: IndexMap<String, Vec<String>>,

    pub output: OutputConfig,

    pub resolve: ResolveConfig,

    pub module: ModuleConfig,

    pub plugins: Vec<PluginSpec>,

    pub dev_server: DevServerConfig,

    pub devtool: Toggle<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<std::path::PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveConfig {
    /// Ordered, de-duplicated on insert. Seeded with the plain script
    /// extension; enabled language features append their own.
    pub extensions: Vec<String>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            extensions: vec![".js".to_string()],
        }
    }
}

impl ResolveConfig {
    pub fn add_extension(&mut self, extension: &str) {
        if !self.extensions.iter().any(|e| e == extension) {
            self.extensions.push(extension.to_string());
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ModuleConfig {
    pub rules: Vec<Rule>,
}

/// One match-and-transform rule: a test pattern over file paths, an
/// optional enforcement stage and an ordered chain of transform steps.
/// The engine executes `use` entries front-to-back.
#[derive(Debug, Clone, Serialize)]
pub struct Rule {
    pub test: RulePattern,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforce: Option<EnforceStage>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    #[serde(rename = "use")]
    pub steps: Vec<LoaderEntry>,
}

impl Rule {
    pub fn new(test: RulePattern, enforce: Option<EnforceStage>) -> Self {
        Self {
            test,
            enforce,
            exclude: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Whether this rule's test pattern covers the given extension.
    pub fn claims(&self, extension: &str) -> bool {
        self.test.claims(extension)
    }
}

/// Ordering bucket relative to the default-stage rules for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnforceStage {
    Pre,
    Post,
}

/// Anchored case-insensitive extension pattern. Serializes as the
/// pattern source the engine compiles; keeps the extension list around
/// so duplicate detection does not have to re-parse it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulePattern {
    extensions: Vec<String>,
    source: String,
}

impl RulePattern {
    /// Derive the pattern from one or more file extensions.
    ///
    /// # Errors
    ///
    /// At least one extension is required.
    pub fn from_extensions(extensions: &[&str]) -> Result<Self> {
        if extensions.is_empty() {
            return Err(Error::EmptyRuleTest);
        }
        let alternation = extensions
            .iter()
            .map(|ext| escape_component(ext))
            .collect::<Vec<_>>()
            .join("|");
        Ok(Self {
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            source: format!(r"(?i)\.({alternation})$"),
        })
    }

    pub fn claims(&self, extension: &str) -> bool {
        self.extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

impl Serialize for RulePattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

/// One named transform step with its option payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoaderEntry {
    pub loader: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

fn escape_component(extension: &str) -> String {
    let mut escaped = String::with_capacity(extension.len());
    for ch in extension.chars() {
        if !ch.is_ascii_alphanumeric() {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_joins_extensions_with_an_alternation() {
        let pattern = RulePattern::from_extensions(&["ts", "tsx"]).unwrap();
        assert_eq!(pattern.source(), r"(?i)\.(ts|tsx)$");
    }

    #[test]
    fn pattern_escapes_non_alphanumeric_characters() {
        let pattern = RulePattern::from_extensions(&["d.ts"]).unwrap();
        assert_eq!(pattern.source(), r"(?i)\.(d\.ts)$");
    }

    #[test]
    fn pattern_requires_an_extension() {
        assert!(matches!(
            RulePattern::from_extensions(&[]),
            Err(Error::EmptyRuleTest)
        ));
    }

    #[test]
    fn claims_is_case_insensitive() {
        let pattern = RulePattern::from_extensions(&["PNG", "svg"]).unwrap();
        assert!(pattern.claims("png"));
        assert!(pattern.claims("SVG"));
        assert!(!pattern.claims("gif"));
    }

    #[test]
    fn pattern_serializes_as_its_source() {
        let pattern = RulePattern::from_extensions(&["scss"]).unwrap();
        let value = serde_json::to_value(&pattern).unwrap();
        assert_eq!(value, serde_json::json!(r"(?i)\.(scss)$"));
    }

    #[test]
    fn resolve_extensions_deduplicate() {
        let mut resolve = ResolveConfig::default();
        resolve.add_extension(".ts");
        resolve.add_extension(".ts");
        resolve.add_extension(".tsx");
        assert_eq!(resolve.extensions, vec![".js", ".ts", ".tsx"]);
    }
}
