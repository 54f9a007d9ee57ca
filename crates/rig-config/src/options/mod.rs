//! The option model consumed by the configuration assembler.
//!
//! Every feature group is independently optional; `Toggle` captures the
//! conventional `false | { … }` shape so environment override layers can
//! switch a group off. `Options::into_effective` applies the default
//! layer and produces the concrete record the assembler derives from,
//! so downstream code never null-checks a default-enabled group.

mod assets;
mod helpers;
mod style;
mod toggle;
mod tools;
mod transform;

use std::collections::BTreeMap;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

pub use assets::{CopyFiles, CopyPattern, CopyToType, ResourceOptions, UrlLoadOptions};
pub use style::CssOptions;
pub use toggle::Toggle;
pub use tools::{CacheLoaderOptions, ToolsOptions, UglifyOptions};
pub use transform::{BabelOptions, TslintOptions, TypeScriptOptions};

use helpers::{default_devtool, default_true};

/// Babel plugin spliced in when both babel and react hot reload are on.
pub const REACT_HOT_BABEL_PLUGIN: &str = "react-hot-loader/babel";

/// Raw caller-facing options: a base layer plus per-environment
/// override layers of the same shape (kept as raw JSON values and
/// merged by [`crate::merge::merge_env`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Options {
    /// Source-map style; `false` disables, absent means the default
    /// cheap variant.
    #[serde(default)]
    pub devtool: Option<Toggle<String>>,

    #[serde(default)]
    pub output: Option<OutputOptions>,

    /// Name emitted modules instead of numbering them (debugging aid).
    #[serde(default)]
    pub named_modules: bool,

    #[serde(default)]
    pub typescript: Toggle<TypeScriptOptions>,

    #[serde(default)]
    pub babel: Toggle<BabelOptions>,

    #[serde(default)]
    pub react: Toggle<ReactOptions>,

    /// Hot module replacement; absent means enabled.
    #[serde(default)]
    pub hot_reload: Option<bool>,

    /// Value substituted for the process-environment global constant.
    #[serde(default)]
    pub node_env: Option<String>,

    #[serde(default)]
    pub tools: Toggle<ToolsOptions>,

    /// Standalone minifier plugin.
    #[serde(default)]
    pub uglify: Toggle<UglifyOptions>,

    /// Per-rule minification step.
    #[serde(default)]
    pub uglify_loader: Toggle<UglifyOptions>,

    #[serde(default)]
    pub cache_loader: Toggle<CacheLoaderOptions>,

    /// Stylesheet handling; absent means plain css handling enabled.
    #[serde(default)]
    pub css: Option<Toggle<CssOptions>>,

    /// Markup handling; absent means resource mode.
    #[serde(default)]
    pub html: Option<HtmlMode>,

    /// Raw-data (json) handling.
    #[serde(default)]
    pub json: bool,

    /// Remove prior output under the output directory before building.
    #[serde(default)]
    pub clean: Toggle<CleanOptions>,

    /// Global constant definitions, pre-serialized to literal text.
    #[serde(default)]
    pub defines: BTreeMap<String, String>,

    #[serde(default)]
    pub resources: Option<ResourceOptions>,

    /// Partial override layer applied onto the dev-server defaults.
    #[serde(default)]
    pub dev_server: Value,

    /// Environment name to partial override layer of this same shape.
    #[serde(default)]
    pub env: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputOptions {
    /// Output file name pattern; the default includes the entry name
    /// and a per-build content hash placeholder.
    #[serde(default)]
    pub filename: Option<String>,

    #[serde(default)]
    pub public_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactOptions {
    /// Wire the framework's hot-reload runtime through entries, babel
    /// and the jsx rules.
    #[serde(default = "default_true")]
    pub hot_reload: bool,
}

impl Default for ReactOptions {
    fn default() -> Self {
        Self { hot_reload: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanOptions {
    /// Paths under the output directory left in place.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Markup handling mode. The two enabled modes are mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HtmlMode {
    Off,
    #[default]
    Resource,
    Angular,
}

impl Serialize for HtmlMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            HtmlMode::Off => serializer.serialize_bool(false),
            HtmlMode::Resource => serializer.serialize_str("resource"),
            HtmlMode::Angular => serializer.serialize_str("angular"),
        }
    }
}

impl<'de> Deserialize<'de> for HtmlMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null | Value::Bool(false) => Ok(HtmlMode::Off),
            Value::String(s) if s == "resource" => Ok(HtmlMode::Resource),
            Value::String(s) if s == "angular" => Ok(HtmlMode::Angular),
            other => Err(D::Error::custom(format!(
                "expected `false`, \"resource\" or \"angular\", found {other}"
            ))),
        }
    }
}

/// The concrete option record after defaults are applied: every
/// default-enabled group is present, so derivation code reads fields
/// directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveOptions {
    pub devtool: Toggle<String>,
    pub output: OutputOptions,
    pub named_modules: bool,
    pub typescript: Toggle<TypeScriptOptions>,
    pub babel: Toggle<BabelOptions>,
    pub react: Toggle<ReactOptions>,
    pub hot_reload: bool,
    pub node_env: Option<String>,
    pub tools: Toggle<ToolsOptions>,
    pub uglify: Toggle<UglifyOptions>,
    pub uglify_loader: Toggle<UglifyOptions>,
    pub cache_loader: Toggle<CacheLoaderOptions>,
    pub css: Toggle<CssOptions>,
    pub html: HtmlMode,
    pub json: bool,
    pub clean: Toggle<CleanOptions>,
    pub defines: BTreeMap<String, String>,
    pub resources: ResourceOptions,
    pub dev_server: Value,
}

impl Options {
    /// Apply the default layer and produce the concrete record.
    ///
    /// Absent groups with a default-enabled sub-state become concrete
    /// values (devtool, output, css, html, hot reload, resources), and
    /// the hot-reload babel plugin is spliced into the babel plugin
    /// list exactly once when both sides ask for it.
    pub fn into_effective(self) -> EffectiveOptions {
        let react_hot = self
            .react
            .as_ref()
            .map(|react| react.hot_reload)
            .unwrap_or(false);

        let mut babel = self.babel;
        if react_hot {
            if let Some(babel) = babel.as_mut() {
                if !babel.plugins.iter().any(|p| p == REACT_HOT_BABEL_PLUGIN) {
                    babel.plugins.push(REACT_HOT_BABEL_PLUGIN.to_string());
                }
            }
        }

        EffectiveOptions {
            devtool: self
                .devtool
                .unwrap_or_else(|| Toggle::On(default_devtool())),
            output: self.output.unwrap_or_default(),
            named_modules: self.named_modules,
            typescript: self.typescript,
            babel,
            react: self.react,
            hot_reload: self.hot_reload.unwrap_or(true),
            node_env: self.node_env,
            tools: self.tools,
            uglify: self.uglify,
            uglify_loader: self.uglify_loader,
            cache_loader: self.cache_loader,
            css: self.css.unwrap_or(Toggle::On(CssOptions::default())),
            html: self.html.unwrap_or_default(),
            json: self.json,
            clean: self.clean,
            defines: self.defines,
            resources: self.resources.unwrap_or_default(),
            dev_server: self.dev_server,
        }
    }

    /// Create from a raw JSON value (programmatic configuration).
    pub fn from_value(value: Value) -> crate::error::Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| crate::error::ConfigError::InvalidValue(e.to_string()))
    }

    /// Convert to a raw JSON value.
    pub fn to_value(&self) -> crate::error::Result<Value> {
        serde_json::to_value(self)
            .map_err(|e| crate::error::ConfigError::InvalidValue(e.to_string()))
    }
}
