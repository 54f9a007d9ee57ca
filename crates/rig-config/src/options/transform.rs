//! Script transpilation option groups: typed transform and legacy-syntax
//! transform.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::options::toggle::Toggle;

/// TypeScript transform configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeScriptOptions {
    /// Path to the compiler configuration file, forwarded to the
    /// transform loader and the lint loader.
    pub ts_config_file: String,

    /// Run type-checking in a background checker process instead of
    /// inline in the transform loader. The transform loader is switched
    /// to transpile-only so diagnostics are not reported twice.
    #[serde(default)]
    pub use_fork_checker: bool,

    /// Lint pre-stage for typed sources.
    #[serde(default)]
    pub tslint: Toggle<TslintOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TslintOptions {
    /// Explicit lint config file; the loader discovers one when absent.
    #[serde(default)]
    pub tslint_json: Option<String>,

    /// Enable rules that need the type checker. Slow on large trees.
    #[serde(default)]
    pub type_check: bool,

    /// Report lint findings as errors instead of warnings.
    #[serde(default)]
    pub emit_errors: bool,
}

/// Legacy-syntax (babel) transform configuration.
///
/// Preset entries may be plain names or `[name, options]` tuples, so
/// they are kept as raw JSON values and forwarded to the loader as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BabelOptions {
    #[serde(default)]
    pub presets: Vec<Value>,

    #[serde(default)]
    pub plugins: Vec<String>,
}
