//! Static-asset handling: inlined-vs-referenced files and copy patterns.

use serde::{Deserialize, Serialize};

/// Static resource handling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceOptions {
    /// Extensions emitted as referenced files.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Extensions inlined as data URLs below a size limit.
    #[serde(default)]
    pub url_load: Option<UrlLoadOptions>,

    /// Files copied into the output directory untouched.
    #[serde(default)]
    pub copy_files: Option<CopyFiles>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlLoadOptions {
    pub extensions: Vec<String>,

    /// Inline threshold in bytes; larger files fall back to references.
    pub limit: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CopyFiles {
    pub patterns: Vec<CopyPattern>,

    /// Globs excluded from every pattern.
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// One copy instruction, forwarded verbatim to the copy plugin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyPattern {
    /// File source path or glob.
    pub from: String,

    /// Target path; defaults to the output root (file/dir sources) or
    /// the resolved glob path (glob sources).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    /// How to interpret `to` when the plugin cannot infer it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_type: Option<CopyToType>,

    /// Base path for interpreting `from`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Drop directory components and copy file names only.
    #[serde(default)]
    pub flatten: bool,

    /// Additional globs to ignore for this pattern.
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Overwrite assets already produced by earlier plugins.
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyToType {
    File,
    Dir,
    Template,
}
