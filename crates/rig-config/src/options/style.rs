//! Style preprocessing options.

use serde::{Deserialize, Serialize};

/// Stylesheet handling. Plain css handling is on by default; scss adds a
/// nested-preprocessing rule in front of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CssOptions {
    #[serde(default)]
    pub scss: bool,

    /// Thread source maps through the style loaders.
    #[serde(default)]
    pub source_maps: bool,
}
