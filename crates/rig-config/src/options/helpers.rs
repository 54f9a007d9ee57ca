// Helper defaults
pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_devtool() -> String {
    "cheap-module-source-map".to_string()
}
