pub mod dev;
pub mod discovery;
pub mod error;
pub mod merge;
pub mod options;

// Re-export main types
pub use dev::*;
pub use error::*;
pub use options::*;

// Re-export discovery and the merge primitives
pub use discovery::ConfigDiscovery;
pub use merge::{DEFAULT_ENV, merge_env, merge_values};
