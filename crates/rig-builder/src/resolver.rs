//! Optional-package resolution.
//!
//! Features name the npm packages they need; whether those packages are
//! actually installed is probed through this seam. "Not installed" must
//! stay distinguishable from "installed but broken": the former is
//! collected and reported once in aggregate, the latter aborts the
//! build immediately.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// The package is simply not installed.
    #[error("package not installed: {0}")]
    NotFound(String),

    /// The package is present but could not be loaded.
    #[error("failed to load package {package}: {message}")]
    Failed { package: String, message: String },
}

/// Handle to a successfully located package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageHandle {
    pub name: String,
    pub version: Option<String>,
}

/// Capability to locate installed packages by name.
pub trait PackageResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Result<PackageHandle, ResolveError>;
}

/// Resolves packages against a `node_modules` tree on disk.
///
/// A package counts as installed when `node_modules/<name>/package.json`
/// exists under the project root; scoped names keep their separator. A
/// manifest that exists but cannot be read or parsed is a load failure,
/// not a missing package.
pub struct NodeModulesResolver {
    root: PathBuf,
}

impl NodeModulesResolver {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl PackageResolver for NodeModulesResolver {
    fn resolve(&self, name: &str) -> Result<PackageHandle, ResolveError> {
        let manifest = self.root.join("node_modules").join(name).join("package.json");
        if !manifest.exists() {
            return Err(ResolveError::NotFound(name.to_string()));
        }

        let content = fs::read_to_string(&manifest).map_err(|e| ResolveError::Failed {
            package: name.to_string(),
            message: e.to_string(),
        })?;
        let parsed: Value = serde_json::from_str(&content).map_err(|e| ResolveError::Failed {
            package: name.to_string(),
            message: format!("invalid package manifest: {e}"),
        })?;

        Ok(PackageHandle {
            name: name.to_string(),
            version: parsed
                .get("version")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

/// In-memory resolver for tests and embedders with their own package
/// inventory.
#[derive(Debug, Default)]
pub struct StaticResolver {
    available: BTreeSet<String>,
    broken: BTreeSet<String>,
}

impl StaticResolver {
    pub fn new<I, S>(available: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            available: available.into_iter().map(Into::into).collect(),
            broken: BTreeSet::new(),
        }
    }

    /// Mark a package as present but failing to load.
    pub fn with_broken(mut self, name: impl Into<String>) -> Self {
        self.broken.insert(name.into());
        self
    }
}

impl PackageResolver for StaticResolver {
    fn resolve(&self, name: &str) -> Result<PackageHandle, ResolveError> {
        if self.broken.contains(name) {
            return Err(ResolveError::Failed {
                package: name.to_string(),
                message: "package initialization failed".to_string(),
            });
        }
        if self.available.contains(name) {
            return Ok(PackageHandle {
                name: name.to_string(),
                version: None,
            });
        }
        Err(ResolveError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn install(root: &Path, name: &str, manifest: &str) {
        let dir = root.join("node_modules").join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("package.json"), manifest).unwrap();
    }

    #[test]
    fn missing_package_is_not_found() {
        let dir = TempDir::new().unwrap();
        let resolver = NodeModulesResolver::new(dir.path());
        assert!(matches!(
            resolver.resolve("ts-loader"),
            Err(ResolveError::NotFound(name)) if name == "ts-loader"
        ));
    }

    #[test]
    fn installed_package_resolves_with_version() {
        let dir = TempDir::new().unwrap();
        install(dir.path(), "ts-loader", r#"{"name":"ts-loader","version":"9.5.1"}"#);

        let resolver = NodeModulesResolver::new(dir.path());
        let handle = resolver.resolve("ts-loader").unwrap();
        assert_eq!(handle.version.as_deref(), Some("9.5.1"));
    }

    #[test]
    fn scoped_names_resolve() {
        let dir = TempDir::new().unwrap();
        install(dir.path(), "@babel/core", r#"{"name":"@babel/core"}"#);

        let resolver = NodeModulesResolver::new(dir.path());
        assert!(resolver.resolve("@babel/core").is_ok());
    }

    #[test]
    fn corrupt_manifest_is_a_load_failure() {
        let dir = TempDir::new().unwrap();
        install(dir.path(), "css-loader", "not json");

        let resolver = NodeModulesResolver::new(dir.path());
        assert!(matches!(
            resolver.resolve("css-loader"),
            Err(ResolveError::Failed { package, .. }) if package == "css-loader"
        ));
    }

    #[test]
    fn static_resolver_distinguishes_broken_from_missing() {
        let resolver = StaticResolver::new(["a"]).with_broken("b");
        assert!(resolver.resolve("a").is_ok());
        assert!(matches!(resolver.resolve("b"), Err(ResolveError::Failed { .. })));
        assert!(matches!(resolver.resolve("c"), Err(ResolveError::NotFound(_))));
    }
}
