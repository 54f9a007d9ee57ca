//! # rig-builder
//!
//! Fluent configuration assembly for a bundling engine.
//!
//! Callers describe intent through a small set of high-level feature
//! toggles; the builder derives a mutually consistent set of transform
//! rules, resolvable extensions and plugin descriptors, tracks the
//! external packages the enabled features depend on, and reports every
//! missing one in a single aggregate error at finalize time.
//!
//! ## Quick start
//!
//! ```no_run
//! use rig_builder::ConfigBuilder;
//! use rig_config::{Options, Toggle, TypeScriptOptions};
//!
//! # fn main() -> rig_builder::Result<()> {
//! let mut builder = ConfigBuilder::new(
//!     "build",
//!     "dev",
//!     Options {
//!         typescript: Toggle::On(TypeScriptOptions {
//!             ts_config_file: "tsconfig.json".into(),
//!             use_fork_checker: false,
//!             tslint: Toggle::Off,
//!         }),
//!         ..Options::default()
//!     },
//! )?;
//! builder.add_entry("bundle", "./src/index.ts")?;
//! builder.add_define("VERSION", &"1.0.0")?;
//! let config = builder.build()?;
//! # let _ = config;
//! # Ok(())
//! # }
//! ```
//!
//! The engine that consumes the produced [`BundlerConfig`] — pattern
//! matching, loader execution, module resolution, output emission — is
//! an external collaborator; this crate only decides *which* transforms
//! and plugins to request and in *what order*.

// Re-export the option model
pub use rig_config::{
    BabelOptions, CacheLoaderOptions, CleanOptions, ConfigDiscovery, ConfigError, CopyFiles,
    CopyPattern, CopyToType, CssOptions, DEFAULT_ENV, DevServerConfig, EffectiveOptions, HtmlMode,
    Options, OutputOptions, OverlayConfig, ReactOptions, ResourceOptions, Toggle, ToolsOptions,
    TslintOptions, TypeScriptOptions, UglifyOptions, UrlLoadOptions, merge_env, merge_values,
};

pub mod builder;
pub mod config;
pub mod manifest;
pub mod packages;
pub mod plugins;
pub mod resolver;
pub mod rules;

pub use builder::{ConfigBuilder, EntryOptions};
pub use config::{
    BundlerConfig, DEFAULT_FILENAME, EnforceStage, LoaderEntry, ModuleConfig, OutputConfig,
    ResolveConfig, Rule, RulePattern,
};
pub use plugins::PluginSpec;
pub use resolver::{
    NodeModulesResolver, PackageHandle, PackageResolver, ResolveError, StaticResolver,
};
pub use rules::{NODE_MODULES, RuleBuilder};

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
pub mod logging;

#[cfg(feature = "logging")]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

/// Error types for configuration assembly.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The finalize operation ran twice.
    #[error("build() must only be called once")]
    AlreadyBuilt,

    /// Entry keys are globally unique.
    #[error("duplicate entry with key {0}")]
    DuplicateEntry(String),

    /// A rule registration received zero file extensions.
    #[error("a rule requires at least one extension")]
    EmptyRuleTest,

    /// The typed-transform step was requested without the feature.
    #[error("typed transform requested but the typescript feature is not configured")]
    TypescriptNotConfigured,

    /// Markup handling configured but the extension is already claimed.
    #[error("html handling specified but a rule for html files is already registered")]
    HtmlRuleCollision,

    /// A package resolved but failed while loading.
    #[error("failed to load package {package}: {message}")]
    PackageLoad { package: String, message: String },

    /// Deferred aggregate of every optional package that failed to
    /// resolve during derivation.
    #[error("missing packages: {}", missing.join(", "))]
    MissingPackages {
        missing: Vec<String>,
        declared: Vec<String>,
    },

    /// Error from the option model.
    #[error("configuration error: {0}")]
    Config(#[from] rig_config::ConfigError),

    /// Serialization failure in an option payload.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for configuration assembly.
pub type Result<T> = std::result::Result<T, Error>;

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::AlreadyBuilt => "ALREADY_BUILT",
            Error::DuplicateEntry(_) => "DUPLICATE_ENTRY",
            Error::EmptyRuleTest => "EMPTY_RULE_TEST",
            Error::TypescriptNotConfigured => "TYPESCRIPT_NOT_CONFIGURED",
            Error::HtmlRuleCollision => "HTML_RULE_COLLISION",
            Error::PackageLoad { .. } => "PACKAGE_LOAD",
            Error::MissingPackages { .. } => "MISSING_PACKAGES",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Json(_) => "SERIALIZATION_ERROR",
            Error::Io(_) => "IO_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::MissingPackages { missing, declared } => {
                let list = missing.join(" ");
                Some(Box::new(format!(
                    "Install the missing development packages:\n  npm install --save-dev {list}\n  yarn add --dev {list}\nAll packages declared by the enabled features: {}",
                    declared.join(", ")
                )))
            }
            Error::DuplicateEntry(key) => Some(Box::new(format!(
                "Entry keys must be unique; '{key}' is already registered."
            ))),
            Error::TypescriptNotConfigured => Some(Box::new(
                "Enable the typescript option group before requesting the typed transform step."
                    .to_string(),
            )),
            Error::HtmlRuleCollision => Some(Box::new(
                "Either drop the html option or remove the custom rule claiming the html extension."
                    .to_string(),
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_packages_help_carries_both_install_commands() {
        let err = Error::MissingPackages {
            missing: vec!["clean-webpack-plugin".to_string()],
            declared: vec!["clean-webpack-plugin".to_string(), "ts-loader".to_string()],
        };
        let help = miette::Diagnostic::help(&err).unwrap().to_string();
        assert!(help.contains("npm install --save-dev clean-webpack-plugin"));
        assert!(help.contains("yarn add --dev clean-webpack-plugin"));
        assert!(help.contains("ts-loader"));
    }

    #[test]
    fn error_codes_are_stable() {
        let code = miette::Diagnostic::code(&Error::AlreadyBuilt)
            .unwrap()
            .to_string();
        assert_eq!(code, "ALREADY_BUILT");
    }
}
