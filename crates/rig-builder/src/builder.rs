//! The one-shot configuration assembler.
//!
//! Callers construct a [`ConfigBuilder`] with high-level options,
//! optionally register entries, defines and custom rules, then finalize
//! once. Finalization derives every feature-driven rule, extension and
//! plugin in a fixed order, lets unresolved optional packages degrade
//! their own feature, and raises one aggregate error at the end when
//! anything explicitly requested could not be satisfied.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use tracing::warn;

use rig_config::{
    DevServerConfig, EffectiveOptions, HtmlMode, Options, Toggle, TypeScriptOptions, merge_env,
};

use crate::config::{BundlerConfig, DEFAULT_FILENAME, EnforceStage, Rule, RulePattern};
use crate::manifest;
use crate::packages;
use crate::plugins::PluginSpec;
use crate::resolver::{NodeModulesResolver, PackageHandle, PackageResolver, ResolveError};
use crate::rules::{NODE_MODULES, RuleBuilder};
use crate::{Error, Result};

/// Per-entry switches for the specifiers spliced in front of an entry
/// point.
#[derive(Debug, Clone, Copy)]
pub struct EntryOptions {
    /// Allow the framework hot-reload patch in front of this entry.
    pub react: bool,

    /// Splice the polyfill bundle in front of this entry (babel only).
    pub babel_polyfill: bool,
}

impl Default for EntryOptions {
    fn default() -> Self {
        Self {
            react: true,
            babel_polyfill: false,
        }
    }
}

/// Assembles a [`BundlerConfig`] from high-level feature toggles.
///
/// The builder owns the configuration-in-progress, the merged effective
/// options, the declared/missing package registries and the one-shot
/// build lifecycle. Construction merges the selected environment's
/// override layer onto the base options and normalizes defaults;
/// [`ConfigBuilder::build`] runs the derivation exactly once.
///
/// # Example
///
/// ```no_run
/// use rig_builder::ConfigBuilder;
/// use rig_config::{Options, Toggle, TypeScriptOptions};
///
/// # fn main() -> rig_builder::Result<()> {
/// let mut builder = ConfigBuilder::new(
///     "build",
///     "dev",
///     Options {
///         typescript: Toggle::On(TypeScriptOptions {
///             ts_config_file: "tsconfig.json".into(),
///             use_fork_checker: false,
///             tslint: Toggle::Off,
///         }),
///         ..Options::default()
///     },
/// )?;
/// builder.add_entry("bundle", "./src/index.ts")?;
/// let config = builder.build()?;
/// println!("{}", serde_json::to_string_pretty(config).unwrap());
/// # Ok(())
/// # }
/// ```
pub struct ConfigBuilder {
    out_dir: PathBuf,
    env: String,
    options: EffectiveOptions,
    config: BundlerConfig,
    built: bool,
    declared: BTreeSet<String>,
    missing: BTreeSet<String>,
    resolver: Arc<dyn PackageResolver>,
    manifest_hash: Option<String>,
}

impl ConfigBuilder {
    /// Create a builder rooted in the current directory, resolving
    /// packages against its `node_modules` tree.
    pub fn new(
        out_dir: impl Into<PathBuf>,
        env: impl Into<String>,
        options: Options,
    ) -> Result<Self> {
        let root = std::env::current_dir()?;
        let resolver = Arc::new(NodeModulesResolver::new(&root));
        Self::with_runtime(out_dir, env, options, resolver, &root)
    }

    /// Create a builder with an explicit project root and package
    /// resolver, for embedders and tests.
    pub fn with_runtime(
        out_dir: impl Into<PathBuf>,
        env: impl Into<String>,
        options: Options,
        resolver: Arc<dyn PackageResolver>,
        project_root: &Path,
    ) -> Result<Self> {
        let env = env.into();
        let options = merge_env(options, &env)?.into_effective();
        let manifest_hash = manifest::manifest_hash(project_root);

        Ok(Self {
            out_dir: out_dir.into(),
            env,
            options,
            config: BundlerConfig::default(),
            built: false,
            declared: BTreeSet::new(),
            missing: BTreeSet::new(),
            resolver,
            manifest_hash,
        })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn env(&self) -> &str {
        &self.env
    }

    /// The merged, normalized options the derivation runs against.
    pub fn options(&self) -> &EffectiveOptions {
        &self.options
    }

    /// Every package name declared by an enabled feature so far,
    /// sorted and deduplicated.
    pub fn required_packages(&self) -> Vec<String> {
        self.declared.iter().cloned().collect()
    }

    /// The declared packages that failed to resolve, sorted and
    /// deduplicated. Always a subset of [`Self::required_packages`].
    pub fn missing_packages(&self) -> Vec<String> {
        self.missing.iter().cloned().collect()
    }

    /// Upsert a global constant. The value is serialized to its literal
    /// representation so the engine substitutes an expression, not a
    /// bare reference.
    pub fn add_define(&mut self, name: impl Into<String>, value: &impl Serialize) -> Result<()> {
        let literal = serde_json::to_string(value)?;
        self.options.defines.insert(name.into(), literal);
        Ok(())
    }

    /// Declare a package and try to resolve it.
    ///
    /// "Not installed" is recorded in the missing set and returns
    /// `Ok(None)` so the whole missing-package report can be aggregated
    /// at finalize time; any other load failure is fatal immediately.
    pub fn require_package(&mut self, name: &str) -> Result<Option<PackageHandle>> {
        self.declared.insert(name.to_string());
        match self.resolver.resolve(name) {
            Ok(handle) => Ok(Some(handle)),
            Err(ResolveError::NotFound(_)) => {
                self.missing.insert(name.to_string());
                Ok(None)
            }
            Err(ResolveError::Failed { package, message }) => {
                Err(Error::PackageLoad { package, message })
            }
        }
    }

    /// Append a plugin descriptor.
    pub fn add_plugin(&mut self, plugin: PluginSpec) {
        self.config.plugins.push(plugin);
    }

    /// Register a rule for one or more file extensions, skipping
    /// duplicates of unenforced rules.
    pub fn add_rule(
        &mut self,
        extensions: &[&str],
        enforce: Option<EnforceStage>,
    ) -> Result<RuleBuilder<'_>> {
        self.add_rule_with(extensions, enforce, true)
    }

    /// Register a rule, controlling duplicate detection.
    ///
    /// Enforced (pre/post) rules never collide with the default stage
    /// and always insert. An unenforced rule whose extension is already
    /// claimed is skipped with a warning when `check_if_exists` is set;
    /// the returned builder then mutates a detached rule so call chains
    /// keep working.
    pub fn add_rule_with(
        &mut self,
        extensions: &[&str],
        enforce: Option<EnforceStage>,
        check_if_exists: bool,
    ) -> Result<RuleBuilder<'_>> {
        let pattern = RulePattern::from_extensions(extensions)?;
        let rule = Rule::new(pattern, enforce);

        if enforce.is_none() && check_if_exists {
            if let Some(claimed) = extensions.iter().find(|ext| self.claims_extension(ext)) {
                warn!(extension = %claimed, "rule already registered - skipping");
                return Ok(RuleBuilder::detached(
                    rule,
                    &self.options,
                    &self.env,
                    self.manifest_hash.as_deref(),
                ));
            }
        }

        let rules = &mut self.config.module.rules;
        rules.push(rule);
        let slot = rules.last_mut().expect("rule was just pushed");
        Ok(RuleBuilder::installed(
            slot,
            &self.options,
            &self.env,
            self.manifest_hash.as_deref(),
        ))
    }

    /// Register an entry point with a single module specifier.
    pub fn add_entry(&mut self, key: impl Into<String>, specifier: impl Into<String>) -> Result<()> {
        self.add_entry_with(key, vec![specifier.into()], EntryOptions::default())
    }

    /// Register an entry point with explicit specifiers and switches.
    ///
    /// Entry keys are globally unique; re-registering one is an error
    /// and leaves the first registration intact.
    pub fn add_entry_with(
        &mut self,
        key: impl Into<String>,
        specifiers: Vec<String>,
        entry: EntryOptions,
    ) -> Result<()> {
        let key = key.into();
        if self.config.entry.contains_key(&key) {
            return Err(Error::DuplicateEntry(key));
        }

        let mut files = specifiers;
        let react_hot = self
            .options
            .react
            .as_ref()
            .map(|react| react.hot_reload)
            .unwrap_or(false);
        if entry.react && self.options.hot_reload && react_hot {
            files.insert(0, "react-hot-loader/patch".to_string());
        }
        if entry.babel_polyfill && self.options.babel.is_on() {
            files.insert(0, "babel-polyfill".to_string());
        }

        self.config.entry.insert(key, files);
        Ok(())
    }

    /// Finalize the configuration. Must be called exactly once.
    ///
    /// Later steps read state written by earlier ones, so the order
    /// below is normative. Missing optional packages never fail a step;
    /// they skip their plugin or rule and surface together at the end.
    pub fn build(&mut self) -> Result<&BundlerConfig> {
        if self.built {
            return Err(Error::AlreadyBuilt);
        }
        self.built = true;

        let opts = self.options.clone();

        // 1. Dev-server overrides onto the defaults.
        self.config.dev_server = DevServerConfig::default().apply_overrides(&opts.dev_server)?;

        // 2. Output cleanup.
        if let Toggle::On(clean) = &opts.clean {
            if self.require_package(packages::CLEAN_PLUGIN)?.is_some() {
                let spec = PluginSpec::clean(&self.out_dir, &clean.exclude);
                self.add_plugin(spec);
            }
        }

        // 3. Named module identifiers (engine builtin, no package).
        if opts.named_modules {
            self.add_plugin(PluginSpec::named_modules());
        }

        // 4. Hot replacement.
        if opts.hot_reload {
            self.config.dev_server.hot = true;
            self.add_plugin(PluginSpec::hot_module_replacement());
        }

        // 5. Static file copying.
        if let Some(copy) = &opts.resources.copy_files {
            if self.require_package(packages::COPY_PLUGIN)?.is_some() {
                self.add_plugin(PluginSpec::copy(copy));
            }
        }

        // 6. Bundle analysis tooling; each analyzer degrades on its own.
        if let Toggle::On(tools) = &opts.tools {
            if let Toggle::On(user) = &tools.bundle_analyzer {
                if self.require_package(packages::BUNDLE_ANALYZER)?.is_some() {
                    self.add_plugin(PluginSpec::bundle_analyzer(user));
                }
            }
            if let Toggle::On(user) = &tools.bundle_size_analyzer {
                if self
                    .require_package(packages::BUNDLE_SIZE_ANALYZER)?
                    .is_some()
                {
                    self.add_plugin(PluginSpec::bundle_size_analyzer(user));
                }
            }
        }

        // 7. Standalone minifier.
        if let Toggle::On(uglify) = &opts.uglify {
            if self.require_package(packages::UGLIFY_PLUGIN)?.is_some() {
                self.add_plugin(PluginSpec::minifier(uglify.source_map));
            }
        }

        // 8. Per-rule step packages; the steps themselves attach during
        // rule derivation.
        if opts.cache_loader.is_on() {
            self.require_package(packages::CACHE_LOADER)?;
        }
        if opts.uglify_loader.is_on() {
            self.require_package(packages::UGLIFY_LOADER)?;
        }

        // 9. Global constants.
        if let Some(node_env) = &opts.node_env {
            self.add_define("process.env.NODE_ENV", node_env)?;
        }
        self.add_define("WEBPACK_HOT", &opts.hot_reload)?;
        let defines = self.options.defines.clone();
        self.add_plugin(PluginSpec::define(&defines));

        // 10. Devtool, dev-server content base, output settings.
        self.config.devtool = opts.devtool.clone();
        self.config.dev_server.content_base = Some(self.out_dir.clone());
        self.config.output.path = Some(self.out_dir.clone());
        self.config.output.filename = Some(
            opts.output
                .filename
                .clone()
                .unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
        );
        self.config.output.public_path = opts.output.public_path.clone();

        // 11. Feature-derived rules and extensions, fixed order.
        self.derive_babel(&opts)?;
        self.derive_typescript(&opts)?;
        self.derive_react(&opts)?;
        self.derive_css(&opts)?;
        self.derive_html(&opts)?;
        self.derive_json(&opts)?;
        self.derive_url_resources(&opts)?;
        self.derive_file_resources(&opts)?;

        // 12. Unresolved packages become fatal here, in one report.
        if !self.missing.is_empty() {
            return Err(Error::MissingPackages {
                missing: self.missing.iter().cloned().collect(),
                declared: self.declared.iter().cloned().collect(),
            });
        }

        // 13.
        Ok(&self.config)
    }

    /// The finished configuration, building lazily on first access.
    ///
    /// Calling this after an explicit [`Self::build`] does not re-run
    /// the build; calling [`Self::build`] after this fails, since the
    /// build already ran.
    pub fn config(&mut self) -> Result<&BundlerConfig> {
        if self.built {
            return Ok(&self.config);
        }
        self.build()
    }

    fn claims_extension(&self, extension: &str) -> bool {
        self.config
            .module
            .rules
            .iter()
            .any(|rule| rule.enforce.is_none() && rule.claims(extension))
    }

    fn derive_babel(&mut self, opts: &EffectiveOptions) -> Result<()> {
        if !opts.babel.is_on() {
            return Ok(());
        }
        self.require_package(packages::BABEL_LOADER)?;
        self.require_package(packages::BABEL_CORE)?;
        self.require_package(packages::BABEL_POLYFILL)?;
        self.require_package(packages::BABEL_PRESET_ENV)?;
        if opts.react.is_on() {
            self.require_package(packages::BABEL_PRESET_REACT)?;
        }

        let mut rule = self.add_rule(&["js"], None)?;
        rule.exclude(NODE_MODULES);
        rule.add_cache_loader(Some("js"));
        rule.add_uglify_loader();
        rule.add_babel_loader();
        Ok(())
    }

    fn derive_typescript(&mut self, opts: &EffectiveOptions) -> Result<()> {
        let Toggle::On(ts) = &opts.typescript else {
            return Ok(());
        };
        self.config.resolve.add_extension(".ts");
        self.require_package(packages::TYPESCRIPT)?;
        self.require_package(packages::TS_LOADER)?;
        if ts.use_fork_checker
            && self
                .require_package(packages::FORK_TS_CHECKER_PLUGIN)?
                .is_some()
        {
            self.add_plugin(PluginSpec::fork_ts_checker(&ts.ts_config_file));
        }

        {
            let mut rule = self.add_rule(&["ts"], None)?;
            rule.exclude(NODE_MODULES);
            rule.add_cache_loader(Some("ts"));
            rule.add_uglify_loader();
            rule.add_babel_loader();
            rule.add_ts_loader()?;
        }

        if ts.tslint.is_on() {
            self.require_package(packages::TSLINT)?;
            self.require_package(packages::TSLINT_LOADER)?;
            let lint_options = tslint_loader_options(ts);
            let mut rule = self.add_rule(&["ts"], Some(EnforceStage::Pre))?;
            rule.add_loader(packages::TSLINT_LOADER, Some(lint_options));
        }
        Ok(())
    }

    fn derive_react(&mut self, opts: &EffectiveOptions) -> Result<()> {
        let Toggle::On(react) = &opts.react else {
            return Ok(());
        };
        self.require_package(packages::REACT)?;
        self.require_package(packages::REACT_DOM)?;
        self.config.resolve.add_extension(".jsx");
        if react.hot_reload {
            self.require_package(packages::REACT_HOT_LOADER)?;
            if opts.typescript.is_on() {
                self.require_package(packages::TYPES_REACT_HOT_LOADER)?;
            }
        }

        {
            let mut rule = self.add_rule(&["jsx"], None)?;
            rule.add_cache_loader(Some("jsx"));
            rule.add_uglify_loader();
            rule.add_babel_loader();
            rule.add_react_hot_loader();
        }

        if let Toggle::On(ts) = &opts.typescript {
            self.require_package(packages::TYPES_REACT)?;
            self.require_package(packages::TYPES_REACT_DOM)?;
            self.config.resolve.add_extension(".tsx");
            {
                let mut rule = self.add_rule(&["tsx"], None)?;
                rule.exclude(NODE_MODULES);
                rule.add_cache_loader(Some("tsx"));
                rule.add_uglify_loader();
                rule.add_babel_loader();
                rule.add_react_hot_loader();
                rule.add_ts_loader()?;
            }
            if ts.tslint.is_on() {
                let lint_options = tslint_loader_options(ts);
                let mut rule = self.add_rule(&["tsx"], Some(EnforceStage::Pre))?;
                rule.add_loader(packages::TSLINT_LOADER, Some(lint_options));
            }
        }
        Ok(())
    }

    fn derive_css(&mut self, opts: &EffectiveOptions) -> Result<()> {
        let Toggle::On(css) = &opts.css else {
            return Ok(());
        };
        self.require_package(packages::CSS_LOADER)?;
        self.require_package(packages::STYLE_LOADER)?;
        {
            let style_options = json!({ "sourceMap": css.source_maps });
            let mut rule = self.add_rule(&["css"], None)?;
            rule.add_loader(packages::STYLE_LOADER, Some(style_options));
            rule.add_loader(packages::CSS_LOADER, None);
        }
        if css.scss {
            self.require_package(packages::SASS_LOADER)?;
            let source_map = json!({ "sourceMap": css.source_maps });
            let mut rule = self.add_rule(&["scss"], None)?;
            rule.add_cache_loader(Some("scss"));
            rule.add_loader(packages::STYLE_LOADER, Some(source_map.clone()));
            rule.add_loader(packages::CSS_LOADER, Some(source_map));
            rule.add_loader(packages::SASS_LOADER, None);
        }
        Ok(())
    }

    fn derive_html(&mut self, opts: &EffectiveOptions) -> Result<()> {
        if opts.html == HtmlMode::Off {
            return Ok(());
        }
        self.require_package(packages::HTML_LOADER)?;
        if self.claims_extension("html") {
            return Err(Error::HtmlRuleCollision);
        }
        match opts.html {
            HtmlMode::Resource => {
                let mut rule = self.add_rule_with(&["html"], None, false)?;
                rule.add_loader(packages::HTML_LOADER, None);
            }
            HtmlMode::Angular => {
                self.require_package(packages::NGTEMPLATE_LOADER)?;
                let mut rule = self.add_rule_with(&["html"], None, false)?;
                rule.add_loader(packages::HOT_ACCEPT_LOADER, None);
                rule.add_loader(packages::NGTEMPLATE_LOADER, None);
                rule.add_loader(packages::HTML_LOADER, None);
            }
            HtmlMode::Off => {}
        }
        Ok(())
    }

    fn derive_json(&mut self, opts: &EffectiveOptions) -> Result<()> {
        if !opts.json {
            return Ok(());
        }
        self.require_package(packages::JSON_LOADER)?;
        let mut rule = self.add_rule(&["json"], None)?;
        rule.add_loader(packages::JSON_LOADER, None);
        Ok(())
    }

    fn derive_url_resources(&mut self, opts: &EffectiveOptions) -> Result<()> {
        let Some(url) = &opts.resources.url_load else {
            return Ok(());
        };
        self.require_package(packages::URL_LOADER)?;
        let unmatched: Vec<&str> = url
            .extensions
            .iter()
            .filter(|ext| !self.claims_extension(ext))
            .map(String::as_str)
            .collect();
        if unmatched.is_empty() {
            return Ok(());
        }
        let options = json!({
            "limit": url.limit,
            "name": "[path][name].[hash].[ext]",
        });
        let mut rule = self.add_rule_with(&unmatched, None, false)?;
        rule.add_loader(packages::URL_LOADER, Some(options));
        Ok(())
    }

    fn derive_file_resources(&mut self, opts: &EffectiveOptions) -> Result<()> {
        if opts.resources.extensions.is_empty() {
            return Ok(());
        }
        self.require_package(packages::FILE_LOADER)?;
        let unmatched: Vec<&str> = opts
            .resources
            .extensions
            .iter()
            .filter(|ext| !self.claims_extension(ext))
            .map(String::as_str)
            .collect();
        if unmatched.is_empty() {
            return Ok(());
        }
        let options = json!({ "name": "[path][name].[hash].[ext]" });
        let mut rule = self.add_rule_with(&unmatched, None, false)?;
        rule.add_loader(packages::FILE_LOADER, Some(options));
        Ok(())
    }
}

fn tslint_loader_options(ts: &TypeScriptOptions) -> Value {
    let lint = ts.tslint.as_ref().cloned().unwrap_or_default();
    json!({
        "tsConfigFile": &ts.ts_config_file,
        "tslintJson": &lint.tslint_json,
        "typeCheck": lint.type_check,
        "emitErrors": lint.emit_errors,
    })
}
