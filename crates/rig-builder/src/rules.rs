//! Per-rule transform-step assembly.
//!
//! A `RuleBuilder` accumulates the ordered step chain for one rule.
//! Steps are PREPENDED: the most recently attached step runs first,
//! because the engine executes `use` lists front-to-back and derivation
//! wraps each rule innermost-to-outermost. The feature-specific
//! mutators are no-ops when their feature is disabled, so derivation
//! code calls them unconditionally.

use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::{Value, json};
use tracing::error;

use rig_config::{EffectiveOptions, Toggle};

use crate::config::Rule;
use crate::packages;
use crate::{Error, Result};

/// Exclusion applied to every transpilation rule.
pub const NODE_MODULES: &str = "node_modules";

// Process-wide, set once, never reset at runtime: one missing-manifest
// warning per process, not one per rule registration.
static CACHE_KEY_WARNED: AtomicBool = AtomicBool::new(false);

/// Returns true when this call is the first to report the missing
/// cache-key source in this process.
fn note_cache_key_missing() -> bool {
    !CACHE_KEY_WARNED.swap(true, Ordering::SeqCst)
}

enum RuleSlot<'a> {
    /// The rule lives in the configuration under construction.
    Installed(&'a mut Rule),
    /// Duplicate registration was skipped; mutations land in a
    /// throwaway rule so callers can keep chaining.
    Detached(Rule),
}

pub struct RuleBuilder<'a> {
    slot: RuleSlot<'a>,
    options: &'a EffectiveOptions,
    env: &'a str,
    manifest_hash: Option<&'a str>,
}

impl<'a> RuleBuilder<'a> {
    pub(crate) fn installed(
        rule: &'a mut Rule,
        options: &'a EffectiveOptions,
        env: &'a str,
        manifest_hash: Option<&'a str>,
    ) -> Self {
        Self {
            slot: RuleSlot::Installed(rule),
            options,
            env,
            manifest_hash,
        }
    }

    pub(crate) fn detached(
        rule: Rule,
        options: &'a EffectiveOptions,
        env: &'a str,
        manifest_hash: Option<&'a str>,
    ) -> Self {
        Self {
            slot: RuleSlot::Detached(rule),
            options,
            env,
            manifest_hash,
        }
    }

    /// Whether the rule was actually inserted into the configuration.
    pub fn is_installed(&self) -> bool {
        matches!(self.slot, RuleSlot::Installed(_))
    }

    fn rule_mut(&mut self) -> &mut Rule {
        match &mut self.slot {
            RuleSlot::Installed(rule) => rule,
            RuleSlot::Detached(rule) => rule,
        }
    }

    /// Append a path fragment to the exclusion list.
    pub fn exclude(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.rule_mut().exclude.push(pattern.into());
        self
    }

    /// Prepend a transform step; the newest step runs first.
    pub fn add_loader(&mut self, loader: impl Into<String>, options: Option<Value>) -> &mut Self {
        self.rule_mut().steps.insert(
            0,
            crate::config::LoaderEntry {
                loader: loader.into(),
                options,
            },
        );
        self
    }

    /// Prepend the transform-result cache step, keyed by the manifest
    /// hash and environment so entries invalidate when either changes.
    ///
    /// No-op when the cache feature is off or disabled for the given
    /// extension. Returns `None` when no manifest hash is available:
    /// the step cannot be keyed, the failure is reported once per
    /// process, and the chain breaks.
    pub fn add_cache_loader(&mut self, extension: Option<&str>) -> Option<&mut Self> {
        let opts = self.options;
        let Toggle::On(cache) = &opts.cache_loader else {
            return Some(self);
        };
        if let Some(ext) = extension {
            if !cache.enabled_for(ext) {
                return Some(self);
            }
        }
        let Some(hash) = self.manifest_hash else {
            if note_cache_key_missing() {
                error!(
                    "transform cache enabled but the project manifest is unavailable; cache steps are skipped"
                );
            }
            return None;
        };
        let identifier = format!("{hash}-{}", self.env);
        self.add_loader(
            packages::CACHE_LOADER,
            Some(json!({
                "cacheDirectory": "node_modules/.cache/cache-loader",
                "cacheIdentifier": identifier,
            })),
        );
        Some(self)
    }

    /// Prepend the typed-transform step.
    ///
    /// # Errors
    ///
    /// Calling this without the static-typing feature configured is a
    /// programming error in the derivation, not a degradable state.
    pub fn add_ts_loader(&mut self) -> Result<&mut Self> {
        let opts = self.options;
        let Toggle::On(ts) = &opts.typescript else {
            return Err(Error::TypescriptNotConfigured);
        };
        // Inline checking is redundant once the background checker runs.
        let options = json!({
            "transpileOnly": ts.use_fork_checker,
            "configFile": &ts.ts_config_file,
        });
        self.add_loader(packages::TS_LOADER, Some(options));
        Ok(self)
    }

    /// Prepend the framework hot-reload step when hot reload is wired
    /// through the loader chain rather than through babel.
    pub fn add_react_hot_loader(&mut self) -> &mut Self {
        let opts = self.options;
        let react_hot = opts.react.as_ref().map(|r| r.hot_reload).unwrap_or(false);
        if react_hot && !opts.babel.is_on() {
            self.add_loader("react-hot-loader/webpack", None);
        }
        self
    }

    /// Prepend the legacy-syntax transform step.
    pub fn add_babel_loader(&mut self) -> &mut Self {
        let opts = self.options;
        let Toggle::On(babel) = &opts.babel else {
            return self;
        };
        let options = json!({
            // Directory-based output caching is a loader feature, not a
            // transform option.
            "cacheDirectory": true,
            "presets": &babel.presets,
            "plugins": &babel.plugins,
        });
        self.add_loader(packages::BABEL_LOADER, Some(options));
        self
    }

    /// Prepend the per-rule minification step. Mangling stays off so
    /// substituted globals and stack traces survive.
    pub fn add_uglify_loader(&mut self) -> &mut Self {
        let opts = self.options;
        let Toggle::On(uglify) = &opts.uglify_loader else {
            return self;
        };
        let options = json!({
            "sourceMap": uglify.source_map,
            "mangle": false,
        });
        self.add_loader(packages::UGLIFY_LOADER, Some(options));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Rule, RulePattern};
    use rig_config::{
        BabelOptions, CacheLoaderOptions, Options, ReactOptions, Toggle, TypeScriptOptions,
        UglifyOptions,
    };

    fn rule() -> Rule {
        Rule::new(RulePattern::from_extensions(&["ts"]).unwrap(), None)
    }

    fn effective(mutate: impl FnOnce(&mut Options)) -> EffectiveOptions {
        let mut options = Options::default();
        mutate(&mut options);
        options.into_effective()
    }

    fn loaders(rule: &Rule) -> Vec<&str> {
        rule.steps.iter().map(|s| s.loader.as_str()).collect()
    }

    #[test]
    fn loaders_are_prepended() {
        let opts = effective(|_| {});
        let mut target = rule();
        let mut builder = RuleBuilder::installed(&mut target, &opts, "dev", None);
        builder.add_loader("first", None);
        builder.add_loader("second", None);
        assert_eq!(loaders(&target), vec!["second", "first"]);
    }

    #[test]
    fn ts_loader_requires_the_feature() {
        let opts = effective(|_| {});
        let mut target = rule();
        let mut builder = RuleBuilder::installed(&mut target, &opts, "dev", None);
        assert!(matches!(
            builder.add_ts_loader(),
            Err(Error::TypescriptNotConfigured)
        ));
    }

    #[test]
    fn ts_loader_transpile_only_follows_the_background_checker() {
        let opts = effective(|o| {
            o.typescript = Toggle::On(TypeScriptOptions {
                ts_config_file: "tsconfig.json".into(),
                use_fork_checker: true,
                tslint: Toggle::Off,
            });
        });
        let mut target = rule();
        let mut builder = RuleBuilder::installed(&mut target, &opts, "dev", None);
        builder.add_ts_loader().unwrap();
        let options = target.steps[0].options.as_ref().unwrap();
        assert_eq!(options["transpileOnly"], serde_json::json!(true));
        assert_eq!(options["configFile"], serde_json::json!("tsconfig.json"));
    }

    #[test]
    fn babel_and_uglify_are_no_ops_when_disabled() {
        let opts = effective(|_| {});
        let mut target = rule();
        let mut builder = RuleBuilder::installed(&mut target, &opts, "dev", None);
        builder.add_babel_loader();
        builder.add_uglify_loader();
        assert!(target.steps.is_empty());
    }

    #[test]
    fn uglify_loader_never_mangles() {
        let opts = effective(|o| {
            o.uglify_loader = Toggle::On(UglifyOptions { source_map: true });
        });
        let mut target = rule();
        let mut builder = RuleBuilder::installed(&mut target, &opts, "dev", None);
        builder.add_uglify_loader();
        let options = target.steps[0].options.as_ref().unwrap();
        assert_eq!(options["mangle"], serde_json::json!(false));
        assert_eq!(options["sourceMap"], serde_json::json!(true));
    }

    #[test]
    fn react_hot_loader_defers_to_babel() {
        let opts = effective(|o| {
            o.react = Toggle::On(ReactOptions::default());
            o.babel = Toggle::On(BabelOptions::default());
        });
        let mut target = rule();
        let mut builder = RuleBuilder::installed(&mut target, &opts, "dev", None);
        builder.add_react_hot_loader();
        assert!(target.steps.is_empty());

        let opts = effective(|o| {
            o.react = Toggle::On(ReactOptions::default());
        });
        let mut target = rule();
        let mut builder = RuleBuilder::installed(&mut target, &opts, "dev", None);
        builder.add_react_hot_loader();
        assert_eq!(loaders(&target), vec!["react-hot-loader/webpack"]);
    }

    #[test]
    fn cache_loader_keys_by_manifest_hash_and_environment() {
        let opts = effective(|o| {
            o.cache_loader = Toggle::On(CacheLoaderOptions::default());
        });
        let mut target = rule();
        let mut builder = RuleBuilder::installed(&mut target, &opts, "prod", Some("abc123"));
        assert!(builder.add_cache_loader(Some("ts")).is_some());
        let options = target.steps[0].options.as_ref().unwrap();
        assert_eq!(options["cacheIdentifier"], serde_json::json!("abc123-prod"));
    }

    #[test]
    fn cache_loader_respects_per_extension_switches() {
        let opts = effective(|o| {
            o.cache_loader = Toggle::On(CacheLoaderOptions {
                extensions: [("scss".to_string(), false)].into_iter().collect(),
            });
        });
        let mut target = rule();
        let mut builder = RuleBuilder::installed(&mut target, &opts, "dev", Some("abc123"));
        assert!(builder.add_cache_loader(Some("scss")).is_some());
        assert!(target.steps.is_empty());
    }

    #[test]
    fn cache_loader_breaks_the_chain_without_a_manifest_hash() {
        let opts = effective(|o| {
            o.cache_loader = Toggle::On(CacheLoaderOptions::default());
        });
        let mut target = rule();
        let mut builder = RuleBuilder::installed(&mut target, &opts, "dev", None);
        assert!(builder.add_cache_loader(Some("ts")).is_none());
        assert!(builder.add_cache_loader(Some("ts")).is_none());
        assert!(target.steps.is_empty());
    }

    #[test]
    fn missing_cache_key_is_reported_once_per_process() {
        CACHE_KEY_WARNED.store(false, Ordering::SeqCst);
        assert!(note_cache_key_missing());
        assert!(!note_cache_key_missing());
        assert!(!note_cache_key_missing());
    }
}
