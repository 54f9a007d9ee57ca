//! Names of the external packages the derivable features depend on.
//!
//! Feature derivation declares these; the resolver decides which are
//! actually installed.

pub const BABEL_LOADER: &str = "babel-loader";
pub const BABEL_CORE: &str = "@babel/core";
pub const BABEL_POLYFILL: &str = "@babel/polyfill";
pub const BABEL_PRESET_ENV: &str = "@babel/preset-env";
pub const BABEL_PRESET_REACT: &str = "@babel/preset-react";

pub const TYPESCRIPT: &str = "typescript";
pub const TS_LOADER: &str = "ts-loader";
pub const TSLINT: &str = "tslint";
pub const TSLINT_LOADER: &str = "tslint-loader";
pub const FORK_TS_CHECKER_PLUGIN: &str = "fork-ts-checker-webpack-plugin";

pub const REACT: &str = "react";
pub const REACT_DOM: &str = "react-dom";
pub const REACT_HOT_LOADER: &str = "react-hot-loader";
pub const TYPES_REACT: &str = "@types/react";
pub const TYPES_REACT_DOM: &str = "@types/react-dom";
pub const TYPES_REACT_HOT_LOADER: &str = "@types/react-hot-loader";

pub const CSS_LOADER: &str = "css-loader";
pub const STYLE_LOADER: &str = "style-loader";
pub const SASS_LOADER: &str = "sass-loader";

pub const HTML_LOADER: &str = "html-loader";
pub const NGTEMPLATE_LOADER: &str = "ngtemplate-loader";
pub const HOT_ACCEPT_LOADER: &str = "webpack-module-hot-accept";

pub const JSON_LOADER: &str = "json-loader";
pub const URL_LOADER: &str = "url-loader";
pub const FILE_LOADER: &str = "file-loader";

pub const CACHE_LOADER: &str = "cache-loader";
pub const UGLIFY_LOADER: &str = "uglify-loader";

pub const CLEAN_PLUGIN: &str = "clean-webpack-plugin";
pub const COPY_PLUGIN: &str = "copy-webpack-plugin";
pub const UGLIFY_PLUGIN: &str = "uglifyjs-webpack-plugin";
pub const BUNDLE_ANALYZER: &str = "webpack-bundle-analyzer";
pub const BUNDLE_SIZE_ANALYZER: &str = "webpack-bundle-size-analyzer";
