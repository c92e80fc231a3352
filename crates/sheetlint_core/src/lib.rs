//! # sheetlint_core
//!
//! Configuration resolution and lint orchestration for sheetlint.
//!
//! This crate provides:
//! - Configuration merging, `overrides`, `extends` and plugin loading
//! - File discovery and ignore filtering
//! - The concurrent `Linter` with caching and fix write-back
//! - Result aggregation and formatters
//!
//! ## Example
//!
//! ```rust,no_run
//! use serde_json::json;
//! use sheetlint_core::{Config, LintOptions, Registry, lint};
//!
//! # async fn run() -> Result<(), sheetlint_core::LinterError> {
//! let options = LintOptions::for_files(["src/**/*.css"])
//!     .with_config(Config::new().with_rule("block-no-empty", json!(true)));
//!
//! let aggregate = lint(options, Registry::new()).await?;
//! for result in &aggregate.results {
//!     println!("{:?}: {} warnings", result.source, result.warnings.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod augment;
mod config;
pub mod disable_settings;
pub mod disables;
mod error;
pub mod file_finder;
mod file_linter;
pub mod fixer;
pub mod formatters;
pub mod ignorer;
mod linter;
pub mod loader;
pub mod merge;
pub mod normalize;
mod options;
pub mod overrides;
pub mod paths;
pub mod plugin_loader;
mod registry;
mod result;

pub use augment::{ConfigAugmenter, ResolvedConfig};
pub use config::{Config, ExtendsEntry, Override, PluginEntry};
pub use disable_settings::{DisableReport, DisableSettings, validate_disable_settings};
pub use disables::DisabledRange;
pub use error::LinterError;
pub use file_linter::{LintOutcome, SourceInput};
pub use formatters::{Formatter, FormatterFn, FormatterOption};
pub use linter::{Linter, lint};
pub use loader::{ConfigLoader, FileConfigLoader, LoadedConfig};
pub use merge::merge_configs;
pub use normalize::RuleSettings;
pub use options::LintOptions;
pub use overrides::apply_overrides;
pub use plugin_loader::load_plugins;
pub use registry::Registry;
pub use result::{
    AggregateResult, Deprecation, InvalidOptionWarning, LintResult, MaxWarningsExceeded,
    prepare_return_value,
};

pub use sheetlint_cache::CacheStrategy;
pub use sheetlint_plugin::{Plugin, Rule, RuleContext, RuleMeta, Severity, Warning, rule_fn};
