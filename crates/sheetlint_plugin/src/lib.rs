//! # sheetlint_plugin
//!
//! Rule and plugin interfaces for sheetlint.
//!
//! This crate provides:
//! - The [`Rule`] trait every check implements, and the [`RuleContext`] it
//!   reports through
//! - [`Warning`] and [`Severity`], the diagnostics rules produce
//! - [`Plugin`] bundles of namespaced rules and the [`PluginCatalog`] the host
//!   registers them in, so configurations can refer to plugins by specifier
//!
//! ## Example
//!
//! ```rust
//! use sheetlint_plugin::{Plugin, PluginCatalog, RuleMeta, rule_fn};
//!
//! let rule = rule_fn(RuleMeta::default(), |root, ctx| {
//!     root.walk_decls(|decl| {
//!         if decl.value == "red" {
//!             ctx.report("Unexpected red", decl.source.as_ref());
//!         }
//!     });
//! });
//!
//! let mut catalog = PluginCatalog::new();
//! catalog.register(
//!     "sheetlint-plugin-colors",
//!     Plugin::new("colors").with_rule("colors/no-red", rule),
//! );
//! assert!(catalog.contains("sheetlint-plugin-colors"));
//! ```

mod catalog;
mod diagnostic;
mod error;
mod rule;

pub use catalog::{Plugin, PluginCatalog, PluginFunctions, PluginRule};
pub use diagnostic::{Severity, Warning};
pub use error::PluginError;
pub use rule::{FnRule, Rule, RuleContext, RuleMeta, RuleOutput, rule_fn};
