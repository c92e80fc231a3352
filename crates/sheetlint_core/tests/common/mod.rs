//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;
use sheetlint_ast::Node;
use sheetlint_core::{Config, Plugin, Registry, Rule, RuleMeta, rule_fn};

/// Reports `color: red`, or rewrites it to `green` when fixing.
pub fn color_no_red() -> Arc<dyn Rule> {
    rule_fn(RuleMeta::default().fixable(), |root, ctx| {
        let fix = ctx.fix();
        root.walk_decls_mut(|decl| {
            if decl.value == "red" {
                if fix {
                    decl.value = "green".to_string();
                } else {
                    ctx.report("Unexpected red", decl.source.as_ref());
                }
            }
        });
    })
}

/// Fixable, but never changes anything.
pub fn noop_fix() -> Arc<dyn Rule> {
    rule_fn(RuleMeta::default().fixable(), |_, _| {})
}

/// Reports rules without children.
pub fn block_no_empty() -> Arc<dyn Rule> {
    rule_fn(RuleMeta::default(), |root, ctx| {
        let mut empty = Vec::new();
        root.walk(|node| {
            if let Node::Rule(rule) = node
                && rule.nodes.is_empty()
            {
                empty.push(rule.source);
            }
        });
        for source in empty {
            ctx.report("Unexpected empty block", source.as_ref());
        }
    })
}

pub fn registry() -> Registry {
    Registry::new()
        .with_rule("color-no-red", color_no_red())
        .with_rule("noop-fix", noop_fix())
        .with_rule("block-no-empty", block_no_empty())
        .with_plugin(
            "sheetlint-plugin-acme",
            Plugin::new("sheetlint-plugin-acme").with_rule("acme/no-empty", block_no_empty()),
        )
        .with_config(
            "sheetlint-config-standard",
            Config::new()
                .with_rule("color-no-red", json!(true))
                .with_rule("block-no-empty", json!(true)),
        )
}

pub fn write(dir: &Path, relative: &str, content: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}
