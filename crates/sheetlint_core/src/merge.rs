//! Structural merge of two configuration fragments.

use crate::Config;

/// Merges `incoming` onto `base`.
///
/// `plugins` and `overrides` are unioned with `base` entries first. `extends`
/// is unioned keeping the last position of a repeated entry. `rules` are
/// replaced per rule name, never deep-merged. Every other field takes
/// `incoming`'s value when it has one.
pub fn merge_configs(base: &Config, incoming: &Config) -> Config {
    Config {
        extends: union_keep_last(&base.extends, &incoming.extends),
        plugins: union_keep_first(&base.plugins, &incoming.plugins),
        overrides: union_keep_first(&base.overrides, &incoming.overrides),
        rules: match (&base.rules, &incoming.rules) {
            (Some(base_rules), Some(incoming_rules)) => {
                let mut rules = base_rules.clone();
                for (name, settings) in incoming_rules {
                    rules.insert(name.clone(), settings.clone());
                }
                Some(rules)
            }
            (base_rules, incoming_rules) => incoming_rules.clone().or_else(|| base_rules.clone()),
        },
        ignore_files: incoming
            .ignore_files
            .clone()
            .or_else(|| base.ignore_files.clone()),
        ignore_disables: incoming.ignore_disables.or(base.ignore_disables),
        quiet: incoming.quiet.or(base.quiet),
        report_needless_disables: incoming
            .report_needless_disables
            .clone()
            .or_else(|| base.report_needless_disables.clone()),
        report_invalid_scope_disables: incoming
            .report_invalid_scope_disables
            .clone()
            .or_else(|| base.report_invalid_scope_disables.clone()),
        report_descriptionless_disables: incoming
            .report_descriptionless_disables
            .clone()
            .or_else(|| base.report_descriptionless_disables.clone()),
        custom_syntax: incoming
            .custom_syntax
            .clone()
            .or_else(|| base.custom_syntax.clone()),
        fix: incoming.fix.or(base.fix),
        default_severity: incoming.default_severity.or(base.default_severity),
        allow_empty_input: incoming.allow_empty_input.or(base.allow_empty_input),
        cache: incoming.cache.or(base.cache),
    }
}

fn union_keep_first<T: Clone + PartialEq>(base: &[T], incoming: &[T]) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(base.len() + incoming.len());
    for item in base.iter().chain(incoming) {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}

fn union_keep_last<T: Clone + PartialEq>(base: &[T], incoming: &[T]) -> Vec<T> {
    let all: Vec<&T> = base.iter().chain(incoming).collect();
    let mut out = Vec::with_capacity(all.len());
    for (i, item) in all.iter().enumerate() {
        if !all[i + 1..].contains(item) {
            out.push((*item).clone());
        }
    }
    out
}
