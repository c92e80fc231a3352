//! Disable comments.
//!
//! ```css
//! /* sheetlint-disable */
//! /* sheetlint-disable color-no-red, block-no-empty -- legacy theme */
//! /* sheetlint-enable */
//! a {} /* sheetlint-disable-line block-no-empty */
//! /* sheetlint-disable-next-line */
//! ```
//!
//! Ranges are line based. `sheetlint-enable` without rules closes every open
//! range; with rules it closes only those rules' ranges.

use std::ops::ControlFlow;

use sheetlint_ast::visitor::{VisitResult, Visitor, walk_nodes};
use sheetlint_ast::{Comment, Root};
use sheetlint_plugin::Warning;

use crate::disable_settings::{DisableReport, validate_disable_settings};
use crate::{Config, LintResult};

/// Name used for ranges that cover every rule.
pub const ALL_RULES: &str = "all";

/// Lines on which warnings of `rule` (or every rule) are suppressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisabledRange {
    /// `None` covers every rule.
    pub rule: Option<String>,
    pub start: u32,
    /// `None` runs to the end of the input.
    pub end: Option<u32>,
    /// Position of the comment that opened the range.
    pub comment_line: u32,
    pub comment_column: u32,
    /// Text after `--` in the comment.
    pub description: Option<String>,
}

impl DisabledRange {
    fn covers(&self, warning: &Warning) -> bool {
        let in_lines =
            warning.line >= self.start && self.end.is_none_or(|end| warning.line <= end);
        let for_rule = self.rule.as_deref().is_none_or(|rule| rule == warning.rule);
        in_lines && for_rule
    }

    /// Rule name for reports.
    pub fn rule_name(&self) -> &str {
        self.rule.as_deref().unwrap_or(ALL_RULES)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Disable,
    Enable,
    DisableLine,
    DisableNextLine,
}

const COMMANDS: [(&str, Command); 4] = [
    ("sheetlint-disable-next-line", Command::DisableNextLine),
    ("sheetlint-disable-line", Command::DisableLine),
    ("sheetlint-disable", Command::Disable),
    ("sheetlint-enable", Command::Enable),
];

struct Directive {
    command: Command,
    rules: Vec<String>,
    description: Option<String>,
}

fn parse_directive(text: &str) -> Option<Directive> {
    let (body, description) = split_description(text.trim());
    COMMANDS.iter().find_map(|(name, command)| {
        let rest = body.strip_prefix(name)?;
        if !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
            return None;
        }
        let rules = rest
            .split(',')
            .map(str::trim)
            .filter(|rule| !rule.is_empty())
            .map(str::to_string)
            .collect();
        Some(Directive {
            command: *command,
            rules,
            description: description.clone(),
        })
    })
}

/// Splits at the first run of two or more dashes surrounded by whitespace.
fn split_description(text: &str) -> (&str, Option<String>) {
    let bytes = text.as_bytes();
    let mut from = 0;
    while let Some(pos) = text[from..].find("--") {
        let start = from + pos;
        let mut end = start;
        while end < bytes.len() && bytes[end] == b'-' {
            end += 1;
        }
        let spaced_before = start > 0 && bytes[start - 1].is_ascii_whitespace();
        let spaced_after = end == bytes.len() || bytes[end].is_ascii_whitespace();
        if spaced_before && spaced_after {
            let description = text[end..].trim();
            return (
                text[..start].trim_end(),
                (!description.is_empty()).then(|| description.to_string()),
            );
        }
        from = end;
    }
    (text, None)
}

#[derive(Default)]
struct RangeCollector {
    ranges: Vec<DisabledRange>,
    open: Vec<usize>,
}

impl RangeCollector {
    fn push(
        &mut self,
        rule: Option<String>,
        start: u32,
        end: Option<u32>,
        comment: (u32, u32),
        description: &Option<String>,
    ) {
        self.ranges.push(DisabledRange {
            rule,
            start,
            end,
            comment_line: comment.0,
            comment_column: comment.1,
            description: description.clone(),
        });
    }

    fn directive(&mut self, directive: Directive, start_line: u32, end_line: u32, column: u32) {
        let comment = (start_line, column);
        let rules: Vec<Option<String>> = if directive.rules.is_empty() {
            vec![None]
        } else {
            directive.rules.into_iter().map(Some).collect()
        };

        match directive.command {
            Command::Disable => {
                for rule in rules {
                    self.open.push(self.ranges.len());
                    self.push(rule, start_line, None, comment, &directive.description);
                }
            }
            Command::DisableLine => {
                for rule in rules {
                    self.push(rule, start_line, Some(start_line), comment, &directive.description);
                }
            }
            Command::DisableNextLine => {
                let line = end_line + 1;
                for rule in rules {
                    self.push(rule, line, Some(line), comment, &directive.description);
                }
            }
            Command::Enable => {
                let closes_all = rules.iter().all(Option::is_none);
                let ranges = &mut self.ranges;
                self.open.retain(|&index| {
                    let range = &mut ranges[index];
                    if closes_all || rules.contains(&range.rule) {
                        range.end = Some(start_line);
                        false
                    } else {
                        true
                    }
                });
            }
        }
    }
}

impl Visitor for RangeCollector {
    fn visit_comment(&mut self, comment: &Comment) -> VisitResult {
        if let Some(source) = comment.source
            && let Some(directive) = parse_directive(&comment.text)
        {
            self.directive(
                directive,
                source.loc.start.line,
                source.loc.end.line,
                source.loc.start.column,
            );
        }
        ControlFlow::Continue(())
    }
}

/// Collects the disabled ranges declared by comments in `root`.
pub fn collect_disabled_ranges(root: &Root) -> Vec<DisabledRange> {
    let mut collector = RangeCollector::default();
    let _ = walk_nodes(&mut collector, &root.nodes);
    collector.ranges
}

/// Drops warnings covered by a range. Returns the kept warnings and, per
/// range, whether it suppressed anything.
pub fn apply_disables(
    warnings: Vec<Warning>,
    ranges: &[DisabledRange],
) -> (Vec<Warning>, Vec<bool>) {
    let mut used = vec![false; ranges.len()];
    let kept = warnings
        .into_iter()
        .filter(|warning| {
            let mut covered = false;
            for (index, range) in ranges.iter().enumerate() {
                if range.covers(warning) {
                    used[index] = true;
                    covered = true;
                }
            }
            !covered
        })
        .collect();
    (kept, used)
}

/// Adds the configured disable reports to `result`.
///
/// `is_enabled` tells whether a rule is configured and on.
pub fn report_disables<F>(
    result: &mut LintResult,
    config: &Config,
    ranges: &[DisabledRange],
    used: &[bool],
    is_enabled: F,
) where
    F: Fn(&str) -> bool,
{
    let ignore_disables = config.ignore_disables.unwrap_or(false);

    if !ignore_disables
        && let Some(settings) =
            validate_disable_settings(Some(result), Some(config), DisableReport::Needless)
    {
        for (range, _) in ranges.iter().zip(used).filter(|(_, used)| !**used) {
            let rule = range.rule_name();
            if settings.applies_to(rule) {
                let text = format!("Needless disable for \"{rule}\"");
                result.push_warning(
                    report(DisableReport::Needless, text, range).with_severity(settings.severity),
                );
            }
        }
    }

    if let Some(settings) =
        validate_disable_settings(Some(result), Some(config), DisableReport::InvalidScope)
    {
        for range in ranges {
            let Some(rule) = range.rule.as_deref() else {
                continue;
            };
            if !is_enabled(rule) && settings.applies_to(rule) {
                let text = format!("Rule \"{rule}\" isn't enabled");
                result.push_warning(
                    report(DisableReport::InvalidScope, text, range)
                        .with_severity(settings.severity),
                );
            }
        }
    }

    if let Some(settings) =
        validate_disable_settings(Some(result), Some(config), DisableReport::Descriptionless)
    {
        for range in ranges.iter().filter(|range| range.description.is_none()) {
            let rule = range.rule_name();
            if settings.applies_to(rule) {
                result.push_warning(
                    report(
                        DisableReport::Descriptionless,
                        format!("Disable for \"{rule}\" is missing a description"),
                        range,
                    )
                    .with_severity(settings.severity),
                );
            }
        }
    }
}

fn report(kind: DisableReport, text: String, range: &DisabledRange) -> Warning {
    Warning::new(kind.rule_name(), text, range.comment_line, range.comment_column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;
    use sheetlint_parser::{CssParser, Parser};
    use sheetlint_plugin::Severity;

    fn ranges(css: &str) -> Vec<DisabledRange> {
        collect_disabled_ranges(&CssParser::new().parse(css, None).unwrap())
    }

    fn warning(rule: &str, line: u32) -> Warning {
        Warning::new(rule, format!("x ({rule})"), line, 1)
    }

    #[rstest]
    #[case("sheetlint-disable", Some((Command::Disable, vec![], None)))]
    #[case("sheetlint-disable a, b", Some((Command::Disable, vec!["a", "b"], None)))]
    #[case(
        "sheetlint-disable-line a -- why not",
        Some((Command::DisableLine, vec!["a"], Some("why not")))
    )]
    #[case(
        "sheetlint-disable-next-line -- reason",
        Some((Command::DisableNextLine, vec![], Some("reason")))
    )]
    #[case("sheetlint-enable a", Some((Command::Enable, vec!["a"], None)))]
    #[case("sheetlint-disabled", None)]
    #[case("just a comment", None)]
    fn parses_directives(
        #[case] text: &str,
        #[case] expected: Option<(Command, Vec<&str>, Option<&str>)>,
    ) {
        let parsed = parse_directive(text)
            .map(|d| (d.command, d.rules, d.description));
        let expected = expected.map(|(c, rules, desc)| {
            (
                c,
                rules.into_iter().map(str::to_string).collect::<Vec<_>>(),
                desc.map(str::to_string),
            )
        });
        assert_eq!(parsed, expected);
    }

    #[test]
    fn disable_enable_block() {
        let css = "/* sheetlint-disable */\na {}\n/* sheetlint-enable */\nb {}\n";
        let ranges = ranges(css);
        assert_eq!(ranges.len(), 1);
        assert_eq!((ranges[0].start, ranges[0].end), (1, Some(3)));
        assert_eq!(ranges[0].rule, None);

        let (kept, used) = apply_disables(vec![warning("r", 2), warning("r", 4)], &ranges);
        assert_eq!(kept, vec![warning("r", 4)]);
        assert_eq!(used, vec![true]);
    }

    #[test]
    fn rule_specific_enable_closes_only_that_rule() {
        let css = "/* sheetlint-disable a, b */\n/* sheetlint-enable a */\nx {}\n";
        let ranges = ranges(css);
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].end, Some(2));
        assert_eq!(ranges[1].end, None);

        let (kept, _) = apply_disables(vec![warning("a", 3), warning("b", 3)], &ranges);
        assert_eq!(kept, vec![warning("a", 3)]);
    }

    #[test]
    fn line_and_next_line() {
        let css = "a {} /* sheetlint-disable-line a */\n/* sheetlint-disable-next-line */\nb {}\nc {}\n";
        let ranges = ranges(css);
        assert_eq!((ranges[0].start, ranges[0].end), (1, Some(1)));
        assert_eq!((ranges[1].start, ranges[1].end), (3, Some(3)));

        let (kept, used) = apply_disables(
            vec![warning("a", 1), warning("b", 1), warning("b", 3), warning("b", 4)],
            &ranges,
        );
        assert_eq!(kept, vec![warning("b", 1), warning("b", 4)]);
        assert_eq!(used, vec![true, true]);
    }

    #[test]
    fn reports_needless_invalid_scope_and_descriptionless() {
        let css = "/* sheetlint-disable-line a -- ok */\n/* sheetlint-disable-line unknown */\n";
        let ranges = ranges(css);
        let config = Config {
            report_needless_disables: Some(json!(true)),
            report_invalid_scope_disables: Some(json!([true, { "severity": "warning" }])),
            report_descriptionless_disables: Some(json!(true)),
            ..Config::default()
        };
        let mut result = LintResult::default();
        report_disables(&mut result, &config, &ranges, &[true, false], |rule| rule == "a");

        let texts: Vec<_> = result
            .warnings
            .iter()
            .map(|w| (w.rule.as_str(), w.text.as_str(), w.line, w.severity))
            .collect();
        assert_eq!(
            texts,
            vec![
                (
                    "--report-needless-disables",
                    "Needless disable for \"unknown\"",
                    2,
                    Severity::Error
                ),
                (
                    "--report-invalid-scope-disables",
                    "Rule \"unknown\" isn't enabled",
                    2,
                    Severity::Warning
                ),
                (
                    "--report-descriptionless-disables",
                    "Disable for \"unknown\" is missing a description",
                    2,
                    Severity::Error
                ),
            ]
        );
        assert!(result.errored);
    }

    #[test]
    fn except_limits_needless_reports() {
        let css = "/* sheetlint-disable-line a */\n/* sheetlint-disable-line b */\n";
        let ranges = ranges(css);
        let config = Config {
            report_needless_disables: Some(json!([true, { "except": ["b"] }])),
            ..Config::default()
        };
        let mut result = LintResult::default();
        report_disables(&mut result, &config, &ranges, &[false, false], |_| true);

        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].text, "Needless disable for \"a\"");
    }

    #[test]
    fn no_reports_without_settings() {
        let ranges = ranges("/* sheetlint-disable */\n");
        let mut result = LintResult::default();
        report_disables(&mut result, &Config::default(), &ranges, &[false], |_| true);
        assert!(result.warnings.is_empty());
    }
}
