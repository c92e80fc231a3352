//! Human-readable report grouped by input.

use std::path::Path;

use sheetlint_plugin::Severity;

use super::relative_source_name;
use crate::LintResult;

pub(super) fn format(results: &[LintResult], cwd: &Path) -> String {
    let mut output = String::new();

    let deprecations: Vec<&str> = results
        .iter()
        .flat_map(|r| r.deprecations.iter().map(|d| d.text.as_str()))
        .collect();
    if !deprecations.is_empty() {
        output.push_str("\nDeprecation warnings:\n");
        for text in dedup(deprecations) {
            output.push_str(&format!(" - {text}\n"));
        }
    }

    let invalid: Vec<&str> = results
        .iter()
        .flat_map(|r| r.invalid_option_warnings.iter().map(|w| w.text.as_str()))
        .collect();
    if !invalid.is_empty() {
        output.push_str("\nInvalid Option:\n");
        for text in dedup(invalid) {
            output.push_str(&format!(" - {text}\n"));
        }
    }

    let mut errors = 0;
    let mut warnings = 0;
    for result in results.iter().filter(|r| !r.warnings.is_empty()) {
        output.push_str(&format!("\n{}\n", relative_source_name(result, cwd)));

        let mut sorted: Vec<_> = result.warnings.iter().collect();
        sorted.sort_by_key(|w| (w.line, w.column));
        for warning in sorted {
            let symbol = match warning.severity {
                Severity::Error => {
                    errors += 1;
                    "✖"
                }
                Severity::Warning => {
                    warnings += 1;
                    "⚠"
                }
            };
            let suffix = format!(" ({})", warning.rule);
            let text = warning.text.strip_suffix(&suffix).unwrap_or(&warning.text);
            output.push_str(&format!(
                "  {}:{}  {}  {}  {}\n",
                warning.line, warning.column, symbol, text, warning.rule
            ));
        }
    }

    let total = errors + warnings;
    if total > 0 {
        output.push_str(&format!(
            "\n✖ {total} {} ({errors} {}, {warnings} {})\n",
            plural(total, "problem"),
            plural(errors, "error"),
            plural(warnings, "warning"),
        ));
    }

    output
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

fn dedup(items: Vec<&str>) -> Vec<&str> {
    let mut seen = Vec::new();
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}
