//! `file:line:column: message [severity]` lines with a problem count.

use super::source_name;
use crate::LintResult;

pub(super) fn format(results: &[LintResult]) -> String {
    let mut output = String::new();
    let mut total = 0;

    for result in results {
        let source = source_name(result);
        for warning in &result.warnings {
            output.push_str(&format!(
                "{}:{}:{}: {} [{}]\n",
                source, warning.line, warning.column, warning.text, warning.severity
            ));
            total += 1;
        }
    }

    if total > 0 {
        let plural = if total == 1 { "" } else { "s" };
        output.push_str(&format!("\n{total} problem{plural}\n"));
    }
    output
}
