//! One line per warning.

use super::source_name;
use crate::LintResult;

pub(super) fn format(results: &[LintResult]) -> String {
    let lines: Vec<String> = results
        .iter()
        .flat_map(|result| {
            let source = source_name(result);
            result.warnings.iter().map(move |warning| {
                format!(
                    "{}: line {}, col {}, {} - {}",
                    source, warning.line, warning.column, warning.severity, warning.text
                )
            })
        })
        .collect();

    let mut output = lines.join("\n");
    if !output.is_empty() {
        output.push('\n');
    }
    output
}
