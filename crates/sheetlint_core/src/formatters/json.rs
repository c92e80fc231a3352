//! JSON formatter.

use crate::{LintResult, LinterError};

pub(super) fn format(results: &[LintResult]) -> Result<String, LinterError> {
    serde_json::to_string(results)
        .map_err(|e| LinterError::Internal(format!("Failed to serialize results: {e}")))
}
