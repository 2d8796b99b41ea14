use std::path::Path;

use cotiza_core::config::LoadOptions;
use cotiza_core::domain::money::format_currency;
use cotiza_core::errors::DomainError;

use crate::commands::{load_runtime, open_draft, CommandResult, EXIT_DRAFT, EXIT_INCOMPLETE};

/// Replays a draft and reports whether it could be sent to review.
pub fn run(options: LoadOptions, draft: &Path) -> CommandResult {
    let runtime = match load_runtime("check", options) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };
    let workspace = match open_draft("check", &runtime, draft) {
        Ok(workspace) => workspace,
        Err(result) => return result,
    };

    let (Some(report), Some(quotation)) = (workspace.completeness(), workspace.quotation()) else {
        return CommandResult::failure("check", "draft_invalid", "no advisor signed in", EXIT_DRAFT);
    };

    if report.complete {
        CommandResult::success(
            "check",
            format!(
                "quotation is complete; total monthly investment {}",
                format_currency(quotation.total_investment())
            ),
        )
    } else {
        CommandResult::application_failure(
            "check",
            "incomplete_quotation",
            DomainError::IncompletePolicy { missing: report.missing_keys() },
            workspace.correlation_id(),
            EXIT_INCOMPLETE,
        )
    }
}
