use cotiza_core::config::LoadOptions;

use crate::commands::{load_runtime, CommandResult, EXIT_ADVISOR_NOT_FOUND};

pub fn run(options: LoadOptions, code: &str) -> CommandResult {
    let runtime = match load_runtime("advisor", options) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    match runtime.catalog.lookup_advisor(code) {
        Ok(advisor) => CommandResult::success(
            "advisor",
            format!(
                "{} ({})\n{}\n{}",
                advisor.name, advisor.title, advisor.email, advisor.phone
            ),
        ),
        Err(error) => CommandResult::failure(
            "advisor",
            "advisor_not_found",
            error.user_message(),
            EXIT_ADVISOR_NOT_FOUND,
        ),
    }
}
