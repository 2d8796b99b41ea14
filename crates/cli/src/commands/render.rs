use std::fs;
use std::path::{Path, PathBuf};

use cotiza_core::config::LoadOptions;
use cotiza_export::export_filename;
use cotiza_render::{DocumentRenderer, QuotationDocument};

use crate::commands::{load_runtime, open_draft, CommandResult, EXIT_DRAFT, EXIT_RENDER};

/// Writes an HTML preview of the draft without going through the export
/// states. Incomplete drafts still render; missing values show as `-`/`$ 0`.
pub fn run(options: LoadOptions, draft: &Path, output: Option<PathBuf>) -> CommandResult {
    let runtime = match load_runtime("render", options) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };
    let workspace = match open_draft("render", &runtime, draft) {
        Ok(workspace) => workspace,
        Err(result) => return result,
    };
    let Some(quotation) = workspace.quotation() else {
        return CommandResult::failure(
            "render",
            "draft_invalid",
            "no advisor signed in",
            EXIT_DRAFT,
        );
    };

    let renderer = match DocumentRenderer::embedded() {
        Ok(renderer) => renderer,
        Err(error) => {
            return CommandResult::failure("render", "render", error.to_string(), EXIT_RENDER)
        }
    };
    let document = QuotationDocument::build(quotation, &runtime.catalog, &runtime.config.branding);
    let html = match renderer.render(&document) {
        Ok(html) => html,
        Err(error) => {
            return CommandResult::failure("render", "render", error.to_string(), EXIT_RENDER)
        }
    };

    let path = output.unwrap_or_else(|| {
        runtime.config.export.output_dir.join(export_filename(&quotation.client.name, "html"))
    });
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        if let Err(error) = fs::create_dir_all(parent) {
            return CommandResult::failure("render", "store", error.to_string(), EXIT_RENDER);
        }
    }
    match fs::write(&path, html.as_bytes()) {
        Ok(()) => CommandResult::success(
            "render",
            format!("rendered preview to {} ({} bytes)", path.display(), html.len()),
        ),
        Err(error) => CommandResult::failure(
            "render",
            "store",
            format!("could not write `{}`: {error}", path.display()),
            EXIT_RENDER,
        ),
    }
}
