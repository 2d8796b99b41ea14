use std::path::Path;
use std::sync::Arc;

use tracing::info;

use cotiza_core::config::LoadOptions;
use cotiza_core::errors::{ApplicationError, DomainError};
use cotiza_core::handoff::{Channel, ChannelTarget};
use cotiza_export::{
    ChannelLauncher, ExportCoordinator, ExportError, ExportReceipt, FsDocumentStore,
    HandoffOutcome, LaunchError,
};
use cotiza_render::{rasterizer_for, Rasterizer};

use crate::commands::{
    load_runtime, open_draft, runtime_failure, CommandResult, EXIT_EXPORT, EXIT_HANDOFF,
    EXIT_INCOMPLETE, EXIT_RENDER,
};

/// A terminal cannot open mail or chat applications; the link is logged and
/// returned in the command output for the advisor to follow.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleLauncher;

impl ChannelLauncher for ConsoleLauncher {
    fn open(&self, target: &ChannelTarget) -> Result<(), LaunchError> {
        info!(
            event_name = "handoff.link_ready",
            channel = %target.channel,
            recipient = %target.recipient,
            "hand-off link ready"
        );
        Ok(())
    }
}

pub fn run(options: LoadOptions, draft: &Path, send: Option<Channel>) -> CommandResult {
    let runtime = match load_runtime("export", options) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };
    let mut workspace = match open_draft("export", &runtime, draft) {
        Ok(workspace) => workspace,
        Err(result) => return result,
    };

    let correlation_id = workspace.correlation_id().to_owned();

    if let Err(error) = workspace.request_review() {
        let (error_class, exit_code) = match &error {
            DomainError::IncompletePolicy { .. } => ("incomplete_quotation", EXIT_INCOMPLETE),
            _ => ("domain", EXIT_EXPORT),
        };
        return CommandResult::application_failure(
            "export",
            error_class,
            error,
            &correlation_id,
            exit_code,
        );
    }

    let rasterizer: Arc<dyn Rasterizer> = match rasterizer_for(runtime.config.export.rasterizer) {
        Ok(rasterizer) => Arc::from(rasterizer),
        Err(error) => {
            return CommandResult::application_failure(
                "export",
                "rasterize",
                ExportError::from(error),
                &correlation_id,
                EXIT_RENDER,
            )
        }
    };
    let coordinator = match ExportCoordinator::new(
        &runtime.config,
        rasterizer,
        Arc::new(FsDocumentStore::new(runtime.config.export.output_dir.clone())),
        Arc::new(ConsoleLauncher),
    ) {
        Ok(coordinator) => coordinator,
        Err(error) => return export_failure(error, &correlation_id),
    };

    let tokio_runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(tokio_runtime) => tokio_runtime,
        Err(error) => return runtime_failure("export", error),
    };

    match send {
        None => match tokio_runtime.block_on(coordinator.export(&mut workspace)) {
            Ok(receipt) => CommandResult::success("export", saved_line(&receipt)),
            Err(error) => export_failure(error, &correlation_id),
        },
        Some(channel) => {
            match tokio_runtime.block_on(coordinator.export_and_handoff(&mut workspace, channel)) {
                Ok(HandoffOutcome::Opened { receipt, target }) => {
                    let saved = saved_line(&receipt);
                    CommandResult::success(
                        "export",
                        format!("{saved}\nopen: {}\n{}", target.url, target.instruction),
                    )
                }
                Ok(HandoffOutcome::Aborted { receipt, error }) => {
                    let interface = ApplicationError::from(error).into_interface(&correlation_id);
                    CommandResult::failure_in_session(
                        "export",
                        "handoff",
                        format!("{}\n{}", saved_line(&receipt), interface.message()),
                        Some(interface.correlation_id()),
                        EXIT_HANDOFF,
                    )
                }
                Err(error) => export_failure(error, &correlation_id),
            }
        }
    }
}

fn saved_line(receipt: &ExportReceipt) -> String {
    format!("saved {} ({}, {} bytes)", receipt.location, receipt.format, receipt.size)
}

fn export_failure(error: ExportError, correlation_id: &str) -> CommandResult {
    let (error_class, exit_code) = match &error {
        ExportError::Render(_) => ("render", EXIT_RENDER),
        ExportError::Rasterize(_) => ("rasterize", EXIT_RENDER),
        ExportError::Store(_) => ("store", EXIT_EXPORT),
        ExportError::Launch(_) => ("handoff", EXIT_HANDOFF),
        ExportError::ExportInProgress => ("export_in_progress", EXIT_EXPORT),
        ExportError::Domain(_) => ("domain", EXIT_EXPORT),
    };
    CommandResult::application_failure("export", error_class, error, correlation_id, exit_code)
}
