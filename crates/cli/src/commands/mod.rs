pub mod advisor;
pub mod catalog;
pub mod check;
pub mod config;
pub mod doctor;
pub mod export;
pub mod render;

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use cotiza_core::audit::TracingAuditSink;
use cotiza_core::catalog::Catalog;
use cotiza_core::config::{AppConfig, LoadOptions};
use cotiza_core::errors::{ApplicationError, DomainError};
use cotiza_core::workspace::Workspace;

use crate::draft::{DraftError, QuotationDraft};

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_CATALOG: u8 = 3;
pub const EXIT_DRAFT: u8 = 4;
pub const EXIT_ADVISOR_NOT_FOUND: u8 = 5;
pub const EXIT_INCOMPLETE: u8 = 6;
pub const EXIT_RENDER: u8 = 7;
pub const EXIT_EXPORT: u8 = 8;
pub const EXIT_HANDOFF: u8 = 9;
pub const EXIT_RUNTIME: u8 = 10;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            correlation_id: None,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self::failure_in_session(command, error_class, message, None, exit_code)
    }

    /// Maps an application failure through the interface layer so the payload
    /// carries the user-safe message and the session correlation id.
    pub fn application_failure(
        command: &str,
        error_class: &str,
        error: impl Into<ApplicationError>,
        correlation_id: &str,
        exit_code: u8,
    ) -> Self {
        let error = error.into();
        let missing = match &error {
            ApplicationError::Domain(DomainError::IncompletePolicy { missing }) => {
                Some(missing.join(", "))
            }
            _ => None,
        };
        let interface = error.into_interface(correlation_id);
        let message = match missing {
            Some(missing) => format!("{} missing: {missing}", interface.message()),
            None => interface.message().to_owned(),
        };
        Self::failure_in_session(
            command,
            error_class,
            message,
            Some(interface.correlation_id()),
            exit_code,
        )
    }

    pub fn failure_in_session(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        correlation_id: Option<&str>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            correlation_id: correlation_id.map(str::to_owned),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Configuration and catalog shared by every command that touches a quotation.
pub(crate) struct Runtime {
    pub config: AppConfig,
    pub catalog: Arc<Catalog>,
}

pub(crate) fn load_runtime(command: &str, options: LoadOptions) -> Result<Runtime, CommandResult> {
    let config = AppConfig::load(options).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            EXIT_CONFIG,
        )
    })?;

    let catalog = config.catalog.build().map_err(|error| {
        CommandResult::failure(command, "catalog_load", error.to_string(), EXIT_CATALOG)
    })?;

    Ok(Runtime { config, catalog: Arc::new(catalog) })
}

/// Opens a workspace and replays the draft into it.
pub(crate) fn open_draft(
    command: &str,
    runtime: &Runtime,
    draft_path: &Path,
) -> Result<Workspace, CommandResult> {
    let draft = QuotationDraft::load(draft_path).map_err(|error| {
        CommandResult::failure(command, "draft_invalid", error.to_string(), EXIT_DRAFT)
    })?;
    let mut workspace = Workspace::new(Arc::clone(&runtime.catalog))
        .with_audit_sink(Arc::new(TracingAuditSink));
    draft
        .apply(&mut workspace)
        .map_err(|error| draft_failure(command, error, workspace.correlation_id()))?;
    Ok(workspace)
}

fn draft_failure(command: &str, error: DraftError, correlation_id: &str) -> CommandResult {
    match error {
        DraftError::Domain(error @ DomainError::AdvisorNotFound { .. }) => {
            CommandResult::application_failure(
                command,
                "advisor_not_found",
                error,
                correlation_id,
                EXIT_ADVISOR_NOT_FOUND,
            )
        }
        DraftError::Domain(error) => CommandResult::application_failure(
            command,
            "draft_invalid",
            error,
            correlation_id,
            EXIT_DRAFT,
        ),
        other => CommandResult::failure_in_session(
            command,
            "draft_invalid",
            other.to_string(),
            Some(correlation_id),
            EXIT_DRAFT,
        ),
    }
}

pub(crate) fn runtime_failure(command: &str, error: std::io::Error) -> CommandResult {
    CommandResult::failure(
        command,
        "runtime_init",
        format!("failed to initialize async runtime: {error}"),
        EXIT_RUNTIME,
    )
}
