//! Drives one export: freeze into `Exporting`, let the view settle, render,
//! rasterize and save, then optionally hand the file over to a channel.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use cotiza_core::audit::{AuditCategory, AuditEvent, AuditOutcome};
use cotiza_core::catalog::Catalog;
use cotiza_core::config::{AppConfig, BrandingConfig};
use cotiza_core::domain::quotation::Quotation;
use cotiza_core::errors::{ApplicationError, DomainError};
use cotiza_core::flows::FlowTransitionError;
use cotiza_core::handoff::{self, Channel, ChannelTarget, HandoffError};
use cotiza_core::workspace::Workspace;
use cotiza_render::{DocumentRenderer, QuotationDocument, RasterizeError, Rasterizer, RenderError};

use crate::delay::{Delay, TokioDelay};
use crate::launcher::{ChannelLauncher, LaunchError};
use crate::store::{export_filename, DocumentStore, StoreError};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Rasterize(#[from] RasterizeError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error("an export is already in progress")]
    ExportInProgress,
    #[error(transparent)]
    Domain(DomainError),
}

impl From<DomainError> for ExportError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::FlowTransition(FlowTransitionError::ExportInProgress) => {
                Self::ExportInProgress
            }
            other => Self::Domain(other),
        }
    }
}

impl From<ExportError> for ApplicationError {
    fn from(error: ExportError) -> Self {
        match error {
            ExportError::Domain(error) => Self::Domain(error),
            other => Self::Export(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExportReceipt {
    pub quotation_id: String,
    pub filename: String,
    pub location: String,
    pub format: String,
    pub size: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandoffOutcome {
    /// The file was saved and the channel target was opened.
    Opened { receipt: ExportReceipt, target: ChannelTarget },
    /// The file was saved but no target could be built; nothing was opened.
    Aborted { receipt: ExportReceipt, error: HandoffError },
}

impl HandoffOutcome {
    pub fn receipt(&self) -> &ExportReceipt {
        match self {
            Self::Opened { receipt, .. } | Self::Aborted { receipt, .. } => receipt,
        }
    }
}

pub struct ExportCoordinator {
    renderer: DocumentRenderer,
    rasterizer: Arc<dyn Rasterizer>,
    store: Arc<dyn DocumentStore>,
    launcher: Arc<dyn ChannelLauncher>,
    delay: Arc<dyn Delay>,
    branding: BrandingConfig,
    settle_delay: Duration,
    handoff_delay: Duration,
}

impl ExportCoordinator {
    pub fn new(
        config: &AppConfig,
        rasterizer: Arc<dyn Rasterizer>,
        store: Arc<dyn DocumentStore>,
        launcher: Arc<dyn ChannelLauncher>,
    ) -> Result<Self, ExportError> {
        Ok(Self {
            renderer: DocumentRenderer::embedded()?,
            rasterizer,
            store,
            launcher,
            delay: Arc::new(TokioDelay),
            branding: config.branding.clone(),
            settle_delay: config.export.settle_delay(),
            handoff_delay: config.export.handoff_delay(),
        })
    }

    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    /// Renders the quotation to HTML without touching the export state.
    pub fn render_html(
        &self,
        quotation: &Quotation,
        catalog: &Catalog,
    ) -> Result<String, ExportError> {
        let document = QuotationDocument::build(quotation, catalog, &self.branding);
        Ok(self.renderer.render(&document)?)
    }

    /// Exports the reviewed quotation. On failure the workspace goes back to
    /// `Reviewing` so the advisor can retry.
    pub async fn export(&self, workspace: &mut Workspace) -> Result<ExportReceipt, ExportError> {
        let snapshot = workspace.begin_export()?;
        info!(
            event_name = "export.started",
            correlation_id = %workspace.correlation_id(),
            quotation_id = %snapshot.id.0,
            rasterizer = self.rasterizer.name(),
            "export started"
        );

        self.delay.wait(self.settle_delay).await;

        let produced = self.produce(&snapshot, workspace.catalog()).await;
        match produced {
            Ok(receipt) => {
                workspace.complete_export()?;
                info!(
                    event_name = "export.file_saved",
                    correlation_id = %workspace.correlation_id(),
                    quotation_id = %receipt.quotation_id,
                    location = %receipt.location,
                    size = receipt.size,
                    "quotation exported"
                );
                workspace.emit(
                    AuditEvent::new(
                        &workspace.audit_context(),
                        "export.file_saved",
                        AuditCategory::Export,
                        AuditOutcome::Success,
                    )
                    .with_metadata("filename", receipt.filename.clone())
                    .with_metadata("format", receipt.format.clone()),
                );
                Ok(receipt)
            }
            Err(error) => {
                warn!(
                    event_name = "export.failed",
                    correlation_id = %workspace.correlation_id(),
                    quotation_id = %snapshot.id.0,
                    error = %error,
                    "export failed, returning to review"
                );
                workspace.fail_export()?;
                workspace.emit(
                    AuditEvent::new(
                        &workspace.audit_context(),
                        "export.failed",
                        AuditCategory::Export,
                        AuditOutcome::Failed,
                    )
                    .with_metadata("error", error.to_string()),
                );
                Err(error)
            }
        }
    }

    /// Exports, waits for the hand-off delay, then opens the channel target.
    /// A client without phone digits aborts the messaging hand-off after the
    /// file has been saved.
    pub async fn export_and_handoff(
        &self,
        workspace: &mut Workspace,
        channel: Channel,
    ) -> Result<HandoffOutcome, ExportError> {
        let receipt = self.export(workspace).await?;
        self.delay.wait(self.handoff_delay).await;

        let quotation = workspace.quotation().ok_or(DomainError::NoAdvisor)?;
        match handoff::target_for(channel, quotation, &self.branding.company_name) {
            Ok(target) => {
                self.launcher.open(&target)?;
                info!(
                    event_name = "handoff.channel_opened",
                    correlation_id = %workspace.correlation_id(),
                    quotation_id = %receipt.quotation_id,
                    channel = %channel,
                    "hand-off target opened"
                );
                workspace.emit(
                    AuditEvent::new(
                        &workspace.audit_context(),
                        "handoff.channel_opened",
                        AuditCategory::Handoff,
                        AuditOutcome::Success,
                    )
                    .with_metadata("channel", channel.to_string()),
                );
                Ok(HandoffOutcome::Opened { receipt, target })
            }
            Err(error) => {
                warn!(
                    event_name = "handoff.channel_rejected",
                    correlation_id = %workspace.correlation_id(),
                    quotation_id = %receipt.quotation_id,
                    channel = %channel,
                    error = %error,
                    "hand-off aborted"
                );
                workspace.emit(
                    AuditEvent::new(
                        &workspace.audit_context(),
                        "handoff.channel_rejected",
                        AuditCategory::Handoff,
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("channel", channel.to_string())
                    .with_metadata("error", error.to_string()),
                );
                Ok(HandoffOutcome::Aborted { receipt, error })
            }
        }
    }

    async fn produce(
        &self,
        snapshot: &Quotation,
        catalog: &Catalog,
    ) -> Result<ExportReceipt, ExportError> {
        let html = self.render_html(snapshot, catalog)?;
        let file = self.rasterizer.rasterize(&html).await?;
        let filename = export_filename(&snapshot.client.name, file.extension());
        let stored = self.store.save(file.as_bytes(), &filename).await?;

        Ok(ExportReceipt {
            quotation_id: snapshot.id.0.clone(),
            filename: stored.filename,
            location: stored.location,
            format: file.extension().to_owned(),
            size: stored.size,
        })
    }
}
