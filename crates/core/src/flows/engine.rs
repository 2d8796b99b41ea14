use thiserror::Error;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::flows::states::{ExportState, FlowContext, FlowEvent, FlowType, TransitionOutcome};

pub trait FlowDefinition {
    fn flow_type(&self) -> FlowType;
    fn initial_state(&self) -> ExportState;
    fn transition(
        &self,
        current: &ExportState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError>;
}

#[derive(Clone, Debug, Default)]
pub struct QuotationExportFlow;

impl FlowDefinition for QuotationExportFlow {
    fn flow_type(&self) -> FlowType {
        FlowType::QuotationExport
    }

    fn initial_state(&self) -> ExportState {
        ExportState::Editing
    }

    fn transition(
        &self,
        current: &ExportState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        transition_export(current, event, context)
    }
}

#[derive(Clone, Debug)]
pub struct FlowEngine<F> {
    flow: F,
}

impl<F> FlowEngine<F>
where
    F: FlowDefinition,
{
    pub fn new(flow: F) -> Self {
        Self { flow }
    }

    pub fn flow_type(&self) -> FlowType {
        self.flow.flow_type()
    }

    pub fn initial_state(&self) -> ExportState {
        self.flow.initial_state()
    }

    pub fn apply(
        &self,
        current: &ExportState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        self.flow.transition(current, event, context)
    }

    pub fn apply_with_audit<S>(
        &self,
        current: &ExportState,
        event: &FlowEvent,
        context: &FlowContext,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<TransitionOutcome, FlowTransitionError>
    where
        S: AuditSink + ?Sized,
    {
        let result = self.apply(current, event, context);
        match &result {
            Ok(outcome) => {
                sink.emit(
                    AuditEvent::new(
                        audit,
                        "flow.transition_applied",
                        AuditCategory::Flow,
                        AuditOutcome::Success,
                    )
                    .with_metadata("from", format!("{:?}", outcome.from))
                    .with_metadata("to", format!("{:?}", outcome.to))
                    .with_metadata("event", format!("{:?}", outcome.event)),
                );
            }
            Err(error) => {
                sink.emit(
                    AuditEvent::new(
                        audit,
                        "flow.transition_rejected",
                        AuditCategory::Flow,
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("error", error.to_string()),
                );
            }
        }
        result
    }
}

impl Default for FlowEngine<QuotationExportFlow> {
    fn default() -> Self {
        Self::new(QuotationExportFlow)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("missing required fields before transition from {state:?}: {missing_fields:?}")]
    MissingRequiredFields { state: ExportState, missing_fields: Vec<String> },
    #[error("an export is already in progress")]
    ExportInProgress,
    #[error("invalid transition from {state:?} using event {event:?}")]
    InvalidTransition { state: ExportState, event: FlowEvent },
}

fn transition_export(
    current: &ExportState,
    event: &FlowEvent,
    context: &FlowContext,
) -> Result<TransitionOutcome, FlowTransitionError> {
    use ExportState::{Editing, Exported, Exporting, Reviewing};
    use FlowEvent::{EditRequested, ExportCompleted, ExportFailed, ExportStarted, GenerateRequested};

    let to = match (current, event) {
        (Editing, GenerateRequested) => {
            if !context.missing_required_fields.is_empty() {
                return Err(FlowTransitionError::MissingRequiredFields {
                    state: *current,
                    missing_fields: context.missing_required_fields.clone(),
                });
            }
            Reviewing
        }
        (Reviewing, ExportStarted) | (Exported, ExportStarted) => Exporting,
        (Exporting, ExportStarted) => return Err(FlowTransitionError::ExportInProgress),
        (Exporting, ExportCompleted) => Exported,
        (Exporting, ExportFailed) => Reviewing,
        (Reviewing, EditRequested) | (Exported, EditRequested) => Editing,
        _ => {
            return Err(FlowTransitionError::InvalidTransition {
                state: *current,
                event: event.clone(),
            });
        }
    };

    Ok(TransitionOutcome { from: *current, to, event: event.clone() })
}
