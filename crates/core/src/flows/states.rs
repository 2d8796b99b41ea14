use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowType {
    QuotationExport,
}

/// Which view of the quotation is active and whether a document is being
/// produced from it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportState {
    #[default]
    Editing,
    Reviewing,
    Exporting,
    Exported,
}

impl ExportState {
    /// Quotation fields may only change while editing.
    pub fn is_frozen(self) -> bool {
        !matches!(self, Self::Editing)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowEvent {
    GenerateRequested,
    ExportStarted,
    ExportCompleted,
    ExportFailed,
    EditRequested,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FlowContext {
    pub missing_required_fields: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: ExportState,
    pub to: ExportState,
    pub event: FlowEvent,
}
