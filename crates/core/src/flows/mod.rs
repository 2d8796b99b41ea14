pub mod engine;
pub mod states;

pub use engine::{FlowDefinition, FlowEngine, FlowTransitionError, QuotationExportFlow};
pub use states::{ExportState, FlowContext, FlowEvent, FlowType, TransitionOutcome};
