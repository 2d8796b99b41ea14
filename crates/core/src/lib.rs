pub mod audit;
pub mod catalog;
pub mod completeness;
pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod handoff;
pub mod workspace;

pub use audit::{AuditContext, AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use catalog::{BenefitGroup, Catalog, CatalogError, EcosystemBenefits, ECOSYSTEM_POLICY_TYPE};
pub use completeness::{CompletenessReport, Requirement, INCOMPLETE_REASON};
pub use domain::advisor::{Advisor, AdvisorCode};
pub use domain::client::{Client, Gender};
pub use domain::coverage::{CoverageItem, CoverageKind, CoverageSelections};
pub use domain::money::format_currency;
pub use domain::policy::{PolicyCategory, PolicySelection};
pub use domain::quotation::{InvestmentData, Quotation, QuotationFigures, QuotationId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use flows::{ExportState, FlowEngine, FlowEvent, QuotationExportFlow};
pub use handoff::{Channel, ChannelTarget, HandoffError};
pub use workspace::Workspace;
