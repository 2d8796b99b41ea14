//! One advisor session: the advisor-lookup gate, the quotation being edited and
//! the view state that decides whether it may still change.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink, NoopAuditSink};
use crate::catalog::Catalog;
use crate::completeness::{self, CompletenessReport};
use crate::domain::advisor::Advisor;
use crate::domain::policy::PolicyCategory;
use crate::domain::quotation::Quotation;
use crate::errors::DomainError;
use crate::flows::{
    ExportState, FlowContext, FlowEngine, FlowEvent, FlowTransitionError, QuotationExportFlow,
    TransitionOutcome,
};

pub struct Workspace {
    catalog: Arc<Catalog>,
    engine: FlowEngine<QuotationExportFlow>,
    audit: Arc<dyn AuditSink>,
    correlation_id: String,
    quotation: Option<Quotation>,
    state: ExportState,
}

impl Workspace {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let engine = FlowEngine::default();
        let state = engine.initial_state();
        Self {
            catalog,
            engine,
            audit: Arc::new(NoopAuditSink),
            correlation_id: Uuid::new_v4().to_string(),
            quotation: None,
            state,
        }
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = sink;
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = correlation_id.into();
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> ExportState {
        self.state
    }

    pub fn advisor(&self) -> Option<&Advisor> {
        self.quotation.as_ref().map(|quotation| &quotation.advisor)
    }

    pub fn quotation(&self) -> Option<&Quotation> {
        self.quotation.as_ref()
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn emit(&self, event: AuditEvent) {
        self.audit.emit(event);
    }

    pub fn audit_context(&self) -> AuditContext {
        AuditContext::new(
            self.quotation.as_ref().map(|quotation| quotation.id.clone()),
            self.correlation_id.clone(),
            self.advisor().map(|advisor| advisor.code.0.clone()).unwrap_or_default(),
        )
    }

    /// Looks the advisor up by code and opens an empty quotation for them. A
    /// failed lookup leaves the workspace at the lookup step with no quotation.
    /// The matched advisor stays fixed until `sign_out`.
    pub fn sign_in(&mut self, code: &str) -> Result<&Advisor, DomainError> {
        if let Some(current) = self.advisor() {
            let error = DomainError::AdvisorAlreadySignedIn { code: current.code.0.clone() };
            self.audit.emit(
                AuditEvent::new(
                    &self.audit_context(),
                    "session.sign_in_rejected",
                    AuditCategory::Session,
                    AuditOutcome::Rejected,
                )
                .with_metadata("code", code.trim()),
            );
            return Err(error);
        }

        match self.catalog.lookup_advisor(code) {
            Ok(advisor) => {
                let quotation = Quotation::new(advisor, self.catalog.fixed_coverage_catalog().to_vec());
                info!(
                    event_name = "session.advisor_signed_in",
                    correlation_id = %self.correlation_id,
                    quotation_id = %quotation.id.0,
                    advisor_code = %quotation.advisor.code.0,
                    "advisor signed in"
                );
                self.state = self.engine.initial_state();
                let quotation = self.quotation.insert(quotation);
                Ok(&quotation.advisor)
            }
            Err(error) => {
                warn!(
                    event_name = "session.advisor_lookup_failed",
                    correlation_id = %self.correlation_id,
                    "advisor code did not match the directory"
                );
                self.audit.emit(
                    AuditEvent::new(
                        &self.audit_context(),
                        "session.advisor_lookup_failed",
                        AuditCategory::Session,
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("code", code.trim()),
                );
                Err(error)
            }
        }
    }

    /// Clears the advisor identity and wipes all quotation data.
    pub fn sign_out(&mut self) {
        if let Some(quotation) = &self.quotation {
            info!(
                event_name = "session.advisor_signed_out",
                correlation_id = %self.correlation_id,
                quotation_id = %quotation.id.0,
                "quotation discarded"
            );
        }
        self.discard();
    }

    fn discard(&mut self) {
        self.quotation = None;
        self.state = self.engine.initial_state();
    }

    /// Runs `apply` against the quotation while it is editable.
    pub fn edit<F, R>(&mut self, apply: F) -> Result<R, DomainError>
    where
        F: FnOnce(&mut Quotation) -> R,
    {
        if self.state.is_frozen() {
            return Err(DomainError::QuotationFrozen { state: self.state });
        }
        let quotation = self.quotation.as_mut().ok_or(DomainError::NoAdvisor)?;
        Ok(apply(quotation))
    }

    pub fn set_category(&mut self, category: Option<PolicyCategory>) -> Result<(), DomainError> {
        self.edit(|quotation| quotation.set_category(category))
    }

    /// Picks a policy type from the allowed set of the current category.
    pub fn choose_policy_type(&mut self, policy_type: &str) -> Result<(), DomainError> {
        let category = self
            .quotation
            .as_ref()
            .ok_or(DomainError::NoAdvisor)?
            .policy()
            .category()
            .ok_or(DomainError::PolicyCategoryUnset)?;
        let allowed = self.catalog.policy_types_for(Some(category));
        if !policy_type.is_empty() && !allowed.iter().any(|name| name == policy_type) {
            return Err(DomainError::UnknownPolicyType {
                category,
                policy_type: policy_type.to_owned(),
            });
        }
        self.edit(|quotation| quotation.set_policy_type(policy_type))
    }

    pub fn set_fixed_coverage(&mut self, name: &str, value: &str) -> Result<(), DomainError> {
        let stored = self.edit(|quotation| quotation.coverages_mut().set_fixed_value(name, value))?;
        if stored {
            Ok(())
        } else {
            Err(DomainError::UnknownCoverage(name.to_owned()))
        }
    }

    /// Toggles an assistance from the catalog and returns its new membership.
    pub fn toggle_assistance(&mut self, name: &str) -> Result<bool, DomainError> {
        if !self.catalog.assistance_catalog().iter().any(|known| known == name) {
            return Err(DomainError::UnknownAssistance(name.to_owned()));
        }
        self.edit(|quotation| quotation.toggle_assistance(name))
    }

    pub fn completeness(&self) -> Option<CompletenessReport> {
        self.quotation.as_ref().map(completeness::evaluate)
    }

    /// Moves to the read-only review view when the quotation is complete. An
    /// incomplete quotation leaves the state untouched.
    pub fn request_review(&mut self) -> Result<TransitionOutcome, DomainError> {
        self.transition(FlowEvent::GenerateRequested)
    }

    /// Returns to editing; no data is discarded.
    pub fn return_to_editing(&mut self) -> Result<TransitionOutcome, DomainError> {
        self.transition(FlowEvent::EditRequested)
    }

    /// Enters `Exporting` and hands back the snapshot to render.
    pub fn begin_export(&mut self) -> Result<Quotation, DomainError> {
        self.transition(FlowEvent::ExportStarted)?;
        self.quotation.clone().ok_or(DomainError::NoAdvisor)
    }

    pub fn complete_export(&mut self) -> Result<TransitionOutcome, DomainError> {
        self.transition(FlowEvent::ExportCompleted)
    }

    pub fn fail_export(&mut self) -> Result<TransitionOutcome, DomainError> {
        self.transition(FlowEvent::ExportFailed)
    }

    fn transition(&mut self, event: FlowEvent) -> Result<TransitionOutcome, DomainError> {
        let quotation = self.quotation.as_ref().ok_or(DomainError::NoAdvisor)?;
        let context = match event {
            FlowEvent::GenerateRequested => FlowContext {
                missing_required_fields: completeness::evaluate(quotation).missing_keys(),
            },
            _ => FlowContext::default(),
        };

        let outcome = self
            .engine
            .apply_with_audit(&self.state, &event, &context, self.audit.as_ref(), &self.audit_context())
            .map_err(|error| match error {
                FlowTransitionError::MissingRequiredFields { missing_fields, .. } => {
                    DomainError::IncompletePolicy { missing: missing_fields }
                }
                other => DomainError::FlowTransition(other),
            })?;

        info!(
            event_name = "flow.transition_applied",
            correlation_id = %self.correlation_id,
            quotation_id = %quotation.id.0,
            from = ?outcome.from,
            to = ?outcome.to,
            "quotation view changed"
        );
        self.state = outcome.to;
        Ok(outcome)
    }
}
