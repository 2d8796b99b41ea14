use thiserror::Error;

use crate::completeness::INCOMPLETE_REASON;
use crate::domain::policy::PolicyCategory;
use crate::flows::{ExportState, FlowTransitionError};
use crate::handoff::HandoffError;

pub const ADVISOR_NOT_FOUND_MESSAGE: &str = "Código incorrecto. Intenta de nuevo.";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("no advisor matches code `{code}`")]
    AdvisorNotFound { code: String },
    #[error("no advisor is signed in")]
    NoAdvisor,
    #[error("advisor `{code}` is already signed in; sign out first")]
    AdvisorAlreadySignedIn { code: String },
    #[error("quotation is incomplete: {missing:?}")]
    IncompletePolicy { missing: Vec<String> },
    #[error("quotation is read-only while {state:?}")]
    QuotationFrozen { state: ExportState },
    #[error("a policy category must be chosen before a policy type")]
    PolicyCategoryUnset,
    #[error("`{policy_type}` is not a {category} policy type")]
    UnknownPolicyType { category: PolicyCategory, policy_type: String },
    #[error("`{0}` is not a fixed coverage")]
    UnknownCoverage(String),
    #[error("`{0}` is not an assistance")]
    UnknownAssistance(String),
    #[error(transparent)]
    FlowTransition(#[from] FlowTransitionError),
}

impl DomainError {
    /// Message suitable for showing to the advisor next to the form.
    pub fn user_message(&self) -> String {
        match self {
            Self::AdvisorNotFound { .. } => ADVISOR_NOT_FOUND_MESSAGE.to_owned(),
            Self::IncompletePolicy { .. } => INCOMPLETE_REASON.to_owned(),
            other => other.to_string(),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Handoff(#[from] HandoffError),
    #[error("export failure: {0}")]
    Export(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. }
            | Self::ServiceUnavailable { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::ServiceUnavailable { .. } => {
                "The document could not be produced right now. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(error) => Self::BadRequest {
                message: error.user_message(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Handoff(error) => Self::BadRequest {
                message: error.user_message().to_owned(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Export(message) => {
                Self::ServiceUnavailable { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, DomainError, InterfaceError, ADVISOR_NOT_FOUND_MESSAGE};
    use crate::handoff::HandoffError;

    #[test]
    fn advisor_not_found_maps_to_retry_message() {
        let interface =
            ApplicationError::from(DomainError::AdvisorNotFound { code: "999".to_owned() })
                .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest { ref message, ref correlation_id }
                if correlation_id == "req-1" && message == ADVISOR_NOT_FOUND_MESSAGE
        ));
    }

    #[test]
    fn accessors_expose_message_and_correlation_id() {
        let interface = ApplicationError::from(DomainError::AdvisorAlreadySignedIn {
            code: "1001".to_owned(),
        })
        .into_interface("req-6");

        assert_eq!(interface.correlation_id(), "req-6");
        assert!(interface.message().contains("1001"));
    }

    #[test]
    fn bad_request_has_user_safe_message() {
        let interface = ApplicationError::from(DomainError::IncompletePolicy {
            missing: vec!["client_name".to_owned()],
        })
        .into_interface("req-2");

        assert_eq!(
            interface.user_message(),
            "The request could not be processed. Check inputs and try again."
        );
    }

    #[test]
    fn missing_phone_is_a_bad_request() {
        let interface =
            ApplicationError::from(HandoffError::NoPhoneNumber).into_interface("req-3");
        assert!(matches!(
            interface,
            InterfaceError::BadRequest { ref message, .. } if message.contains("celular")
        ));
    }

    #[test]
    fn export_error_maps_to_service_unavailable() {
        let interface =
            ApplicationError::Export("wkhtmltopdf exited with 1".to_owned()).into_interface("req-4");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
    }

    #[test]
    fn configuration_error_maps_to_internal() {
        let interface =
            ApplicationError::Configuration("bad delay".to_owned()).into_interface("req-5");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }
}
