//! Quotation draft files: the edits an advisor would make in the form,
//! written down as TOML or JSON and replayed through the workspace setters.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use cotiza_core::domain::client::{Gender, UnknownGender};
use cotiza_core::domain::policy::{PolicyCategory, UnknownCategory};
use cotiza_core::errors::DomainError;
use cotiza_core::workspace::Workspace;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("could not read draft `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not parse draft `{path}`: {source}")]
    ParseToml { path: PathBuf, source: toml::de::Error },
    #[error("could not parse draft `{path}`: {source}")]
    ParseJson { path: PathBuf, source: serde_json::Error },
    #[error(transparent)]
    Gender(#[from] UnknownGender),
    #[error(transparent)]
    Category(#[from] UnknownCategory),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct QuotationDraft {
    pub advisor_code: String,
    pub client: ClientDraft,
    pub policy: PolicyDraft,
    pub figures: FiguresDraft,
    pub investment: InvestmentDraft,
    pub coverages: CoveragesDraft,
    pub assistances: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClientDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: String,
    pub gender: String,
    pub city: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PolicyDraft {
    pub category: String,
    pub policy_type: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FiguresDraft {
    pub insured_sum: String,
    pub monthly_premium: String,
    pub notes: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct InvestmentDraft {
    pub investment_premium: String,
    pub accumulation_years: String,
    pub accumulated_value: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CoveragesDraft {
    pub fixed: Vec<CoverageDraft>,
    pub dynamic: Vec<CoverageDraft>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CoverageDraft {
    pub name: String,
    pub value: String,
}

impl QuotationDraft {
    /// JSON when the extension is `.json`, TOML otherwise.
    pub fn load(path: &Path) -> Result<Self, DraftError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| DraftError::Read { path: path.to_path_buf(), source })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&raw)
                .map_err(|source| DraftError::ParseJson { path: path.to_path_buf(), source })
        } else {
            toml::from_str(&raw)
                .map_err(|source| DraftError::ParseToml { path: path.to_path_buf(), source })
        }
    }

    /// Signs the advisor in and replays every field in form order.
    pub fn apply(&self, workspace: &mut Workspace) -> Result<(), DraftError> {
        workspace.sign_in(&self.advisor_code)?;

        let gender = match self.client.gender.trim() {
            "" => None,
            raw => Some(raw.parse::<Gender>()?),
        };
        let category = match self.policy.category.trim() {
            "" => None,
            raw => Some(raw.parse::<PolicyCategory>()?),
        };

        workspace.edit(|quotation| {
            let client = &mut quotation.client;
            client.name = self.client.name.clone();
            client.email = self.client.email.clone();
            client.phone = self.client.phone.clone();
            client.age = self.client.age.clone();
            client.gender = gender;
            client.city = self.client.city.clone();
        })?;

        workspace.set_category(category)?;
        if category.is_some() || !self.policy.policy_type.trim().is_empty() {
            workspace.choose_policy_type(&self.policy.policy_type)?;
        }

        for coverage in &self.coverages.fixed {
            workspace.set_fixed_coverage(&coverage.name, &coverage.value)?;
        }

        workspace.edit(|quotation| {
            quotation.figures.insured_sum = self.figures.insured_sum.clone();
            quotation.set_monthly_premium(self.figures.monthly_premium.clone());
            quotation.figures.notes = self.figures.notes.clone();
            quotation.set_investment_premium(self.investment.investment_premium.clone());
            quotation.investment.accumulation_years = self.investment.accumulation_years.clone();
            quotation.investment.accumulated_value = self.investment.accumulated_value.clone();
            for coverage in &self.coverages.dynamic {
                quotation.coverages_mut().add_dynamic(coverage.name.clone(), coverage.value.clone());
            }
        })?;

        for assistance in &self.assistances {
            if !workspace.quotation().is_some_and(|quotation| quotation.has_assistance(assistance)) {
                workspace.toggle_assistance(assistance)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use cotiza_core::catalog::Catalog;
    use cotiza_core::domain::client::Gender;
    use cotiza_core::errors::DomainError;
    use cotiza_core::workspace::Workspace;
    use tempfile::TempDir;

    use super::{DraftError, QuotationDraft};

    const TOML_DRAFT: &str = r#"
advisor_code = "1001"
assistances = ["Conductor elegido", "Conductor elegido", "Asistencia médica"]

[client]
name = "Carlos Pérez"
phone = "+57 300 123 4567"
gender = "masculino"

[policy]
category = "PLAN_PROTECCION"
policy_type = "Ecosistema"

[figures]
monthly_premium = "180000"

[investment]
investment_premium = "70000"
accumulation_years = "15"
accumulated_value = "32000000"

[[coverages.fixed]]
name = "Enfermedades graves"
value = "50000000"

[[coverages.dynamic]]
name = "Bono de maternidad"
value = "3000000"
"#;

    fn workspace() -> Workspace {
        Workspace::new(Arc::new(Catalog::builtin()))
    }

    #[test]
    fn toml_draft_replays_into_complete_quotation() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("draft.toml");
        fs::write(&path, TOML_DRAFT).expect("write draft");

        let mut workspace = workspace();
        QuotationDraft::load(&path).expect("parse").apply(&mut workspace).expect("apply");

        let quotation = workspace.quotation().expect("signed in");
        assert_eq!(quotation.client.gender, Some(Gender::Male));
        assert_eq!(quotation.total_investment(), 250_000);
        assert_eq!(quotation.coverages().selected().len(), 2);
        assert_eq!(quotation.assistances().len(), 2);
        assert!(workspace.completeness().is_some_and(|report| report.complete));
    }

    #[test]
    fn json_draft_is_accepted() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("draft.json");
        fs::write(&path, r#"{"advisor_code": "1002", "client": {"name": "Ana"}}"#)
            .expect("write draft");

        let mut workspace = workspace();
        QuotationDraft::load(&path).expect("parse").apply(&mut workspace).expect("apply");

        assert_eq!(workspace.advisor().map(|advisor| advisor.code.0.as_str()), Some("1002"));
        assert!(workspace.completeness().is_some_and(|report| !report.complete));
    }

    #[test]
    fn unknown_advisor_code_is_reported() {
        let draft = QuotationDraft { advisor_code: "9999".to_owned(), ..QuotationDraft::default() };
        let error = draft.apply(&mut workspace()).expect_err("unknown advisor");
        assert!(matches!(error, DraftError::Domain(DomainError::AdvisorNotFound { .. })));
    }

    #[test]
    fn policy_type_outside_category_is_rejected() {
        let mut draft =
            QuotationDraft { advisor_code: "1001".to_owned(), ..QuotationDraft::default() };
        draft.policy.category = "VIDA".to_owned();
        draft.policy.policy_type = "Ecosistema".to_owned();

        let error = draft.apply(&mut workspace()).expect_err("wrong category");
        assert!(matches!(error, DraftError::Domain(DomainError::UnknownPolicyType { .. })));
    }

    #[test]
    fn policy_type_without_category_is_rejected() {
        let mut draft =
            QuotationDraft { advisor_code: "1001".to_owned(), ..QuotationDraft::default() };
        draft.policy.policy_type = "Vida 60".to_owned();

        let error = draft.apply(&mut workspace()).expect_err("no category");
        assert!(matches!(error, DraftError::Domain(DomainError::PolicyCategoryUnset)));
    }
}
