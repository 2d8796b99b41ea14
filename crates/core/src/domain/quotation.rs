use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::advisor::Advisor;
use crate::domain::client::Client;
use crate::domain::coverage::CoverageSelections;
use crate::domain::money::amount;
use crate::domain::policy::{PolicyCategory, PolicySelection};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuotationId(pub String);

impl QuotationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationFigures {
    pub insured_sum: String,
    pub monthly_premium: String,
    pub notes: String,
}

/// Investment inputs. The monthly total is not stored here: it is derived by
/// [`Quotation::total_investment`] from the two premiums.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentData {
    pub investment_premium: String,
    pub accumulation_years: String,
    pub accumulated_value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quotation {
    pub id: QuotationId,
    pub advisor: Advisor,
    pub client: Client,
    policy: PolicySelection,
    pub figures: QuotationFigures,
    coverages: CoverageSelections,
    pub investment: InvestmentData,
    assistances: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Quotation {
    pub fn new<I, S>(advisor: Advisor, fixed_coverage_catalog: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: QuotationId::generate(),
            advisor,
            client: Client::default(),
            policy: PolicySelection::default(),
            figures: QuotationFigures::default(),
            coverages: CoverageSelections::from_catalog(fixed_coverage_catalog),
            investment: InvestmentData::default(),
            assistances: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn policy(&self) -> &PolicySelection {
        &self.policy
    }

    pub fn set_category(&mut self, category: Option<PolicyCategory>) {
        self.policy.set_category(category);
    }

    pub fn set_policy_type(&mut self, policy_type: impl Into<String>) {
        self.policy.set_policy_type(policy_type);
    }

    pub fn set_monthly_premium(&mut self, value: impl Into<String>) {
        self.figures.monthly_premium = value.into();
    }

    pub fn set_investment_premium(&mut self, value: impl Into<String>) {
        self.investment.investment_premium = value.into();
    }

    /// Monthly protection premium plus monthly investment premium.
    pub fn total_investment(&self) -> u64 {
        amount(&self.figures.monthly_premium)
            .saturating_add(amount(&self.investment.investment_premium))
    }

    pub fn coverages(&self) -> &CoverageSelections {
        &self.coverages
    }

    pub fn coverages_mut(&mut self) -> &mut CoverageSelections {
        &mut self.coverages
    }

    pub fn assistances(&self) -> &[String] {
        &self.assistances
    }

    pub fn has_assistance(&self, name: &str) -> bool {
        self.assistances.iter().any(|selected| selected == name)
    }

    /// Flips membership of `name` and returns whether it is now selected.
    pub fn toggle_assistance(&mut self, name: &str) -> bool {
        if let Some(position) = self.assistances.iter().position(|selected| selected == name) {
            self.assistances.remove(position);
            false
        } else {
            self.assistances.push(name.to_owned());
            true
        }
    }

    /// Selected assistances ordered as they appear in `catalog`.
    pub fn assistances_in_catalog_order<'a>(&self, catalog: &'a [String]) -> Vec<&'a str> {
        catalog
            .iter()
            .filter(|name| self.has_assistance(name))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::advisor::{Advisor, AdvisorCode};
    use crate::domain::policy::PolicyCategory;

    use super::Quotation;

    fn quotation() -> Quotation {
        Quotation::new(
            Advisor {
                code: AdvisorCode("A-001".to_owned()),
                name: "Laura Gómez".to_owned(),
                title: "Consultora".to_owned(),
                email: "laura@example.com".to_owned(),
                phone: "3001112233".to_owned(),
                photo: "laura.png".to_owned(),
            },
            ["Muerte por cualquier causa", "Enfermedades graves"],
        )
    }

    #[test]
    fn total_investment_is_commutative_over_update_order() {
        let pairs = [("120000", "80000"), ("", "5000"), ("abc", "70"), ("0", "0")];
        for (premium, investment) in pairs {
            let mut first = quotation();
            first.set_monthly_premium(premium);
            first.set_investment_premium(investment);

            let mut second = quotation();
            second.set_investment_premium(investment);
            second.set_monthly_premium(premium);

            assert_eq!(first.total_investment(), second.total_investment());
        }
    }

    #[test]
    fn total_investment_tracks_later_edits() {
        let mut quotation = quotation();
        quotation.set_monthly_premium("100000");
        quotation.set_investment_premium("50000");
        assert_eq!(quotation.total_investment(), 150_000);

        quotation.figures.monthly_premium = "no".to_owned();
        assert_eq!(quotation.total_investment(), 50_000);
    }

    #[test]
    fn assistances_toggle_and_follow_catalog_order() {
        let catalog = vec!["Conductor elegido".to_owned(), "Asistencia escolar".to_owned()];
        let mut quotation = quotation();

        assert!(quotation.toggle_assistance("Asistencia escolar"));
        assert!(quotation.toggle_assistance("Conductor elegido"));
        assert_eq!(
            quotation.assistances_in_catalog_order(&catalog),
            vec!["Conductor elegido", "Asistencia escolar"]
        );

        assert!(!quotation.toggle_assistance("Conductor elegido"));
        assert_eq!(quotation.assistances(), ["Asistencia escolar".to_owned()]);
    }

    #[test]
    fn category_change_resets_policy_type() {
        let mut quotation = quotation();
        quotation.set_category(Some(PolicyCategory::ProtectionPlan));
        quotation.set_policy_type("Ecosistema");
        quotation.set_category(Some(PolicyCategory::Life));
        assert_eq!(quotation.policy().policy_type(), "");
    }
}
