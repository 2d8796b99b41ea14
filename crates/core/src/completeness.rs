use serde::{Deserialize, Serialize};

use crate::domain::money::{is_filled, is_positive_amount};
use crate::domain::quotation::Quotation;

pub const INCOMPLETE_REASON: &str =
    "Completa todos los datos y agrega al menos una cobertura y los datos de inversión.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    ClientName,
    PolicyType,
    MonthlyPremium,
    Coverage,
    InvestmentPremium,
    TotalInvestment,
    AccumulationYears,
    AccumulatedValue,
}

impl Requirement {
    pub fn key(self) -> &'static str {
        match self {
            Self::ClientName => "client_name",
            Self::PolicyType => "policy_type",
            Self::MonthlyPremium => "monthly_premium",
            Self::Coverage => "coverage",
            Self::InvestmentPremium => "investment_premium",
            Self::TotalInvestment => "total_investment",
            Self::AccumulationYears => "accumulation_years",
            Self::AccumulatedValue => "accumulated_value",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessReport {
    pub complete: bool,
    pub missing: Vec<Requirement>,
}

impl CompletenessReport {
    /// Generic message shown next to the disabled generate action.
    pub fn reason(&self) -> Option<&'static str> {
        (!self.complete).then_some(INCOMPLETE_REASON)
    }

    pub fn missing_keys(&self) -> Vec<String> {
        self.missing.iter().map(|requirement| requirement.key().to_owned()).collect()
    }
}

/// Gate for generating the quotation document.
pub fn is_complete(quotation: &Quotation) -> bool {
    evaluate(quotation).complete
}

pub fn evaluate(quotation: &Quotation) -> CompletenessReport {
    let checks = [
        (Requirement::ClientName, is_filled(&quotation.client.name)),
        (Requirement::PolicyType, is_filled(quotation.policy().policy_type())),
        (Requirement::MonthlyPremium, is_positive_amount(&quotation.figures.monthly_premium)),
        (Requirement::Coverage, quotation.coverages().has_any_selection()),
        (Requirement::InvestmentPremium, is_filled(&quotation.investment.investment_premium)),
        (Requirement::TotalInvestment, quotation.total_investment() > 0),
        (Requirement::AccumulationYears, is_filled(&quotation.investment.accumulation_years)),
        (Requirement::AccumulatedValue, is_filled(&quotation.investment.accumulated_value)),
    ];

    let missing: Vec<Requirement> = checks
        .into_iter()
        .filter_map(|(requirement, satisfied)| (!satisfied).then_some(requirement))
        .collect();

    CompletenessReport { complete: missing.is_empty(), missing }
}

#[cfg(test)]
mod tests {
    use crate::catalog::Catalog;
    use crate::domain::policy::PolicyCategory;
    use crate::domain::quotation::Quotation;

    use super::{evaluate, is_complete, Requirement, INCOMPLETE_REASON};

    fn complete_quotation() -> Quotation {
        let catalog = Catalog::builtin();
        let advisor = catalog.lookup_advisor("1001").expect("demo advisor");
        let mut quotation = Quotation::new(advisor, catalog.fixed_coverage_catalog().to_vec());
        quotation.client.name = "Carlos Pérez".to_owned();
        quotation.set_category(Some(PolicyCategory::Life));
        quotation.set_policy_type("Vida 60");
        quotation.set_monthly_premium("150000");
        quotation.coverages_mut().set_fixed_value("Muerte por cualquier causa", "100000000");
        quotation.set_investment_premium("50000");
        quotation.investment.accumulation_years = "10".to_owned();
        quotation.investment.accumulated_value = "9000000".to_owned();
        quotation
    }

    #[test]
    fn satisfied_quotation_is_complete() {
        let report = evaluate(&complete_quotation());
        assert!(report.complete);
        assert!(report.missing.is_empty());
        assert_eq!(report.reason(), None);
    }

    #[test]
    fn each_requirement_blocks_independently() {
        type Clear = fn(&mut Quotation);
        let cases: [(Requirement, Clear); 7] = [
            (Requirement::ClientName, |q| q.client.name.clear()),
            (Requirement::PolicyType, |q| q.set_policy_type("")),
            (Requirement::MonthlyPremium, |q| q.set_monthly_premium("0")),
            (Requirement::Coverage, |q| {
                q.coverages_mut().set_fixed_value("Muerte por cualquier causa", "");
            }),
            (Requirement::InvestmentPremium, |q| q.set_investment_premium("")),
            (Requirement::AccumulationYears, |q| q.investment.accumulation_years.clear()),
            (Requirement::AccumulatedValue, |q| q.investment.accumulated_value = " ".to_owned()),
        ];

        for (requirement, clear) in cases {
            let mut quotation = complete_quotation();
            clear(&mut quotation);
            let report = evaluate(&quotation);
            assert!(!report.complete, "{requirement:?} should block completeness");
            assert!(report.missing.contains(&requirement), "{requirement:?} should be reported");
            assert_eq!(report.reason(), Some(INCOMPLETE_REASON));
        }
    }

    #[test]
    fn zero_total_investment_blocks() {
        let mut quotation = complete_quotation();
        quotation.set_monthly_premium("abc");
        quotation.set_investment_premium("0");
        let report = evaluate(&quotation);
        assert!(report.missing.contains(&Requirement::TotalInvestment));
        assert!(report.missing.contains(&Requirement::MonthlyPremium));
    }

    #[test]
    fn dynamic_coverage_alone_satisfies_coverage_requirement() {
        let mut quotation = complete_quotation();
        quotation.coverages_mut().set_fixed_value("Muerte por cualquier causa", "0");
        assert!(!is_complete(&quotation));

        quotation.coverages_mut().add_dynamic("Beca educativa", "");
        assert!(is_complete(&quotation));
    }

    #[test]
    fn empty_quotation_reports_every_requirement() {
        let catalog = Catalog::builtin();
        let advisor = catalog.lookup_advisor("1002").expect("demo advisor");
        let report = evaluate(&Quotation::new(advisor, catalog.fixed_coverage_catalog().to_vec()));
        assert_eq!(report.missing.len(), 8);
        assert_eq!(report.missing_keys()[0], "client_name");
    }
}
