//! Print model of a frozen quotation: a cover page followed by one summary
//! page. Amounts are kept as whole numbers; templates format them through the
//! `currency` filter.

use serde::Serialize;

use cotiza_core::catalog::{Catalog, EcosystemBenefits, ECOSYSTEM_POLICY_TYPE};
use cotiza_core::config::BrandingConfig;
use cotiza_core::domain::advisor::Advisor;
use cotiza_core::domain::money::{amount, is_filled};
use cotiza_core::domain::policy::PolicyCategory;
use cotiza_core::domain::quotation::Quotation;

pub const PAGE_WIDTH_PX: u32 = 794;
pub const PAGE_HEIGHT_PX: u32 = 1122;
pub const MISSING_FIELD: &str = "-";
const MISSING_YEARS: &str = "___";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuotationDocument {
    pub quotation_id: String,
    pub issued_on: String,
    pub page: PageSize,
    pub branding: Branding,
    pub cover: CoverPage,
    pub summary: SummaryPage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageSize {
    pub width_px: u32,
    pub height_px: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Branding {
    pub company_name: String,
    pub primary_color: String,
    pub document_title: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CoverPage {
    pub advisor: AdvisorBlock,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AdvisorBlock {
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub photo: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SummaryPage {
    pub client: ClientBlock,
    pub policy: PolicyBlock,
    pub coverages: Vec<CoverageRow>,
    pub ecosystem: Option<EcosystemBenefits>,
    pub investment: Vec<InvestmentRow>,
    pub assistances: Vec<String>,
    pub totals: TotalsBlock,
    pub notes: Option<String>,
    pub signature: AdvisorBlock,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClientBlock {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: String,
    pub gender: String,
    pub city: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PolicyBlock {
    pub category: String,
    pub policy_type: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CoverageRow {
    pub name: String,
    pub value: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InvestmentRow {
    pub label: String,
    pub value: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TotalsBlock {
    pub insured_sum: u64,
    pub total_investment: u64,
}

impl QuotationDocument {
    pub fn build(quotation: &Quotation, catalog: &Catalog, branding: &BrandingConfig) -> Self {
        let advisor = AdvisorBlock::from(&quotation.advisor);
        Self {
            quotation_id: quotation.id.0.clone(),
            issued_on: quotation.created_at.format("%d/%m/%Y").to_string(),
            page: PageSize { width_px: PAGE_WIDTH_PX, height_px: PAGE_HEIGHT_PX },
            branding: Branding {
                company_name: branding.company_name.clone(),
                primary_color: branding.primary_color.clone(),
                document_title: branding.document_title.clone(),
            },
            cover: CoverPage { advisor: advisor.clone() },
            summary: SummaryPage {
                client: client_block(quotation),
                policy: PolicyBlock {
                    category: quotation
                        .policy()
                        .category()
                        .map(|category| category.code().to_owned())
                        .unwrap_or_else(|| MISSING_FIELD.to_owned()),
                    policy_type: or_missing(quotation.policy().policy_type()),
                },
                coverages: quotation
                    .coverages()
                    .selected()
                    .into_iter()
                    .map(|item| CoverageRow { name: item.name.clone(), value: item.amount() })
                    .collect(),
                ecosystem: includes_ecosystem(quotation)
                    .then(|| catalog.ecosystem_benefits().clone()),
                investment: investment_rows(quotation),
                assistances: quotation
                    .assistances_in_catalog_order(catalog.assistance_catalog())
                    .into_iter()
                    .map(str::to_owned)
                    .collect(),
                totals: TotalsBlock {
                    insured_sum: amount(&quotation.figures.insured_sum),
                    total_investment: quotation.total_investment(),
                },
                notes: is_filled(&quotation.figures.notes)
                    .then(|| quotation.figures.notes.clone()),
                signature: advisor,
            },
        }
    }
}

impl From<&Advisor> for AdvisorBlock {
    fn from(advisor: &Advisor) -> Self {
        Self {
            name: advisor.name.clone(),
            title: advisor.title.clone(),
            email: advisor.email.clone(),
            phone: advisor.phone.clone(),
            photo: advisor.photo.clone(),
        }
    }
}

/// The benefits block only accompanies the Ecosystem protection plan.
pub fn includes_ecosystem(quotation: &Quotation) -> bool {
    quotation.policy().is(PolicyCategory::ProtectionPlan, ECOSYSTEM_POLICY_TYPE)
}

fn client_block(quotation: &Quotation) -> ClientBlock {
    let client = &quotation.client;
    ClientBlock {
        name: or_missing(&client.name),
        email: or_missing(&client.email),
        phone: or_missing(&client.phone),
        age: or_missing(&client.age),
        gender: client
            .gender
            .map(|gender| gender.label().to_owned())
            .unwrap_or_else(|| MISSING_FIELD.to_owned()),
        city: or_missing(&client.city),
    }
}

fn investment_rows(quotation: &Quotation) -> Vec<InvestmentRow> {
    let years = quotation.investment.accumulation_years.trim();
    let years = if years.is_empty() { MISSING_YEARS } else { years };
    vec![
        InvestmentRow {
            label: "PRIMA MENSUAL DE FONDO DE INVERSIÓN".to_owned(),
            value: amount(&quotation.investment.investment_premium),
        },
        InvestmentRow {
            label: "PRIMA MENSUAL DE PROTECCIÓN".to_owned(),
            value: amount(&quotation.figures.monthly_premium),
        },
        InvestmentRow {
            label: format!("ACUMULACIÓN DE CAPITAL A LOS {years} AÑOS"),
            value: amount(&quotation.investment.accumulated_value),
        },
    ]
}

fn or_missing(value: &str) -> String {
    if value.trim().is_empty() {
        MISSING_FIELD.to_owned()
    } else {
        value.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use cotiza_core::catalog::Catalog;
    use cotiza_core::config::AppConfig;
    use cotiza_core::domain::client::Gender;
    use cotiza_core::domain::policy::PolicyCategory;
    use cotiza_core::domain::quotation::Quotation;

    use super::{QuotationDocument, MISSING_FIELD};

    fn quotation(catalog: &Catalog) -> Quotation {
        let advisor = catalog.lookup_advisor("1001").expect("demo advisor");
        let mut quotation = Quotation::new(advisor, catalog.fixed_coverage_catalog().to_vec());
        quotation.client.name = "Carlos Pérez".to_owned();
        quotation.client.gender = Some(Gender::Male);
        quotation.set_category(Some(PolicyCategory::Life));
        quotation.set_policy_type("Vida 60");
        quotation.set_monthly_premium("180000");
        quotation.set_investment_premium("70000");
        quotation.figures.insured_sum = "250000000".to_owned();
        quotation.investment.accumulated_value = "32000000".to_owned();
        quotation
    }

    #[test]
    fn summary_projects_selected_rows_and_totals() {
        let catalog = Catalog::builtin();
        let mut quotation = quotation(&catalog);
        quotation.coverages_mut().set_fixed_value("Enfermedades graves", "50000000");
        quotation.coverages_mut().add_dynamic("Gastos funerarios", "8000000");
        quotation.toggle_assistance("Conductor elegido");

        let document =
            QuotationDocument::build(&quotation, &catalog, &AppConfig::default().branding);
        let summary = &document.summary;

        let names: Vec<_> = summary.coverages.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, ["Enfermedades graves", "Gastos funerarios"]);
        assert_eq!(summary.totals.total_investment, 250_000);
        assert_eq!(summary.totals.insured_sum, 250_000_000);
        assert_eq!(summary.assistances, ["Conductor elegido"]);
        assert_eq!(summary.policy.category, "VIDA");
        assert_eq!(summary.client.gender, "Masculino");
        assert_eq!(summary.client.city, MISSING_FIELD);
        assert!(summary.ecosystem.is_none());
        assert!(summary.notes.is_none());
        assert_eq!(document.cover.advisor, summary.signature);
    }

    #[test]
    fn accumulation_row_uses_placeholder_without_years() {
        let catalog = Catalog::builtin();
        let mut quotation = quotation(&catalog);
        let branding = AppConfig::default().branding;

        let rows = QuotationDocument::build(&quotation, &catalog, &branding).summary.investment;
        assert_eq!(rows[2].label, "ACUMULACIÓN DE CAPITAL A LOS ___ AÑOS");

        quotation.investment.accumulation_years = "15".to_owned();
        let rows = QuotationDocument::build(&quotation, &catalog, &branding).summary.investment;
        assert_eq!(rows[0].value, 70_000);
        assert_eq!(rows[1].value, 180_000);
        assert_eq!(rows[2].label, "ACUMULACIÓN DE CAPITAL A LOS 15 AÑOS");
        assert_eq!(rows[2].value, 32_000_000);
    }

    #[test]
    fn ecosystem_block_requires_protection_plan_ecosystem() {
        let catalog = Catalog::builtin();
        let mut quotation = quotation(&catalog);
        let branding = AppConfig::default().branding;

        quotation.set_category(Some(PolicyCategory::ProtectionPlan));
        quotation.set_policy_type("Pensión");
        assert!(QuotationDocument::build(&quotation, &catalog, &branding).summary.ecosystem.is_none());

        quotation.set_policy_type("Ecosistema");
        let ecosystem = QuotationDocument::build(&quotation, &catalog, &branding)
            .summary
            .ecosystem
            .expect("ecosystem plan");
        assert_eq!(ecosystem.groups.len(), 3);
    }
}
