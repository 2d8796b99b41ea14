//! HTML rendering of [`QuotationDocument`] through embedded tera templates.

use std::collections::HashMap;

use tera::{Context, Tera};
use thiserror::Error;
use tracing::debug;

use cotiza_core::domain::money::{amount, format_currency};

use crate::document::QuotationDocument;

pub const QUOTATION_TEMPLATE: &str = "quotation.html";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(String),
}

/// Register custom Tera filters used by quotation templates.
///
/// - `currency`: `$ ` plus dot-grouped thousands, e.g. `row.value | currency`
pub fn register_template_filters(tera: &mut Tera) {
    tera.register_filter("currency", tera_currency_filter);
}

/// Accepts whole numbers, floats (truncated) and strings (coerced like any
/// advisor-entered figure). Anything else renders as `$ 0`.
fn tera_currency_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let whole = match value {
        tera::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        tera::Value::String(raw) => amount(raw),
        _ => 0,
    };
    Ok(tera::Value::String(format_currency(whole)))
}

#[derive(Clone, Debug)]
pub struct DocumentRenderer {
    tera: Tera,
}

impl DocumentRenderer {
    /// Renderer over the templates compiled into the crate.
    pub fn embedded() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        register_template_filters(&mut tera);
        tera.add_raw_template(QUOTATION_TEMPLATE, include_str!("../templates/quotation.html"))
            .map_err(|e| RenderError::Template(e.to_string()))?;
        Ok(Self { tera })
    }

    pub fn render(&self, document: &QuotationDocument) -> Result<String, RenderError> {
        let context =
            Context::from_serialize(document).map_err(|e| RenderError::Template(e.to_string()))?;
        let html = self
            .tera
            .render(QUOTATION_TEMPLATE, &context)
            .map_err(|e| RenderError::Template(e.to_string()))?;
        debug!(
            event_name = "render.html_rendered",
            quotation_id = %document.quotation_id,
            size = html.len(),
            "quotation rendered to html"
        );
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use cotiza_core::catalog::Catalog;
    use cotiza_core::config::AppConfig;
    use cotiza_core::domain::policy::PolicyCategory;
    use cotiza_core::domain::quotation::Quotation;

    use super::{tera_currency_filter, DocumentRenderer};
    use crate::document::QuotationDocument;

    fn currency(value: serde_json::Value) -> String {
        match tera_currency_filter(&value, &HashMap::new()) {
            Ok(tera::Value::String(text)) => text,
            other => panic!("unexpected filter result: {other:?}"),
        }
    }

    fn render(quotation: &Quotation, catalog: &Catalog) -> String {
        let document =
            QuotationDocument::build(quotation, catalog, &AppConfig::default().branding);
        DocumentRenderer::embedded()
            .expect("embedded template parses")
            .render(&document)
            .expect("template renders")
    }

    fn quotation(catalog: &Catalog) -> Quotation {
        let advisor = catalog.lookup_advisor("1001").expect("demo advisor");
        let mut quotation = Quotation::new(advisor, catalog.fixed_coverage_catalog().to_vec());
        quotation.client.name = "Carlos Perez".to_owned();
        quotation.set_category(Some(PolicyCategory::ProtectionPlan));
        quotation.set_policy_type("Ecosistema");
        quotation.set_monthly_premium("180000");
        quotation.set_investment_premium("70000");
        quotation.coverages_mut().set_fixed_value("Enfermedades graves", "1250000");
        quotation
    }

    #[test]
    fn currency_filter_formats_numbers_and_strings() {
        assert_eq!(currency(serde_json::json!(1_250_000)), "$ 1.250.000");
        assert_eq!(currency(serde_json::json!("1250000")), "$ 1.250.000");
        assert_eq!(currency(serde_json::json!(999.9)), "$ 999");
        assert_eq!(currency(serde_json::json!("")), "$ 0");
        assert_eq!(currency(serde_json::json!(null)), "$ 0");
        assert_eq!(currency(serde_json::json!(-5)), "$ 0");
    }

    #[test]
    fn renders_both_pages_with_formatted_amounts() {
        let catalog = Catalog::builtin();
        let html = render(&quotation(&catalog), &catalog);

        assert!(html.contains("width: 794px"));
        assert!(html.contains("COBERTURA"));
        assert!(html.contains("VALOR ASEGURADO"));
        assert!(html.contains("Enfermedades graves"));
        assert!(html.contains("$ 1.250.000"));
        assert!(html.contains("$ 250.000"));
        assert!(html.contains("ACUMULACIÓN DE CAPITAL A LOS ___ AÑOS"));
        assert!(html.contains("Correo: -"));
        assert!(html.contains("Laura Gómez"));
    }

    #[test]
    fn ecosystem_block_only_for_ecosystem_plan() {
        let catalog = Catalog::builtin();
        let mut quotation = quotation(&catalog);
        assert!(render(&quotation, &catalog).contains("Salud a un click"));

        quotation.set_policy_type("Pensión");
        let html = render(&quotation, &catalog);
        assert!(!html.contains("Salud a un click"));
        assert!(!html.contains("Asistencias incluidas"));
        assert!(!html.contains("Notas/Observaciones"));
    }

    #[test]
    fn assistances_and_notes_appear_when_present() {
        let catalog = Catalog::builtin();
        let mut quotation = quotation(&catalog);
        quotation.toggle_assistance("Asistencia escolar");
        quotation.toggle_assistance("Conductor elegido");
        quotation.figures.notes = "Incluye beneficio de ahorro".to_owned();

        let html = render(&quotation, &catalog);
        let driver = html.find("Conductor elegido").expect("assistance listed");
        let school = html.find("Asistencia escolar").expect("assistance listed");
        assert!(driver < school, "assistances follow catalog order");
        assert!(html.contains("Incluye beneficio de ahorro"));
    }
}
