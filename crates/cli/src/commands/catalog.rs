use cotiza_core::config::LoadOptions;
use cotiza_core::domain::policy::PolicyCategory;

use crate::commands::{load_runtime, CommandResult};

/// Lists policy types per category, fixed coverages, assistances and the
/// Ecosystem benefits. A category narrows the listing to its policy types.
pub fn run(options: LoadOptions, category: Option<PolicyCategory>) -> CommandResult {
    let runtime = match load_runtime("catalog", options) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };
    let catalog = &runtime.catalog;

    let mut lines = Vec::new();
    let categories = match category {
        Some(category) => vec![category],
        None => PolicyCategory::ALL.to_vec(),
    };
    for category in categories {
        lines.push(format!("{category}:"));
        let types = catalog.policy_types_for(Some(category));
        lines.extend(types.iter().map(|name| format!("  - {name}")));
    }
    if category.is_some() {
        return CommandResult::success("catalog", lines.join("\n"));
    }

    lines.push("coberturas:".to_string());
    lines.extend(catalog.fixed_coverage_catalog().iter().map(|name| format!("  - {name}")));
    lines.push("asistencias:".to_string());
    lines.extend(catalog.assistance_catalog().iter().map(|name| format!("  - {name}")));

    let benefits = catalog.ecosystem_benefits();
    lines.push(format!("ecosistema: {}", benefits.headline));
    for group in &benefits.groups {
        lines.push(format!("  {}:", group.title));
        lines.extend(group.services.iter().map(|service| format!("    - {service}")));
    }

    CommandResult::success("catalog", lines.join("\n"))
}
