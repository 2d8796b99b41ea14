//! Read-only reference data: advisor directory, policy types, coverage and
//! assistance names, and the Ecosystem benefit listing.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::advisor::{Advisor, AdvisorCode};
use crate::domain::policy::PolicyCategory;
use crate::errors::DomainError;

pub const ECOSYSTEM_POLICY_TYPE: &str = "Ecosistema";

const LIFE_TYPES: [&str; 5] = ["Vida 50", "Vida 60", "Vida 70", "Vida 80", "Vida 99"];

const PROTECTION_PLAN_TYPES: [&str; 12] = [
    "Puf pesos A",
    "Puf pesos B",
    "Puf dólares",
    "Dotal 15 pagos",
    "Dotal 20 pagos",
    "Pensión",
    "Ap",
    ECOSYSTEM_POLICY_TYPE,
    "Temporal 50 años",
    "Temporal 60 años",
    "Temporal 70 años",
    "Temporal 80 años",
];

const FIXED_COVERAGES: [&str; 11] = [
    "Desmembración por accidente",
    "Muerte por cualquier causa",
    "Exoneración de pago de primas",
    "Fractura de huesos y quemaduras graves",
    "Incapacidad total y permanente",
    "Reembolso por gastos médicos",
    "Renta diaria por hospitalización en uci por accidente o enfermedad",
    "Renta diaria por hospitalización por accidente o enfermedad",
    "Enfermedades graves",
    "cancer",
    "Muerte por accidente",
];

const ASSISTANCES: [&str; 10] = [
    "Asistencia odontológica de emergencia",
    "Auxilio gastos funerarios",
    "Conductor elegido",
    "Asistencia en viaje internacional",
    "Asistencia escolar",
    "Central médica y médico domiciliario",
    "Nutricional asistencia",
    "Asistencia médica",
    "Telefónica legal asistencia",
    "Telefónica informática asistencia",
];

const ECOSYSTEM_HEADLINE: &str = "Esta póliza incluye acceso a Ecosistema Bienestar:";
const ECOSYSTEM_SUMMARY: &str = "Accede a nuestra plataforma digital con servicios de: \
SALUD A UN CLICK, BIENESTAR INTEGRAL y SALUD MENTAL.";

const ECOSYSTEM_GROUPS: [(&str, &[&str]); 3] = [
    (
        "Salud a un click",
        &[
            "Orientación veterinaria (video consulta)",
            "Internista (telemedicina)",
            "Enfermería (video consulta)",
            "Wikidoc (Herramienta de consulta)",
            "Exámenes preventivos (Herramienta)",
            "Nutrición (video consulta)",
            "Medicina General (telemedicina)",
            "Dermatólogo (telemedicina)",
            "Ginecólogo (telemedicina)",
            "Farmacia Digital (Herramienta)",
            "Médico domiciliario (Servicio físico)",
            "Exámenes de laboratorio (Herramienta)",
            "Traslado Médico (Servicio físico)",
        ],
    ),
    (
        "Bienestar integral",
        &[
            "Yoga (Clase por video)",
            "Pilates (Clase por video)",
            "Entrenador Personal (Clase por video)",
            "Mindfulness (video consulta)",
        ],
    ),
    ("Salud mental", &["Psicólogo (telemedicina)"]),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitGroup {
    pub title: String,
    pub services: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcosystemBenefits {
    pub headline: String,
    pub summary: String,
    pub groups: Vec<BenefitGroup>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read advisor directory `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse advisor directory `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("advisor directory has duplicate code `{0}`")]
    DuplicateAdvisor(String),
    #[error("advisor directory entry has an empty code")]
    EmptyAdvisorCode,
}

#[derive(Debug, Default, Deserialize)]
struct AdvisorDirectoryFile {
    #[serde(default)]
    advisors: Vec<Advisor>,
}

#[derive(Clone, Debug)]
pub struct Catalog {
    advisors: Vec<Advisor>,
    life_types: Vec<String>,
    protection_plan_types: Vec<String>,
    fixed_coverages: Vec<String>,
    assistances: Vec<String>,
    ecosystem: EcosystemBenefits,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// Product lists shipped with the application plus a demo advisor directory.
    pub fn builtin() -> Self {
        Self {
            advisors: demo_advisors(),
            life_types: owned(&LIFE_TYPES),
            protection_plan_types: owned(&PROTECTION_PLAN_TYPES),
            fixed_coverages: owned(&FIXED_COVERAGES),
            assistances: owned(&ASSISTANCES),
            ecosystem: EcosystemBenefits {
                headline: ECOSYSTEM_HEADLINE.to_owned(),
                summary: ECOSYSTEM_SUMMARY.to_owned(),
                groups: ECOSYSTEM_GROUPS
                    .iter()
                    .map(|(title, services)| BenefitGroup {
                        title: (*title).to_owned(),
                        services: owned(services),
                    })
                    .collect(),
            },
        }
    }

    pub fn with_advisors(mut self, advisors: Vec<Advisor>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for advisor in &advisors {
            let code = advisor.code.0.trim();
            if code.is_empty() {
                return Err(CatalogError::EmptyAdvisorCode);
            }
            if !seen.insert(code.to_owned()) {
                return Err(CatalogError::DuplicateAdvisor(code.to_owned()));
            }
        }
        self.advisors = advisors;
        Ok(self)
    }

    /// Builtin product lists with the advisor directory read from a TOML file
    /// of `[[advisors]]` tables.
    pub fn with_advisor_file(self, path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;
        let file: AdvisorDirectoryFile = toml::from_str(&raw)
            .map_err(|source| CatalogError::ParseFile { path: path.to_path_buf(), source })?;
        self.with_advisors(file.advisors)
    }

    pub fn lookup_advisor(&self, code: &str) -> Result<Advisor, DomainError> {
        let code = code.trim();
        self.advisors
            .iter()
            .find(|advisor| advisor.code.0 == code)
            .cloned()
            .ok_or_else(|| DomainError::AdvisorNotFound { code: code.to_owned() })
    }

    pub fn advisors(&self) -> &[Advisor] {
        &self.advisors
    }

    /// Allowed types for `category`; empty when no category is chosen.
    pub fn policy_types_for(&self, category: Option<PolicyCategory>) -> &[String] {
        match category {
            Some(PolicyCategory::Life) => &self.life_types,
            Some(PolicyCategory::ProtectionPlan) => &self.protection_plan_types,
            None => &[],
        }
    }

    pub fn fixed_coverage_catalog(&self) -> &[String] {
        &self.fixed_coverages
    }

    pub fn assistance_catalog(&self) -> &[String] {
        &self.assistances
    }

    pub fn ecosystem_benefits(&self) -> &EcosystemBenefits {
        &self.ecosystem
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

fn demo_advisors() -> Vec<Advisor> {
    vec![
        Advisor {
            code: AdvisorCode("1001".to_owned()),
            name: "Laura Gómez".to_owned(),
            title: "Consultora de Seguros".to_owned(),
            email: "laura.gomez@example.com".to_owned(),
            phone: "+57 300 555 0101".to_owned(),
            photo: "assets/advisors/1001.jpg".to_owned(),
        },
        Advisor {
            code: AdvisorCode("1002".to_owned()),
            name: "Andrea Ríos".to_owned(),
            title: "Consultora Senior".to_owned(),
            email: "andrea.rios@example.com".to_owned(),
            phone: "+57 310 555 0202".to_owned(),
            photo: "assets/advisors/1002.jpg".to_owned(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use crate::domain::policy::PolicyCategory;
    use crate::errors::DomainError;

    use super::{Catalog, CatalogError, ECOSYSTEM_POLICY_TYPE};

    #[test]
    fn lookup_trims_input_and_matches_exactly() {
        let catalog = Catalog::builtin();
        let advisor = catalog.lookup_advisor("  1001 ").expect("demo advisor exists");
        assert_eq!(advisor.name, "Laura Gómez");

        for missing in ["", "100", "10011", "1001x", "ABC"] {
            assert!(matches!(
                catalog.lookup_advisor(missing),
                Err(DomainError::AdvisorNotFound { .. })
            ));
        }
    }

    #[test]
    fn policy_types_depend_on_category() {
        let catalog = Catalog::builtin();
        assert!(catalog.policy_types_for(None).is_empty());
        assert_eq!(catalog.policy_types_for(Some(PolicyCategory::Life)).len(), 5);
        assert!(catalog
            .policy_types_for(Some(PolicyCategory::ProtectionPlan))
            .iter()
            .any(|name| name == ECOSYSTEM_POLICY_TYPE));
    }

    #[test]
    fn ecosystem_benefits_have_three_groups() {
        let benefits = Catalog::builtin().ecosystem_benefits().clone();
        let titles: Vec<&str> = benefits.groups.iter().map(|group| group.title.as_str()).collect();
        assert_eq!(titles, vec!["Salud a un click", "Bienestar integral", "Salud mental"]);
        assert_eq!(benefits.groups[0].services.len(), 13);
    }

    #[test]
    fn advisor_file_replaces_directory() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err| err.to_string())?;
        let path = dir.path().join("advisors.toml");
        fs::write(
            &path,
            r#"
[[advisors]]
code = "C-77"
name = "Marta Díaz"
title = "Asesora"
email = "marta@example.com"
phone = "3205550000"
photo = "marta.png"
"#,
        )
        .map_err(|err| err.to_string())?;

        let catalog =
            Catalog::builtin().with_advisor_file(&path).map_err(|err| err.to_string())?;
        assert_eq!(catalog.advisors().len(), 1);
        assert!(catalog.lookup_advisor("C-77").is_ok());
        assert!(catalog.lookup_advisor("1001").is_err());
        Ok(())
    }

    #[test]
    fn duplicate_advisor_codes_are_rejected() {
        let advisors = Catalog::builtin().advisors().to_vec();
        let mut doubled = advisors.clone();
        doubled.extend(advisors);

        let error = Catalog::builtin().with_advisors(doubled).expect_err("duplicates rejected");
        assert!(matches!(error, CatalogError::DuplicateAdvisor(ref code) if code == "1001"));
    }
}
