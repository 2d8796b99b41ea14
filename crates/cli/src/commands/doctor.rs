use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use cotiza_core::config::{AppConfig, LoadOptions, RasterizerMode};
use cotiza_render::{is_wkhtmltopdf_available, DocumentRenderer};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

const CONFIG_DEPENDENT_CHECKS: [&str; 3] =
    ["advisor_directory", "output_dir_writable", "pdf_converter"];

pub fn run(options: LoadOptions, json_output: bool) -> String {
    let report = build_report(options);

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report(options: LoadOptions) -> DoctorReport {
    let mut checks = vec![check_document_template()];

    match AppConfig::load(options) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_advisor_directory(&config));
            checks.push(check_output_dir(&config.export.output_dir));
            checks.push(check_pdf_converter(config.export.rasterizer));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.extend(CONFIG_DEPENDENT_CHECKS.into_iter().map(|name| DoctorCheck {
                name,
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            }));
        }
    }

    let all_pass = checks.iter().all(|check| check.status != CheckStatus::Fail);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_document_template() -> DoctorCheck {
    match DocumentRenderer::embedded() {
        Ok(_) => DoctorCheck {
            name: "document_template",
            status: CheckStatus::Pass,
            details: "embedded quotation template compiled".to_string(),
        },
        Err(error) => DoctorCheck {
            name: "document_template",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_advisor_directory(config: &AppConfig) -> DoctorCheck {
    match config.catalog.build() {
        Ok(catalog) => DoctorCheck {
            name: "advisor_directory",
            status: CheckStatus::Pass,
            details: format!("{} advisors available", catalog.advisors().len()),
        },
        Err(error) => DoctorCheck {
            name: "advisor_directory",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_output_dir(dir: &Path) -> DoctorCheck {
    match probe_output_dir(dir) {
        Ok(()) => DoctorCheck {
            name: "output_dir_writable",
            status: CheckStatus::Pass,
            details: format!("`{}` accepts new files", dir.display()),
        },
        Err(error) => DoctorCheck {
            name: "output_dir_writable",
            status: CheckStatus::Fail,
            details: format!("{error:#}"),
        },
    }
}

fn probe_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory `{}`", dir.display()))?;
    let probe = dir.join(".cotiza-doctor-probe");
    fs::write(&probe, b"ok")
        .with_context(|| format!("failed to write into `{}`", dir.display()))?;
    fs::remove_file(&probe)
        .with_context(|| format!("failed to clean up `{}`", probe.display()))?;
    Ok(())
}

fn check_pdf_converter(mode: RasterizerMode) -> DoctorCheck {
    let available = is_wkhtmltopdf_available();
    let (status, details) = match (mode, available) {
        (RasterizerMode::Html, _) => {
            (CheckStatus::Skipped, "exports configured as HTML".to_string())
        }
        (_, true) => (CheckStatus::Pass, "wkhtmltopdf found in PATH".to_string()),
        (RasterizerMode::Auto, false) => (
            CheckStatus::Skipped,
            "wkhtmltopdf not found; exports will fall back to HTML".to_string(),
        ),
        (RasterizerMode::Wkhtmltopdf, false) => {
            (CheckStatus::Fail, "wkhtmltopdf required but not found in PATH".to_string())
        }
    };
    DoctorCheck { name: "pdf_converter", status, details }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
