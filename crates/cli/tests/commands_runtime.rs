use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use cotiza_cli::commands::{advisor, check, config, doctor, export, render};
use cotiza_core::config::LoadOptions;
use cotiza_core::handoff::Channel;
use serde_json::Value;
use tempfile::TempDir;

const COMPLETE_DRAFT: &str = r#"
advisor_code = "1001"
assistances = ["Asistencia médica"]

[client]
name = "Carlos Pérez"
email = "carlos@example.com"
phone = "+57 300 123 4567"
age = "41"
gender = "masculino"
city = "Bogotá"

[policy]
category = "PLAN_PROTECCION"
policy_type = "Ecosistema"

[figures]
insured_sum = "200000000"
monthly_premium = "180000"

[investment]
investment_premium = "70000"
accumulation_years = "15"
accumulated_value = "32000000"

[[coverages.fixed]]
name = "Enfermedades graves"
value = "50000000"
"#;

const INCOMPLETE_DRAFT: &str = r#"
advisor_code = "1002"

[client]
name = "Ana"
"#;

#[test]
fn advisor_lookup_returns_profile() {
    with_env(&[], || {
        let result = advisor::run(LoadOptions::default(), "1001");
        assert_eq!(result.exit_code, 0, "expected advisor lookup success");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "advisor");
        assert_eq!(payload["status"], "ok");
        assert!(payload.get("correlation_id").is_none());
        assert!(payload["message"].as_str().unwrap_or_default().contains("Laura Gómez"));
    });
}

#[test]
fn advisor_lookup_reports_unknown_code() {
    with_env(&[], || {
        let result = advisor::run(LoadOptions::default(), "4040");
        assert_eq!(result.exit_code, 5, "expected advisor-not-found code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "advisor_not_found");
    });
}

#[test]
fn check_accepts_complete_draft() {
    let dir = TempDir::new().expect("tempdir");
    let draft = write_draft(dir.path(), "complete.toml", COMPLETE_DRAFT);

    with_env(&[], || {
        let result = check::run(LoadOptions::default(), &draft);
        assert_eq!(result.exit_code, 0, "expected complete draft");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "check");
        assert!(payload["message"].as_str().unwrap_or_default().contains("$ 250.000"));
    });
}

#[test]
fn check_lists_missing_fields_for_incomplete_draft() {
    let dir = TempDir::new().expect("tempdir");
    let draft = write_draft(dir.path(), "incomplete.toml", INCOMPLETE_DRAFT);

    with_env(&[], || {
        let result = check::run(LoadOptions::default(), &draft);
        assert_eq!(result.exit_code, 6, "expected incomplete quotation code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "incomplete_quotation");
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.contains("policy_type"));
        assert!(message.contains("monthly_premium"));
        assert!(payload["correlation_id"].as_str().is_some_and(|id| !id.is_empty()));
    });
}

#[test]
fn check_rejects_unreadable_draft() {
    let dir = TempDir::new().expect("tempdir");
    let draft = write_draft(dir.path(), "broken.toml", "advisor_code = [");

    with_env(&[], || {
        let result = check::run(LoadOptions::default(), &draft);
        assert_eq!(result.exit_code, 4, "expected draft failure code");
        assert_eq!(parse_payload(&result.output)["error_class"], "draft_invalid");
    });
}

#[test]
fn advisor_in_draft_that_does_not_match_carries_correlation_id() {
    let dir = TempDir::new().expect("tempdir");
    let draft = write_draft(dir.path(), "stranger.toml", "advisor_code = \"4040\"\n");

    with_env(&[], || {
        let result = check::run(LoadOptions::default(), &draft);
        assert_eq!(result.exit_code, 5, "expected advisor-not-found code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "advisor_not_found");
        assert_eq!(payload["message"], "Código incorrecto. Intenta de nuevo.");
        assert!(payload["correlation_id"].is_string());
    });
}

#[test]
fn render_writes_preview_even_when_incomplete() {
    let dir = TempDir::new().expect("tempdir");
    let draft = write_draft(dir.path(), "incomplete.toml", INCOMPLETE_DRAFT);
    let output = dir.path().join("preview.html");

    with_env(&[], || {
        let result = render::run(LoadOptions::default(), &draft, Some(output.clone()));
        assert_eq!(result.exit_code, 0, "expected preview success");
    });

    let html = fs::read_to_string(&output).expect("preview written");
    assert!(html.contains("Ana"));
    assert!(html.contains("Andrea Ríos"));
}

#[test]
fn export_saves_html_document_into_output_dir() {
    let dir = TempDir::new().expect("tempdir");
    let draft = write_draft(dir.path(), "complete.toml", COMPLETE_DRAFT);
    let out = dir.path().join("out");
    let out_str = out.display().to_string();

    with_env(&export_env(&out_str), || {
        let result = export::run(LoadOptions::default(), &draft, None);
        assert_eq!(result.exit_code, 0, "expected export success: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "export");
        assert!(payload["message"].as_str().unwrap_or_default().contains("html"));
    });

    assert!(out.join("Cotizacion_Carlos Pérez.html").exists());
}

#[test]
fn export_refuses_incomplete_draft() {
    let dir = TempDir::new().expect("tempdir");
    let draft = write_draft(dir.path(), "incomplete.toml", INCOMPLETE_DRAFT);
    let out = dir.path().join("out");
    let out_str = out.display().to_string();

    with_env(&export_env(&out_str), || {
        let result = export::run(LoadOptions::default(), &draft, None);
        assert_eq!(result.exit_code, 6, "expected incomplete quotation code");
        assert_eq!(parse_payload(&result.output)["error_class"], "incomplete_quotation");
    });

    assert!(!out.exists() || fs::read_dir(&out).map(|entries| entries.count()).unwrap_or(0) == 0);
}

#[test]
fn export_with_messaging_handoff_returns_link() {
    let dir = TempDir::new().expect("tempdir");
    let draft = write_draft(dir.path(), "complete.toml", COMPLETE_DRAFT);
    let out = dir.path().join("out");
    let out_str = out.display().to_string();

    with_env(&export_env(&out_str), || {
        let result = export::run(LoadOptions::default(), &draft, Some(Channel::Messaging));
        assert_eq!(result.exit_code, 0, "expected hand-off success: {}", result.output);

        let message = parse_payload(&result.output)["message"].as_str().unwrap_or_default().to_owned();
        assert!(message.contains("open: https://wa.me/573001234567"));
    });
}

#[test]
fn config_reports_env_and_default_sources() {
    with_env(&[("COTIZA_EXPORT_SETTLE_DELAY_MS", "0"), ("COTIZA_LOG_LEVEL", "debug")], || {
        let result = config::run(LoadOptions::default());
        assert_eq!(result.exit_code, 0, "expected config success");

        let payload = parse_payload(&result.output);
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message
            .contains("- export.settle_delay_ms = 0 (source: env (COTIZA_EXPORT_SETTLE_DELAY_MS))"));
        assert!(message.contains("- logging.level = debug (source: env (COTIZA_LOG_LEVEL))"));
        assert!(message.contains("- branding.company_name = MetLife (source: default)"));
    });
}

#[test]
fn config_reports_validation_failure() {
    with_env(&[("COTIZA_EXPORT_HANDOFF_DELAY_MS", "soon")], || {
        let result = config::run(LoadOptions::default());
        assert_eq!(result.exit_code, 2, "expected config failure code");
        assert_eq!(parse_payload(&result.output)["error_class"], "config_validation");
    });
}

#[test]
fn doctor_json_passes_with_html_exports() {
    let dir = TempDir::new().expect("tempdir");
    let out_str = dir.path().join("out").display().to_string();

    with_env(&export_env(&out_str), || {
        let output = doctor::run(LoadOptions::default(), true);
        let payload = parse_payload(&output);
        assert_eq!(payload["overall_status"], "pass");

        let checks = payload["checks"].as_array().cloned().unwrap_or_default();
        let status_of = |name: &str| {
            checks
                .iter()
                .find(|check| check["name"] == name)
                .map(|check| check["status"].clone())
                .unwrap_or(Value::Null)
        };
        assert_eq!(status_of("config_validation"), "pass");
        assert_eq!(status_of("document_template"), "pass");
        assert_eq!(status_of("output_dir_writable"), "pass");
        assert_eq!(status_of("pdf_converter"), "skipped");
    });
}

#[test]
fn doctor_skips_dependent_checks_when_config_fails() {
    with_env(&[("COTIZA_EXPORT_RASTERIZER", "laser")], || {
        let output = doctor::run(LoadOptions::default(), true);
        let payload = parse_payload(&output);
        assert_eq!(payload["overall_status"], "fail");

        let skipped = payload["checks"]
            .as_array()
            .map(|checks| checks.iter().filter(|check| check["status"] == "skipped").count())
            .unwrap_or_default();
        assert_eq!(skipped, 3);
    });
}

fn export_env(output_dir: &str) -> [(&'static str, &str); 4] {
    [
        ("COTIZA_EXPORT_OUTPUT_DIR", output_dir),
        ("COTIZA_EXPORT_SETTLE_DELAY_MS", "0"),
        ("COTIZA_EXPORT_HANDOFF_DELAY_MS", "0"),
        ("COTIZA_EXPORT_RASTERIZER", "html"),
    ]
}

fn write_draft(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write draft");
    path
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "COTIZA_EXPORT_OUTPUT_DIR",
        "COTIZA_EXPORT_SETTLE_DELAY_MS",
        "COTIZA_EXPORT_HANDOFF_DELAY_MS",
        "COTIZA_EXPORT_RASTERIZER",
        "COTIZA_BRANDING_COMPANY_NAME",
        "COTIZA_BRANDING_PRIMARY_COLOR",
        "COTIZA_CATALOG_ADVISORS_PATH",
        "COTIZA_LOGGING_LEVEL",
        "COTIZA_LOGGING_FORMAT",
        "COTIZA_LOG_LEVEL",
        "COTIZA_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
