use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use cotiza_core::config::{AppConfig, LoadOptions};
use toml::Value;

use crate::commands::{CommandResult, EXIT_CONFIG};

pub fn run(options: LoadOptions) -> CommandResult {
    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG,
            );
        }
    };

    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines =
        vec!["effective config (source precedence: override > env > file > default):".to_string()];

    lines.push(render_line(
        "export.output_dir",
        &config.export.output_dir.display().to_string(),
        source("export.output_dir", &["COTIZA_EXPORT_OUTPUT_DIR"]),
    ));
    lines.push(render_line(
        "export.settle_delay_ms",
        &config.export.settle_delay_ms.to_string(),
        source("export.settle_delay_ms", &["COTIZA_EXPORT_SETTLE_DELAY_MS"]),
    ));
    lines.push(render_line(
        "export.handoff_delay_ms",
        &config.export.handoff_delay_ms.to_string(),
        source("export.handoff_delay_ms", &["COTIZA_EXPORT_HANDOFF_DELAY_MS"]),
    ));
    lines.push(render_line(
        "export.rasterizer",
        &format!("{:?}", config.export.rasterizer),
        source("export.rasterizer", &["COTIZA_EXPORT_RASTERIZER"]),
    ));

    lines.push(render_line(
        "branding.company_name",
        &config.branding.company_name,
        source("branding.company_name", &["COTIZA_BRANDING_COMPANY_NAME"]),
    ));
    lines.push(render_line(
        "branding.primary_color",
        &config.branding.primary_color,
        source("branding.primary_color", &["COTIZA_BRANDING_PRIMARY_COLOR"]),
    ));
    lines.push(render_line(
        "branding.document_title",
        &config.branding.document_title,
        source("branding.document_title", &[]),
    ));

    let advisors_path = config
        .catalog
        .advisors_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<builtin>".to_string());
    lines.push(render_line(
        "catalog.advisors_path",
        &advisors_path,
        source("catalog.advisors_path", &["COTIZA_CATALOG_ADVISORS_PATH"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["COTIZA_LOGGING_LEVEL", "COTIZA_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["COTIZA_LOGGING_FORMAT", "COTIZA_LOG_FORMAT"]),
    ));

    CommandResult::success("config", lines.join("\n"))
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    let root = PathBuf::from("cotiza.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/cotiza.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    for env_key in env_keys {
        let set = env::var(env_key).map(|value| !value.trim().is_empty()).unwrap_or(false);
        if set {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
