use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, CatalogError};

pub const MAX_DELAY_MS: u64 = 60_000;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub export: ExportConfig,
    pub branding: BrandingConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    /// Pause between entering `Exporting` and capturing the document.
    pub settle_delay_ms: u64,
    /// Pause between a finished export and opening the email/chat target.
    pub handoff_delay_ms: u64,
    pub rasterizer: RasterizerMode,
}

impl ExportConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn handoff_delay(&self) -> Duration {
        Duration::from_millis(self.handoff_delay_ms)
    }
}

#[derive(Clone, Debug)]
pub struct BrandingConfig {
    pub company_name: String,
    pub primary_color: String,
    pub document_title: String,
}

#[derive(Clone, Debug, Default)]
pub struct CatalogConfig {
    pub advisors_path: Option<PathBuf>,
}

impl CatalogConfig {
    /// Builtin catalog, with the advisor directory replaced when a file is set.
    pub fn build(&self) -> Result<Catalog, CatalogError> {
        match &self.advisors_path {
            Some(path) => Catalog::builtin().with_advisor_file(path),
            None => Ok(Catalog::builtin()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterizerMode {
    /// PDF through wkhtmltopdf when it is installed, HTML otherwise.
    Auto,
    Html,
    Wkhtmltopdf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub output_dir: Option<PathBuf>,
    pub settle_delay_ms: Option<u64>,
    pub handoff_delay_ms: Option<u64>,
    pub rasterizer: Option<RasterizerMode>,
    pub advisors_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            export: ExportConfig {
                output_dir: PathBuf::from("."),
                settle_delay_ms: 150,
                handoff_delay_ms: 2_000,
                rasterizer: RasterizerMode::Auto,
            },
            branding: BrandingConfig {
                company_name: "MetLife".to_string(),
                primary_color: "#1abc74".to_string(),
                document_title: "Cotización de Seguro de Vida / Plan Proteccion".to_string(),
            },
            catalog: CatalogConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for RasterizerMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "html" => Ok(Self::Html),
            "wkhtmltopdf" | "pdf" => Ok(Self::Wkhtmltopdf),
            other => Err(ConfigError::Validation(format!(
                "unsupported rasterizer `{other}` (expected auto|html|wkhtmltopdf)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("cotiza.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(export) = patch.export {
            if let Some(output_dir) = export.output_dir {
                self.export.output_dir = output_dir;
            }
            if let Some(settle_delay_ms) = export.settle_delay_ms {
                self.export.settle_delay_ms = settle_delay_ms;
            }
            if let Some(handoff_delay_ms) = export.handoff_delay_ms {
                self.export.handoff_delay_ms = handoff_delay_ms;
            }
            if let Some(rasterizer) = export.rasterizer {
                self.export.rasterizer = rasterizer;
            }
        }

        if let Some(branding) = patch.branding {
            if let Some(company_name) = branding.company_name {
                self.branding.company_name = company_name;
            }
            if let Some(primary_color) = branding.primary_color {
                self.branding.primary_color = primary_color;
            }
            if let Some(document_title) = branding.document_title {
                self.branding.document_title = document_title;
            }
        }

        if let Some(catalog) = patch.catalog {
            if let Some(advisors_path) = catalog.advisors_path {
                self.catalog.advisors_path = Some(advisors_path);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("COTIZA_EXPORT_OUTPUT_DIR") {
            self.export.output_dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("COTIZA_EXPORT_SETTLE_DELAY_MS") {
            self.export.settle_delay_ms = parse_u64("COTIZA_EXPORT_SETTLE_DELAY_MS", &value)?;
        }
        if let Some(value) = read_env("COTIZA_EXPORT_HANDOFF_DELAY_MS") {
            self.export.handoff_delay_ms = parse_u64("COTIZA_EXPORT_HANDOFF_DELAY_MS", &value)?;
        }
        if let Some(value) = read_env("COTIZA_EXPORT_RASTERIZER") {
            self.export.rasterizer = value.parse()?;
        }

        if let Some(value) = read_env("COTIZA_BRANDING_COMPANY_NAME") {
            self.branding.company_name = value;
        }
        if let Some(value) = read_env("COTIZA_BRANDING_PRIMARY_COLOR") {
            self.branding.primary_color = value;
        }

        if let Some(value) = read_env("COTIZA_CATALOG_ADVISORS_PATH") {
            self.catalog.advisors_path = Some(PathBuf::from(value));
        }

        let log_level = read_env("COTIZA_LOGGING_LEVEL").or_else(|| read_env("COTIZA_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("COTIZA_LOGGING_FORMAT").or_else(|| read_env("COTIZA_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(output_dir) = overrides.output_dir {
            self.export.output_dir = output_dir;
        }
        if let Some(settle_delay_ms) = overrides.settle_delay_ms {
            self.export.settle_delay_ms = settle_delay_ms;
        }
        if let Some(handoff_delay_ms) = overrides.handoff_delay_ms {
            self.export.handoff_delay_ms = handoff_delay_ms;
        }
        if let Some(rasterizer) = overrides.rasterizer {
            self.export.rasterizer = rasterizer;
        }
        if let Some(advisors_path) = overrides.advisors_path {
            self.catalog.advisors_path = Some(advisors_path);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_export(&self.export)?;
        validate_branding(&self.branding)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("cotiza.toml"), PathBuf::from("config/cotiza.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_export(export: &ExportConfig) -> Result<(), ConfigError> {
    if export.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation("export.output_dir must not be empty".to_string()));
    }

    if export.settle_delay_ms > MAX_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "export.settle_delay_ms must be in range 0..={MAX_DELAY_MS}"
        )));
    }

    if export.handoff_delay_ms > MAX_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "export.handoff_delay_ms must be in range 0..={MAX_DELAY_MS}"
        )));
    }

    Ok(())
}

fn validate_branding(branding: &BrandingConfig) -> Result<(), ConfigError> {
    if branding.company_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "branding.company_name must not be empty".to_string(),
        ));
    }

    if !branding.primary_color.starts_with('#') {
        return Err(ConfigError::Validation(
            "branding.primary_color must be a hex color such as `#1abc74`".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    export: Option<ExportPatch>,
    branding: Option<BrandingPatch>,
    catalog: Option<CatalogPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ExportPatch {
    output_dir: Option<PathBuf>,
    settle_delay_ms: Option<u64>,
    handoff_delay_ms: Option<u64>,
    rasterizer: Option<RasterizerMode>,
}

#[derive(Debug, Default, Deserialize)]
struct BrandingPatch {
    company_name: Option<String>,
    primary_color: Option<String>,
    document_title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    advisors_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
