pub mod commands;
pub mod draft;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use cotiza_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat, RasterizerMode};
use cotiza_core::domain::policy::PolicyCategory;
use cotiza_core::handoff::Channel;

#[derive(Debug, Parser)]
#[command(
    name = "cotiza",
    about = "Cotiza quotation CLI",
    long_about = "Compose insurance quotations from draft files, export them as PDF/HTML and prepare the email or WhatsApp hand-off.",
    after_help = "Examples:\n  cotiza check draft.toml\n  cotiza export draft.toml --send whatsapp\n  cotiza doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a cotiza.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Directory that receives exported documents")]
    output_dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Override the rasterizer (auto|html|wkhtmltopdf)")]
    rasterizer: Option<RasterizerMode>,
    #[arg(long, global = true, help = "Override the log level")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Look up an advisor by code")]
    Advisor { code: String },
    #[command(about = "List policy types, coverages, assistances and Ecosystem benefits")]
    Catalog {
        #[arg(long, help = "Only list policy types of this category (VIDA|PLAN_PROTECCION)")]
        category: Option<PolicyCategory>,
    },
    #[command(about = "Replay a draft and report whether the quotation is complete")]
    Check { draft: PathBuf },
    #[command(about = "Render an HTML preview of a draft")]
    Render {
        draft: PathBuf,
        #[arg(long, help = "Write the preview here instead of the output directory")]
        output: Option<PathBuf>,
    },
    #[command(about = "Export a complete draft and optionally prepare the hand-off")]
    Export {
        draft: PathBuf,
        #[arg(long, help = "Hand-off channel after export (email|whatsapp)")]
        send: Option<Channel>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, advisor directory, template and output directory")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                output_dir: self.output_dir.clone(),
                rasterizer: self.rasterizer,
                log_level: self.log_level.clone(),
                ..ConfigOverrides::default()
            },
        }
    }
}

/// Logs go to stderr so stdout stays a single JSON payload.
pub fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.load_options();

    if let Ok(config) = AppConfig::load(options.clone()) {
        init_logging(&config);
    }

    let result = match cli.command {
        Command::Advisor { code } => commands::advisor::run(options, &code),
        Command::Catalog { category } => commands::catalog::run(options, category),
        Command::Check { draft } => commands::check::run(options, &draft),
        Command::Render { draft, output } => commands::render::run(options, &draft, output),
        Command::Export { draft, send } => commands::export::run(options, &draft, send),
        Command::Config => commands::config::run(options),
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(options, json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
