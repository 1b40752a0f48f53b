//! Binary entry point for the planlens CLI.
#![forbid(unsafe_code)]

mod config;
mod ui;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use planlens::{
    explain::PlanAnalyzer, insight::BLANK_CONDITION_KEY, plan::parse_explain_output,
    AlignStrategy, ExplainReport, PlanSummary,
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use config::CliConfig;
use ui::{Theme, Ui};

#[derive(Parser, Debug)]
#[command(
    name = "planlens",
    version,
    about = "Explain PostgreSQL query plans against their alternatives",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "PLANLENS_CONFIG",
        value_name = "FILE",
        help = "Path to the CLI config file"
    )]
    config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for structured responses"
    )]
    format: OutputFormat,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = ThemeArg::Auto,
        help = "Color theme for text output"
    )]
    theme: ThemeArg,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Annotate an executed plan using alternative plans")]
    Annotate(AnnotateCmd),

    #[command(about = "Print headline figures of a plan")]
    Summary {
        #[arg(long, value_name = "FILE", help = "Saved EXPLAIN (FORMAT JSON) output")]
        plan: PathBuf,
    },

    #[command(about = "Inspect the CLI configuration")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug)]
struct AnnotateCmd {
    #[arg(long, value_name = "FILE", help = "Saved EXPLAIN output of the executed plan")]
    qep: PathBuf,

    #[arg(
        long = "aqp",
        value_name = "FILE",
        help = "Saved EXPLAIN output of an alternative plan (repeatable)"
    )]
    aqps: Vec<PathBuf>,

    #[arg(long, value_enum, help = "Override the configured alignment strategy")]
    strategy: Option<StrategyArg>,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    #[command(about = "Print the effective configuration")]
    Show,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum StrategyArg {
    Structural,
    Index,
}

impl From<StrategyArg> for AlignStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Structural => AlignStrategy::Structural,
            StrategyArg::Index => AlignStrategy::Index,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ThemeArg {
    Auto,
    Light,
    Dark,
    Plain,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Auto => Theme::Auto,
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
            ThemeArg::Plain => Theme::Plain,
        }
    }
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.clone())?;
    let ui = Ui::new(cli.theme.into());

    match cli.command {
        Command::Annotate(cmd) => {
            let options = config.options();
            let strategy = cmd.strategy.map(Into::into).unwrap_or(options.strategy);
            let analyzer = PlanAnalyzer::new(options.normalizer, strategy);
            let qep = read_document(&cmd.qep)?;
            let aqps = cmd
                .aqps
                .iter()
                .map(|path| read_document(path))
                .collect::<Result<Vec<_>, _>>()?;
            let report = analyzer.analyze(&qep, &aqps)?;
            emit(&cli.format, &report, || print_report_text(&ui, &report))?;
        }
        Command::Summary { plan } => {
            let options = config.options();
            let analyzer = PlanAnalyzer::new(options.normalizer, options.strategy);
            let root = analyzer.normalize(&read_document(&plan)?)?;
            let summary = PlanSummary::from_plan(&root);
            emit(&cli.format, &summary, || print_summary_text(&ui, &summary))?;
        }
        Command::Config {
            action: ConfigAction::Show,
        } => match cli.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&config.to_raw())?;
                println!("{json}");
            }
            OutputFormat::Text => {
                let source = match config.path() {
                    Some(path) if config.loaded() => path.display().to_string(),
                    Some(path) => format!("{} (not found, using defaults)", path.display()),
                    None => "defaults".to_string(),
                };
                ui.info(&format!("config: {source}"));
                print!("{}", config.to_toml()?);
            }
        },
    }
    Ok(())
}

fn read_document(path: &Path) -> Result<Value, Box<dyn Error>> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    Ok(parse_explain_output(&text)?)
}

fn emit<T, F>(format: &OutputFormat, value: &T, printer: F) -> Result<(), Box<dyn Error>>
where
    T: serde::Serialize,
    F: Fn(),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
        }
        OutputFormat::Text => printer(),
    }
    Ok(())
}

fn summary_rows(summary: &PlanSummary) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("total cost", summary.total_cost.to_string()),
        ("nodes", summary.node_count.to_string()),
        ("seq scans", summary.seq_scans.to_string()),
        ("index scans", summary.index_scans.to_string()),
    ];
    if let Some(rows_estimate) = summary.plan_rows {
        rows.insert(1, ("plan rows", rows_estimate.to_string()));
    }
    rows
}

fn print_summary_text(ui: &Ui, summary: &PlanSummary) {
    ui.section("Plan", summary_rows(summary));
}

fn print_report_text(ui: &Ui, report: &ExplainReport) {
    let mut rows = summary_rows(&report.summary);
    rows.push(("alternatives", report.alternatives.to_string()));
    rows.push(("alignment", report.strategy.to_string()));
    ui.section("Plan", rows);
    ui.spacer();
    ui.numbered("Annotations", report.annotations.iter());
    if !report.insights.is_empty() {
        ui.spacer();
        ui.list(
            "Insights",
            report.insights.iter().flat_map(|(key, texts)| {
                let key = if key == BLANK_CONDITION_KEY {
                    "(no condition)"
                } else {
                    key
                };
                texts.iter().map(move |text| format!("{key}: {text}"))
            }),
        );
    }
}
