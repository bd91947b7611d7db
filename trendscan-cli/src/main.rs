//! TrendScan CLI: screening runs and configuration scaffolding.
//!
//! Commands:
//! - `scan`: screen a CSV panel directory (or a synthetic panel) and print
//!   the ranked candidates; optionally save the artifact bundle
//! - `config`: print the default configuration as TOML
//! - `show`: re-render a saved artifact directory

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use trendscan_runner::{
    init_logging, report, run_scan, AppConfig, OutputFormat, PanelSource, RunGate,
};

#[derive(Parser)]
#[command(
    name = "trendscan",
    about = "TrendScan CLI: cross-sectional relative-strength screener"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen a panel and print the ranked candidates.
    Scan {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory with one <SYMBOL>.csv per instrument.
        #[arg(long, conflicts_with = "synthetic")]
        panel_dir: Option<PathBuf>,

        /// Screen a synthetic panel with this many symbols instead.
        #[arg(long)]
        synthetic: Option<usize>,

        /// Seed for the synthetic panel.
        #[arg(long)]
        seed: Option<u64>,

        /// Save report.json, candidates.csv, funnel.csv, report.md and the watchlist here.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Abandon the run after this many seconds.
        #[arg(long)]
        deadline_secs: Option<u64>,

        /// Stdout format.
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Log level directive (RUST_LOG wins when set).
        #[arg(long)]
        log_level: Option<String>,
    },
    /// Print the default configuration as TOML.
    Config,
    /// Re-render a saved artifact directory.
    Show {
        /// Directory created by `scan --output-dir`.
        dir: PathBuf,

        #[arg(long, value_enum, default_value_t = FormatArg::Text)]
        format: FormatArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            config,
            panel_dir,
            synthetic,
            seed,
            output_dir,
            deadline_secs,
            format,
            log_level,
        } => {
            let mut app = match config {
                Some(path) => AppConfig::from_file(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => AppConfig::default(),
            };
            apply_overrides(
                &mut app,
                Overrides {
                    panel_dir,
                    synthetic,
                    seed,
                    output_dir,
                    deadline_secs,
                    format,
                    log_level,
                },
            );
            app.validate()?;
            init_logging(&app.logging.level, app.logging.format);
            run_scan_cmd(&app)
        }
        Commands::Config => {
            print!("{}", AppConfig::default().to_toml_string()?);
            Ok(())
        }
        Commands::Show { dir, format } => {
            let saved = report::load_artifacts(&dir)?;
            print_report(&saved, format.into())
        }
    }
}

struct Overrides {
    panel_dir: Option<PathBuf>,
    synthetic: Option<usize>,
    seed: Option<u64>,
    output_dir: Option<PathBuf>,
    deadline_secs: Option<u64>,
    format: Option<FormatArg>,
    log_level: Option<String>,
}

/// Command-line flags win over the config file.
fn apply_overrides(app: &mut AppConfig, o: Overrides) {
    if let Some(dir) = o.panel_dir {
        app.data.panel_dir = Some(dir);
    }
    if let Some(n) = o.synthetic {
        app.data.panel_dir = None;
        app.data.synthetic_symbols = n;
    }
    if let Some(seed) = o.seed {
        app.data.seed = seed;
    }
    if let Some(dir) = o.output_dir {
        app.output.dir = Some(dir);
    }
    if let Some(secs) = o.deadline_secs {
        app.output.deadline_secs = Some(secs);
    }
    if let Some(format) = o.format {
        app.output.format = format.into();
    }
    if let Some(level) = o.log_level {
        app.logging.level = level;
    }
}

fn run_scan_cmd(app: &AppConfig) -> Result<()> {
    let source = PanelSource::from_config(&app.data);
    if source.is_synthetic() {
        warn!("screening a synthetic panel; results are for demonstration only");
    }

    let gate = RunGate::new();
    let outcome = run_scan(app, source, &gate)?;
    if !outcome.skipped.is_empty() {
        info!(skipped = outcome.skipped.len(), "symbols left out while loading");
    }

    print_report(&outcome.report, app.output.format)?;

    if let Some(dir) = &app.output.dir {
        let run_dir = report::save_artifacts(&outcome.report, dir, Utc::now())?;
        eprintln!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn print_report(r: &trendscan_core::ScreenReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", report::export_json(r)?),
        OutputFormat::Text => {
            println!("{}", report::render_text(&r.candidates, Utc::now()));
            if let Some(watchlist) = report::render_watchlist(&r.candidates) {
                println!("\n{watchlist}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_parses_dir_and_format() {
        let cli = Cli::try_parse_from(["trendscan", "show", "out/scan_1", "--format", "json"])
            .unwrap();
        match cli.command {
            Commands::Show { dir, format } => {
                assert_eq!(dir, PathBuf::from("out/scan_1"));
                assert!(matches!(format, FormatArg::Json));
            }
            _ => panic!("expected show"),
        }
    }

    #[test]
    fn panel_dir_conflicts_with_synthetic() {
        let parsed =
            Cli::try_parse_from(["trendscan", "scan", "--panel-dir", "data", "--synthetic", "5"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn synthetic_flag_clears_panel_dir() {
        let mut app = AppConfig::default();
        app.data.panel_dir = Some(PathBuf::from("data"));
        apply_overrides(
            &mut app,
            Overrides {
                panel_dir: None,
                synthetic: Some(5),
                seed: Some(7),
                output_dir: None,
                deadline_secs: None,
                format: Some(FormatArg::Json),
                log_level: None,
            },
        );
        assert!(app.data.panel_dir.is_none());
        assert_eq!(app.data.synthetic_symbols, 5);
        assert_eq!(app.data.seed, 7);
        assert_eq!(app.output.format, OutputFormat::Json);
    }
}
