//! Scan runner: resolves the panel source, runs the pipeline under the gate
//! and returns the report together with load diagnostics.
//!
//! Two entry points:
//! - `run_scan()`: loads the panel and screens it inside one deadline-bounded
//!   job. Used by the CLI.
//! - `scan_panel()`: screens an already loaded panel with no I/O.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use trendscan_core::domain::{Panel, PanelError};
use trendscan_core::screen::{ScreenConfig, ScreenError, ScreenReport, ScreeningPipeline};

use crate::config::{AppConfig, ConfigError, DataConfig};
use crate::data_loader::{load_panel_dir, LoadError, LoadOptions, SkippedFile};
use crate::run_gate::{run_with_deadline, RunGate};
use crate::synthetic::SyntheticPanel;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("a screening run is already in progress")]
    AlreadyRunning,

    #[error("screening run did not finish within {limit:?}")]
    DeadlineExceeded { limit: Duration },

    #[error("screening worker terminated without a result")]
    WorkerPanicked,

    #[error("failed to spawn screening worker: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("data error: {0}")]
    Load(#[from] LoadError),

    #[error("panel error: {0}")]
    Panel(#[from] PanelError),

    #[error("screening error: {0}")]
    Screen(#[from] ScreenError),
}

/// Extra hours generated beyond the minimum so synthetic symbols clear the
/// history requirement with room to spare.
const SYNTHETIC_SLACK_BARS: usize = 48;

/// Where a run takes its panel from.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelSource {
    Directory(PathBuf),
    Synthetic { symbols: usize, seed: u64 },
}

impl PanelSource {
    /// A configured `panel_dir` wins over the synthetic settings.
    pub fn from_config(data: &DataConfig) -> Self {
        match &data.panel_dir {
            Some(dir) => Self::Directory(dir.clone()),
            None => Self::Synthetic {
                symbols: data.synthetic_symbols,
                seed: data.seed,
            },
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic { .. })
    }
}

/// A screened panel plus what was left out while loading it.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub report: ScreenReport,
    pub skipped: Vec<SkippedFile>,
    /// Results on synthetic data are for demos only.
    pub synthetic: bool,
}

/// Materialize the panel for `source`.
pub fn load_panel(
    source: &PanelSource,
    config: &ScreenConfig,
) -> Result<(Panel, Vec<SkippedFile>), RunError> {
    match source {
        PanelSource::Directory(dir) => {
            let opts = LoadOptions {
                min_bars: config.history_bars(),
            };
            let loaded = load_panel_dir(dir, &opts)?;
            Ok((loaded.panel, loaded.skipped))
        }
        PanelSource::Synthetic { symbols, seed } => {
            let bars = config.required_bars() + SYNTHETIC_SLACK_BARS;
            let panel =
                SyntheticPanel::new(config.benchmark_symbol.clone(), *symbols, bars, *seed)
                    .generate()?;
            Ok((panel, Vec::new()))
        }
    }
}

/// Screen an in-memory panel.
pub fn scan_panel(pipeline: &ScreeningPipeline, panel: &Panel) -> Result<ScreenReport, RunError> {
    let report = pipeline.run(panel)?;
    info!(
        candidates = report.candidates.len(),
        universe = report.universe_size,
        dataset = report.dataset_hash.short(),
        "scan complete"
    );
    Ok(report)
}

/// Load and screen under `gate`, bounded by the configured deadline.
pub fn run_scan(
    config: &AppConfig,
    source: PanelSource,
    gate: &RunGate,
) -> Result<ScanOutcome, RunError> {
    config.validate()?;
    let pipeline = ScreeningPipeline::new(config.screen.clone())?;
    let deadline = config.output.deadline_secs.map(Duration::from_secs);

    info!(
        source = ?source,
        config_hash = %pipeline.config_hash(),
        "starting scan"
    );

    run_with_deadline(gate, deadline, move || {
        let (panel, skipped) = load_panel(&source, pipeline.config())?;
        let report = scan_panel(&pipeline, &panel)?;
        Ok(ScanOutcome {
            report,
            skipped,
            synthetic: source.is_synthetic(),
        })
    })
}
